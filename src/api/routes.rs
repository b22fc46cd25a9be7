//! API route configuration.

use crate::api::handlers::{
    add_item_handler, bill_handler, create_table_handler, get_order_handler, get_table_handler,
    order_list_handler, prepare_handler, start_ordering_handler, table_list_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Table and order routes.
///
/// # Endpoints
///
/// - `GET  /tables`                    - List tables with occupancy
/// - `POST /tables`                    - Register a table
/// - `GET  /tables/{tableId}`          - Single table
/// - `GET  /tableOrders`               - List orders (paginated)
/// - `POST /tableOrders`               - Open an order at a table
/// - `GET  /tableOrders/{id}`          - Single order
/// - `POST /tableOrders/{id}`          - Add an item
/// - `POST /tableOrders/{id}/prepare`  - Send pending lines to the kitchen
/// - `POST /tableOrders/{id}/bill`     - Bill the order
pub fn dining_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tables",
            get(table_list_handler).post(create_table_handler),
        )
        .route("/tables/{table_id}", get(get_table_handler))
        .route(
            "/tableOrders",
            get(order_list_handler).post(start_ordering_handler),
        )
        .route(
            "/tableOrders/{id}",
            get(get_order_handler).post(add_item_handler),
        )
        .route("/tableOrders/{id}/prepare", post(prepare_handler))
        .route("/tableOrders/{id}/bill", post(bill_handler))
}
