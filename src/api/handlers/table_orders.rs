//! Handlers for the table order lifecycle.
//!
//! An order is opened at a free table, receives items while open, sends
//! pending lines to the kitchen, and is billed exactly once. Once billed, every
//! mutation answers `422 Unprocessable Entity` with code `illegal_state`.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::pagination::{OrderQueryParams, PaginationMeta};
use crate::api::dto::table_order::{
    AddItemRequest, OrderListResponse, PreparationResponse, StartOrderingRequest,
    TableOrderResponse,
};
use crate::domain::repositories::OrderFilter;
use crate::error::AppError;
use crate::state::AppState;

fn to_u32(value: i64, field: &'static str) -> Result<u32, AppError> {
    u32::try_from(value).map_err(|_| {
        AppError::bad_request(
            format!("{field} is out of range"),
            json!({ "field": field, "value": value }),
        )
    })
}

/// Opens an order at a table.
///
/// # Endpoint
///
/// `POST /tableOrders`
///
/// # Request Body
///
/// ```json
/// { "tableId": 1, "customersCount": 4 }
/// ```
///
/// # Errors
///
/// Returns 400 if the customers count is not positive.
/// Returns 422 `table_unavailable` if the table is unknown or already taken.
pub async fn start_ordering_handler(
    State(state): State<AppState>,
    Json(payload): Json<StartOrderingRequest>,
) -> Result<(StatusCode, Json<TableOrderResponse>), AppError> {
    payload.validate()?;
    let customers_count = to_u32(payload.customers_count, "customersCount")?;

    let order = state
        .table_order_service
        .start_ordering(payload.table_id, customers_count)
        .await?;

    Ok((StatusCode::CREATED, Json((&order).into())))
}

/// Lists orders, newest first.
///
/// # Endpoint
///
/// `GET /tableOrders`
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `page_size` (optional): Items per page (default: 25, max: 100)
/// - `billed` (optional): `true` for billed orders, `false` for open ones
///
/// # Errors
///
/// Returns 400 Bad Request if pagination parameters are invalid.
pub async fn order_list_handler(
    State(state): State<AppState>,
    Query(params): Query<OrderQueryParams>,
) -> Result<Json<OrderListResponse>, AppError> {
    let (offset, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let filter = OrderFilter::new(offset, limit).with_billed(params.billed);

    let (orders, total_items) = state.table_order_service.list_orders(filter).await?;

    Ok(Json(OrderListResponse {
        pagination: PaginationMeta::new(
            params.pagination.page(),
            params.pagination.page_size(),
            total_items,
        ),
        items: orders.iter().map(TableOrderResponse::from).collect(),
    }))
}

/// Returns a single order.
///
/// # Endpoint
///
/// `GET /tableOrders/{id}`
///
/// # Errors
///
/// Returns 404 if the order does not exist.
pub async fn get_order_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<TableOrderResponse>, AppError> {
    let order = state.table_order_service.get_order(id).await?;
    Ok(Json((&order).into()))
}

/// Adds an item to an open order.
///
/// Adding an item already on the order increases that line's quantity.
///
/// # Endpoint
///
/// `POST /tableOrders/{id}`
///
/// # Request Body
///
/// ```json
/// { "shortName": "pizza", "howMany": 2 }
/// ```
///
/// # Errors
///
/// Returns 400 if the quantity is not positive.
/// Returns 404 if the order does not exist.
/// Returns 422 `illegal_state` if the order is billed.
pub async fn add_item_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<TableOrderResponse>), AppError> {
    payload.validate()?;
    let how_many = to_u32(payload.how_many, "howMany")?;

    let order = state
        .table_order_service
        .add_item(id, payload.item(), how_many)
        .await?;

    Ok((StatusCode::CREATED, Json((&order).into())))
}

/// Sends every pending line of an order to the kitchen.
///
/// # Endpoint
///
/// `POST /tableOrders/{id}/prepare`
///
/// # Response
///
/// ```json
/// { "howManyItemsSentForPreparation": 5 }
/// ```
///
/// # Errors
///
/// Returns 404 if the order does not exist.
/// Returns 422 `illegal_state` if the order is billed.
pub async fn prepare_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<PreparationResponse>, AppError> {
    let sent = state.table_order_service.send_for_preparation(id).await?;

    Ok(Json(PreparationResponse {
        how_many_items_sent_for_preparation: sent,
    }))
}

/// Bills an order and frees its table.
///
/// # Endpoint
///
/// `POST /tableOrders/{id}/bill`
///
/// # Errors
///
/// Returns 404 if the order does not exist.
/// Returns 422 `illegal_state` if the order was already billed.
pub async fn bill_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<TableOrderResponse>, AppError> {
    let order = state.table_order_service.bill(id).await?;
    Ok(Json((&order).into()))
}
