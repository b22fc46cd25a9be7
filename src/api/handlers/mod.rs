//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod table_orders;
pub mod tables;

pub use health::health_handler;
pub use table_orders::{
    add_item_handler, bill_handler, get_order_handler, order_list_handler, prepare_handler,
    start_ordering_handler,
};
pub use tables::{create_table_handler, get_table_handler, table_list_handler};
