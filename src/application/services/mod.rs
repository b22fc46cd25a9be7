//! Business logic services for the application layer.

pub mod table_order_service;
pub mod table_service;

pub use table_order_service::{RetryPolicy, TableOrderService};
pub use table_service::TableService;
