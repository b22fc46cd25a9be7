//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::table_order_service::TableOrderService`] - Order lifecycle: start, add items, prepare, bill
//! - [`services::table_service::TableService`] - Table registration and occupancy

pub mod services;
