//! Repository trait definitions for the domain layer.
//!
//! Repository traits abstract data access; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated via
//! `mockall` for service tests.
//!
//! # Available Repositories
//!
//! - [`TableOrderRepository`] - Order storage with optimistic versioning
//! - [`TableRepository`] - Table registration and lookup

pub mod table_order_repository;
pub mod table_repository;

pub use table_order_repository::{OrderFilter, TableOrderRepository};
pub use table_repository::TableRepository;

#[cfg(test)]
pub use table_order_repository::MockTableOrderRepository;
#[cfg(test)]
pub use table_repository::MockTableRepository;
