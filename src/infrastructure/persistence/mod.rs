//! Repository implementations.
//!
//! # Repositories
//!
//! - [`PgTableOrderRepository`] - Order storage in PostgreSQL
//! - [`PgTableRepository`] - Table storage in PostgreSQL
//! - [`InMemoryTableOrderRepository`], [`InMemoryTableRepository`] - Process-local
//!   storage for development and tests

pub mod in_memory;
pub mod pg_table_order_repository;
pub mod pg_table_repository;

pub use in_memory::{InMemoryTableOrderRepository, InMemoryTableRepository};
pub use pg_table_order_repository::PgTableOrderRepository;
pub use pg_table_repository::PgTableRepository;
