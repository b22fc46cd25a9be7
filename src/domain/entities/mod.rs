//! Core domain entities of the dining service.
//!
//! # Entity Types
//!
//! - [`ItemRef`] - Opaque reference to a menu item
//! - [`OrderingLine`] - One item of an order with its quantity and preparation flag
//! - [`TableOrder`] - The order lifecycle state machine
//! - [`Table`] - A physical table, with [`TableStatus`] adding its occupancy
//!
//! Unlike plain records, [`TableOrder`] keeps its fields private: every change
//! goes through an operation that enforces the lifecycle rules.

pub mod item;
pub mod ordering_line;
pub mod table;
pub mod table_order;

pub use item::ItemRef;
pub use ordering_line::OrderingLine;
pub use table::{Table, TableStatus};
pub use table_order::{OrderStatus, TableOrder};
