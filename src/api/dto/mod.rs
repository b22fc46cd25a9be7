//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation. Bodies use camelCase field names.

pub mod health;
pub mod pagination;
pub mod table;
pub mod table_order;
