//! Dining table entity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A physical table customers can be seated at.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub number: i64,
    pub created_at: DateTime<Utc>,
}

impl Table {
    pub fn new(number: i64, created_at: DateTime<Utc>) -> Self {
        Self { number, created_at }
    }
}

/// A table together with its current occupancy.
///
/// Occupancy is derived from the open order, never stored on the table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStatus {
    pub table: Table,
    pub open_order_id: Option<Uuid>,
}

impl TableStatus {
    /// Returns true while an unbilled order exists for the table.
    pub fn is_taken(&self) -> bool {
        self.open_order_id.is_some()
    }
}
