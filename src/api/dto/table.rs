//! DTOs for table management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::TableStatus;

/// Request to register a table.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableRequest {
    #[validate(range(min = 1, message = "Table number must be positive"))]
    pub table_id: i64,
}

/// A table with its current occupancy.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableItem {
    pub number: i64,
    pub taken: bool,
    pub table_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<TableStatus> for TableItem {
    fn from(status: TableStatus) -> Self {
        Self {
            number: status.table.number,
            taken: status.is_taken(),
            table_order_id: status.open_order_id,
            created_at: status.table.created_at,
        }
    }
}

/// All registered tables, in ascending number.
#[derive(Debug, Serialize)]
pub struct TableListResponse {
    pub items: Vec<TableItem>,
}
