//! DTOs for table order endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::pagination::PaginationMeta;
use crate::domain::entities::{ItemRef, OrderingLine, TableOrder};

/// Request to open an order at a table.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartOrderingRequest {
    #[validate(range(min = 1, message = "Table number must be positive"))]
    pub table_id: i64,

    #[validate(range(min = 1, message = "Customers count must be at least 1"))]
    pub customers_count: i64,
}

/// Item to add to an open order.
///
/// `id` is the menu identifier when the client knows it; lines are matched
/// by `id` when present and by `shortName` otherwise.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[validate(length(min = 1, message = "Item id must not be empty"))]
    pub id: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Short name must be 1-100 characters"))]
    pub short_name: String,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub how_many: i64,
}

impl AddItemRequest {
    pub fn item(&self) -> ItemRef {
        ItemRef::from_parts(self.id.clone(), self.short_name.clone())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub short_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderingLineItem {
    pub item: ItemItem,
    pub how_many: u32,
    pub sent_for_preparation: bool,
}

impl From<&OrderingLine> for OrderingLineItem {
    fn from(line: &OrderingLine) -> Self {
        Self {
            item: ItemItem {
                id: line.item().id().map(str::to_string),
                short_name: line.item().short_name().to_string(),
            },
            how_many: line.how_many(),
            sent_for_preparation: line.is_sent_for_preparation(),
        }
    }
}

/// Full view of a table order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOrderResponse {
    pub id: Uuid,
    pub table_number: i64,
    pub customers_count: u32,
    pub opened: DateTime<Utc>,
    pub billed: Option<DateTime<Utc>>,
    pub lines: Vec<OrderingLineItem>,
}

impl From<&TableOrder> for TableOrderResponse {
    fn from(order: &TableOrder) -> Self {
        Self {
            id: order.id(),
            table_number: order.table_number(),
            customers_count: order.customers_count(),
            opened: order.opened(),
            billed: order.billed(),
            lines: order.lines().iter().map(OrderingLineItem::from).collect(),
        }
    }
}

/// Result of sending pending lines to the kitchen.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationResponse {
    pub how_many_items_sent_for_preparation: u64,
}

/// Paginated list of orders, newest first.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<TableOrderResponse>,
}
