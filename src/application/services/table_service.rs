//! Table management service.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::domain::Clock;
use crate::domain::entities::{Table, TableStatus};
use crate::domain::repositories::{OrderFilter, TableOrderRepository, TableRepository};
use crate::error::AppError;

/// Service for registering tables and reporting whether they are taken.
pub struct TableService<T, O>
where
    T: TableRepository + ?Sized,
    O: TableOrderRepository + ?Sized,
{
    tables: Arc<T>,
    orders: Arc<O>,
    clock: Arc<dyn Clock>,
}

impl<T, O> TableService<T, O>
where
    T: TableRepository + ?Sized,
    O: TableOrderRepository + ?Sized,
{
    /// Creates a new table service.
    pub fn new(tables: Arc<T>, orders: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tables,
            orders,
            clock,
        }
    }

    /// Registers a new table.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `number` is not positive.
    /// Returns [`AppError::Conflict`] if the table already exists.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn create_table(&self, number: i64) -> Result<Table, AppError> {
        if number <= 0 {
            return Err(AppError::bad_request(
                "Table number must be a positive integer",
                json!({ "number": number }),
            ));
        }

        let table = Table::new(number, self.clock.now());

        let table = self.tables.create(&table).await.map_err(|e| match e {
            AppError::Conflict { .. } => {
                AppError::conflict("Table already exists", json!({ "number": number }))
            }
            other => other,
        })?;

        tracing::info!(table_number = number, "Table created");

        Ok(table)
    }

    /// Retrieves a table with its occupancy.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the table does not exist.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn get_table(&self, number: i64) -> Result<TableStatus, AppError> {
        let table = self
            .tables
            .find_by_number(number)
            .await?
            .ok_or_else(|| AppError::not_found("Table not found", json!({ "number": number })))?;

        let open_order_id = self
            .orders
            .find_open_for_table(number)
            .await?
            .map(|order| order.id());

        Ok(TableStatus {
            table,
            open_order_id,
        })
    }

    /// Lists all tables by ascending number with their occupancy.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn list_tables(&self) -> Result<Vec<TableStatus>, AppError> {
        let tables = self.tables.list().await?;
        if tables.is_empty() {
            return Ok(Vec::new());
        }

        // At most one open order per table, so this page covers all of them.
        let open_orders = self
            .orders
            .list(OrderFilter::new(0, tables.len() as i64).with_billed(Some(false)))
            .await?;

        let mut open_by_table: HashMap<i64, _> = open_orders
            .into_iter()
            .map(|order| (order.table_number(), order.id()))
            .collect();

        Ok(tables
            .into_iter()
            .map(|table| TableStatus {
                open_order_id: open_by_table.remove(&table.number),
                table,
            })
            .collect())
    }

    /// Counts registered tables.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn count_tables(&self) -> Result<i64, AppError> {
        self.tables.count().await
    }
}
