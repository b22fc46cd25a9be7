//! PostgreSQL implementation of the table order repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{ItemRef, OrderingLine, TableOrder};
use crate::domain::repositories::{OrderFilter, TableOrderRepository};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    table_number: i64,
    customers_count: i64,
    opened: DateTime<Utc>,
    billed: Option<DateTime<Utc>>,
    version: i64,
}

#[derive(sqlx::FromRow)]
struct LineRow {
    order_id: Uuid,
    item_id: Option<String>,
    short_name: String,
    how_many: i64,
    sent_for_preparation: bool,
}

const ORDER_COLUMNS: &str = "id, table_number, customers_count, opened, billed, version";

/// PostgreSQL repository for table orders.
///
/// Orders live in `table_orders`, their lines in `ordering_lines` keyed by
/// position so insertion order survives the round trip. A partial unique index
/// on `table_number WHERE billed IS NULL` makes the one-open-order-per-table
/// rule atomic, and `version` guards updates against lost writes.
pub struct PgTableOrderRepository {
    pool: Arc<PgPool>,
}

impl PgTableOrderRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Loads lines for a batch of orders, grouped by order and kept in position order.
    async fn load_lines(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<OrderingLine>>, AppError> {
        let rows = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT order_id, item_id, short_name, how_many, sent_for_preparation
            FROM ordering_lines
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut lines: HashMap<Uuid, Vec<OrderingLine>> = HashMap::new();
        for row in rows {
            let how_many = u32::try_from(row.how_many).map_err(|_| {
                AppError::internal(
                    "Stored line quantity out of range",
                    json!({ "order_id": row.order_id, "how_many": row.how_many }),
                )
            })?;

            lines.entry(row.order_id).or_default().push(OrderingLine::from_parts(
                ItemRef::from_parts(row.item_id, row.short_name),
                how_many,
                row.sent_for_preparation,
            ));
        }

        Ok(lines)
    }

    /// Attaches lines to order rows, preserving row order.
    async fn hydrate(&self, rows: Vec<OrderRow>) -> Result<Vec<TableOrder>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut lines = self.load_lines(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_lines = lines.remove(&row.id).unwrap_or_default();
                into_order(row, order_lines)
            })
            .collect()
    }

    async fn insert_lines(
        tx: &mut Transaction<'_, Postgres>,
        order: &TableOrder,
    ) -> Result<(), AppError> {
        for (position, line) in order.lines().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO ordering_lines
                    (order_id, position, item_id, short_name, how_many, sent_for_preparation)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order.id())
            .bind(position as i32)
            .bind(line.item().id())
            .bind(line.item().short_name())
            .bind(i64::from(line.how_many()))
            .bind(line.is_sent_for_preparation())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

fn into_order(row: OrderRow, lines: Vec<OrderingLine>) -> Result<TableOrder, AppError> {
    let customers_count = u32::try_from(row.customers_count).map_err(|_| {
        AppError::internal(
            "Stored customers count out of range",
            json!({ "order_id": row.id, "customers_count": row.customers_count }),
        )
    })?;

    Ok(TableOrder::from_parts(
        row.id,
        row.table_number,
        customers_count,
        row.opened,
        row.billed,
        lines,
        row.version,
    ))
}

#[async_trait]
impl TableOrderRepository for PgTableOrderRepository {
    async fn create(&self, order: &TableOrder) -> Result<TableOrder, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO table_orders (id, table_number, customers_count, opened, billed, version)
            VALUES ($1, $2, $3, $4, $5, 1)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.id())
        .bind(order.table_number())
        .bind(i64::from(order.customers_count()))
        .bind(order.opened())
        .bind(order.billed())
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_lines(&mut tx, order).await?;

        tx.commit().await?;

        // Timestamps come back at the column's microsecond precision.
        into_order(row, order.lines().to_vec())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TableOrder>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM table_orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_open_for_table(
        &self,
        table_number: i64,
    ) -> Result<Option<TableOrder>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM table_orders WHERE table_number = $1 AND billed IS NULL"
        ))
        .bind(table_number)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn update(&self, order: &TableOrder) -> Result<Option<TableOrder>, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE table_orders SET
                customers_count = $3,
                billed          = $4,
                version         = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.id())
        .bind(order.version())
        .bind(i64::from(order.customers_count()))
        .bind(order.billed())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM ordering_lines WHERE order_id = $1")
            .bind(order.id())
            .execute(&mut *tx)
            .await?;

        Self::insert_lines(&mut tx, order).await?;

        tx.commit().await?;

        into_order(row, order.lines().to_vec()).map(Some)
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<TableOrder>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM table_orders
            WHERE ($1::boolean IS NULL OR (billed IS NOT NULL) = $1)
            ORDER BY opened DESC, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(filter.billed)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        self.hydrate(rows).await
    }

    async fn count(&self, billed: Option<bool>) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM table_orders
            WHERE ($1::boolean IS NULL OR (billed IS NOT NULL) = $1)
            "#,
        )
        .bind(billed)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
