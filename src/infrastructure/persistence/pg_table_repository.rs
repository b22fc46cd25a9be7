//! PostgreSQL implementation of the table repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::Table;
use crate::domain::repositories::TableRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct TableRow {
    number: i64,
    created_at: DateTime<Utc>,
}

impl From<TableRow> for Table {
    fn from(row: TableRow) -> Self {
        Table::new(row.number, row.created_at)
    }
}

/// PostgreSQL repository for dining tables.
pub struct PgTableRepository {
    pool: Arc<PgPool>,
}

impl PgTableRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TableRepository for PgTableRepository {
    async fn create(&self, table: &Table) -> Result<Table, AppError> {
        let row = sqlx::query_as::<_, TableRow>(
            r#"
            INSERT INTO dining_tables (number, created_at)
            VALUES ($1, $2)
            RETURNING number, created_at
            "#,
        )
        .bind(table.number)
        .bind(table.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_number(&self, number: i64) -> Result<Option<Table>, AppError> {
        let row = sqlx::query_as::<_, TableRow>(
            r#"
            SELECT number, created_at
            FROM dining_tables
            WHERE number = $1
            "#,
        )
        .bind(number)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Table::from))
    }

    async fn list(&self) -> Result<Vec<Table>, AppError> {
        let rows = sqlx::query_as::<_, TableRow>(
            r#"
            SELECT number, created_at
            FROM dining_tables
            ORDER BY number
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Table::from).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dining_tables")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
