//! Repository trait for dining tables.

use crate::domain::entities::Table;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the restaurant's tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableRepository: Send + Sync {
    /// Registers a table, returning it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a table with this number exists.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, table: &Table) -> Result<Table, AppError>;

    /// Finds a table by its number.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_number(&self, number: i64) -> Result<Option<Table>, AppError>;

    /// Lists all tables ordered by number.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list(&self) -> Result<Vec<Table>, AppError>;

    /// Counts registered tables. Doubles as a storage connectivity check.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;
}
