//! Repository trait for table order storage.

use crate::domain::entities::TableOrder;
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Filter criteria for order listings.
#[derive(Debug, Clone)]
pub struct OrderFilter {
    pub offset: i64,
    pub limit: i64,
    /// `Some(true)` keeps billed orders only, `Some(false)` open ones only.
    pub billed: Option<bool>,
}

impl OrderFilter {
    /// Creates a new filter with pagination parameters.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            billed: None,
        }
    }

    /// Restricts the listing to billed or open orders.
    pub fn with_billed(mut self, billed: Option<bool>) -> Self {
        self.billed = billed;
        self
    }
}

/// Repository interface for table orders.
///
/// Stores whole orders, lines included, and serializes concurrent writers with
/// a per-order version: [`TableOrderRepository::update`] only succeeds when the
/// stored version still matches the one the order was loaded at.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTableOrderRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryTableOrderRepository`] - Process-local storage
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableOrderRepository: Send + Sync {
    /// Stores a freshly started order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the table already has an unbilled order.
    /// The check and the insert are atomic.
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, order: &TableOrder) -> Result<TableOrder, AppError>;

    /// Finds an order by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TableOrder>, AppError>;

    /// Finds the unbilled order of a table, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_open_for_table(&self, table_number: i64)
    -> Result<Option<TableOrder>, AppError>;

    /// Persists a modified order.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(order))` with the bumped version if the write went through
    /// - `Ok(None)` if the stored version moved on since `order` was loaded
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn update(&self, order: &TableOrder) -> Result<Option<TableOrder>, AppError>;

    /// Lists orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list(&self, filter: OrderFilter) -> Result<Vec<TableOrder>, AppError>;

    /// Counts orders, optionally restricted to billed or open ones.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self, billed: Option<bool>) -> Result<i64, AppError>;
}
