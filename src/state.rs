//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::{RetryPolicy, TableOrderService, TableService};
use crate::domain::repositories::{TableOrderRepository, TableRepository};
use crate::domain::{Clock, IdGenerator};

/// Order service over whichever storage backend was configured.
pub type DynTableOrderService = TableOrderService<dyn TableOrderRepository, dyn TableRepository>;

/// Table service over whichever storage backend was configured.
pub type DynTableService = TableService<dyn TableRepository, dyn TableOrderRepository>;

/// Services shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub table_order_service: Arc<DynTableOrderService>,
    pub table_service: Arc<DynTableService>,
}

impl AppState {
    /// Wires services over the given repositories and capabilities.
    pub fn new(
        orders: Arc<dyn TableOrderRepository>,
        tables: Arc<dyn TableRepository>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        retry: RetryPolicy,
    ) -> Self {
        let table_order_service = Arc::new(
            TableOrderService::new(orders.clone(), tables.clone(), clock.clone(), ids)
                .with_retry_policy(retry),
        );
        let table_service = Arc::new(TableService::new(tables, orders, clock));

        Self {
            table_order_service,
            table_service,
        }
    }
}
