//! In-memory repository implementations.
//!
//! Useful for local development and tests where a PostgreSQL instance is not
//! available. Data is lost when the process exits. Each repository guards its
//! map with a `tokio` read-write lock, so the check-then-write operations
//! (open order uniqueness, version checks) run atomically under the write lock.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::{Table, TableOrder};
use crate::domain::repositories::{OrderFilter, TableOrderRepository, TableRepository};
use crate::error::AppError;

/// Process-local table order storage.
pub struct InMemoryTableOrderRepository {
    orders: RwLock<HashMap<Uuid, TableOrder>>,
}

impl InMemoryTableOrderRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        debug!("Using in-memory table order storage");
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTableOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_billed(order: &TableOrder, billed: Option<bool>) -> bool {
    billed.is_none_or(|billed| order.is_billed() == billed)
}

#[async_trait]
impl TableOrderRepository for InMemoryTableOrderRepository {
    async fn create(&self, order: &TableOrder) -> Result<TableOrder, AppError> {
        let mut orders = self.orders.write().await;

        if orders.contains_key(&order.id()) {
            return Err(AppError::conflict(
                "Table order already exists",
                json!({ "order_id": order.id() }),
            ));
        }

        let table_taken = !order.is_billed()
            && orders
                .values()
                .any(|o| o.table_number() == order.table_number() && !o.is_billed());
        if table_taken {
            return Err(AppError::conflict(
                "Table already has an open order",
                json!({ "table_number": order.table_number() }),
            ));
        }

        let stored = order.clone().with_version(1);
        orders.insert(stored.id(), stored.clone());

        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TableOrder>, AppError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn find_open_for_table(
        &self,
        table_number: i64,
    ) -> Result<Option<TableOrder>, AppError> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|o| o.table_number() == table_number && !o.is_billed())
            .cloned())
    }

    async fn update(&self, order: &TableOrder) -> Result<Option<TableOrder>, AppError> {
        let mut orders = self.orders.write().await;

        match orders.get_mut(&order.id()) {
            Some(current) if current.version() == order.version() => {
                *current = order.clone().with_version(order.version() + 1);
                Ok(Some(current.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<TableOrder>, AppError> {
        let orders = self.orders.read().await;

        let mut matching: Vec<&TableOrder> = orders
            .values()
            .filter(|o| matches_billed(o, filter.billed))
            .collect();
        matching.sort_by(|a, b| b.opened().cmp(&a.opened()).then(a.id().cmp(&b.id())));

        Ok(matching
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, billed: Option<bool>) -> Result<i64, AppError> {
        let orders = self.orders.read().await;
        Ok(orders.values().filter(|o| matches_billed(o, billed)).count() as i64)
    }
}

/// Process-local table storage, iterated in table number order.
pub struct InMemoryTableRepository {
    tables: RwLock<BTreeMap<i64, Table>>,
}

impl InMemoryTableRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        debug!("Using in-memory table storage");
        Self {
            tables: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryTableRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableRepository for InMemoryTableRepository {
    async fn create(&self, table: &Table) -> Result<Table, AppError> {
        let mut tables = self.tables.write().await;

        if tables.contains_key(&table.number) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "number": table.number }),
            ));
        }

        tables.insert(table.number, table.clone());

        Ok(table.clone())
    }

    async fn find_by_number(&self, number: i64) -> Result<Option<Table>, AppError> {
        Ok(self.tables.read().await.get(&number).cloned())
    }

    async fn list(&self) -> Result<Vec<Table>, AppError> {
        Ok(self.tables.read().await.values().cloned().collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.tables.read().await.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ItemRef;
    use chrono::{Duration, TimeZone, Utc};

    fn order_for(table_number: i64, minutes: i64) -> TableOrder {
        let opened =
            Utc.with_ymd_and_hms(2024, 5, 17, 19, 0, 0).unwrap() + Duration::minutes(minutes);
        TableOrder::start(Uuid::new_v4(), table_number, 2, opened).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryTableOrderRepository::new();
        let order = order_for(1, 0);

        let stored = repo.create(&order).await.unwrap();
        assert_eq!(stored.version(), 1);

        let found = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(found, stored);
        assert_eq!(
            repo.find_open_for_table(1).await.unwrap().map(|o| o.id()),
            Some(order.id())
        );
        assert!(repo.find_open_for_table(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_second_open_order_for_table() {
        let repo = InMemoryTableOrderRepository::new();
        repo.create(&order_for(1, 0)).await.unwrap();

        let result = repo.create(&order_for(1, 5)).await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_table_reusable_after_billing() {
        let repo = InMemoryTableOrderRepository::new();
        let mut first = repo.create(&order_for(1, 0)).await.unwrap();
        first.bill(Utc::now()).unwrap();
        repo.update(&first).await.unwrap().unwrap();

        assert!(repo.create(&order_for(1, 60)).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_persists_lines() {
        let repo = InMemoryTableOrderRepository::new();
        let mut order = repo.create(&order_for(1, 0)).await.unwrap();
        order.add_item(ItemRef::named("pizza"), 2).unwrap();

        let saved = repo.update(&order).await.unwrap().unwrap();

        assert_eq!(saved.version(), 2);
        let found = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(found.lines().len(), 1);
        assert_eq!(found.lines()[0].how_many(), 2);
    }

    #[tokio::test]
    async fn test_update_with_stale_version_is_rejected() {
        let repo = InMemoryTableOrderRepository::new();
        let stored = repo.create(&order_for(1, 0)).await.unwrap();

        let mut first = stored.clone();
        first.add_item(ItemRef::named("pizza"), 1).unwrap();
        let mut second = stored.clone();
        second.add_item(ItemRef::named("coke"), 1).unwrap();

        assert!(repo.update(&first).await.unwrap().is_some());
        assert!(repo.update(&second).await.unwrap().is_none());

        let found = repo.find_by_id(stored.id()).await.unwrap().unwrap();
        assert_eq!(found.lines()[0].item().short_name(), "pizza");
    }

    #[tokio::test]
    async fn test_update_unknown_order() {
        let repo = InMemoryTableOrderRepository::new();
        assert!(repo.update(&order_for(1, 0)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_filter_and_paging() {
        let repo = InMemoryTableOrderRepository::new();
        let mut billed = repo.create(&order_for(1, 0)).await.unwrap();
        billed.bill(Utc::now()).unwrap();
        repo.update(&billed).await.unwrap();
        let second = repo.create(&order_for(2, 10)).await.unwrap();
        let third = repo.create(&order_for(3, 20)).await.unwrap();

        let all = repo.list(OrderFilter::new(0, 10)).await.unwrap();
        let ids: Vec<_> = all.iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![third.id(), second.id(), billed.id()]);

        let open = repo
            .list(OrderFilter::new(0, 10).with_billed(Some(false)))
            .await
            .unwrap();
        assert_eq!(open.len(), 2);

        let page = repo.list(OrderFilter::new(1, 1)).await.unwrap();
        assert_eq!(page[0].id(), second.id());

        assert_eq!(repo.count(None).await.unwrap(), 3);
        assert_eq!(repo.count(Some(true)).await.unwrap(), 1);
        assert_eq!(repo.count(Some(false)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_tables_sorted_and_unique() {
        let repo = InMemoryTableRepository::new();
        let created_at = Utc.with_ymd_and_hms(2024, 5, 17, 18, 0, 0).unwrap();
        repo.create(&Table::new(3, created_at)).await.unwrap();
        repo.create(&Table::new(1, created_at)).await.unwrap();

        assert!(matches!(
            repo.create(&Table::new(1, created_at)).await.unwrap_err(),
            AppError::Conflict { .. }
        ));

        let numbers: Vec<_> = repo.list().await.unwrap().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(repo.count().await.unwrap(), 2);
        assert!(repo.find_by_number(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_table_keeps_given_creation_time() {
        let repo = InMemoryTableRepository::new();
        let created_at = Utc.with_ymd_and_hms(2024, 5, 17, 18, 0, 0).unwrap();

        let stored = repo.create(&Table::new(7, created_at)).await.unwrap();

        assert_eq!(stored.created_at, created_at);
        let found = repo.find_by_number(7).await.unwrap().unwrap();
        assert_eq!(found.created_at, created_at);
    }
}
