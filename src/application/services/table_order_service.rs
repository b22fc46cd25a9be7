//! Table order lifecycle service.

use std::sync::Arc;

use serde_json::json;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use uuid::Uuid;

use crate::domain::entities::{ItemRef, TableOrder};
use crate::domain::repositories::{OrderFilter, TableOrderRepository, TableRepository};
use crate::domain::{Clock, IdGenerator, OrderError};
use crate::error::AppError;

/// How stale writes are retried.
///
/// A retry reloads the order and re-applies the operation, so the delays only
/// spread out writers racing on the same order.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying.
    pub max_retries: usize,
    /// Multiplier for the exponential backoff (2, 4, 8… milliseconds).
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 10,
        }
    }
}

/// Outcome of a single load-apply-save round.
#[derive(Debug)]
enum Attempt {
    /// Another writer saved the order first.
    Stale,
    Failed(AppError),
}

/// Service driving table orders through their lifecycle.
///
/// Each operation loads the order, applies one state-machine transition in
/// memory and saves it back. Saves are version-checked, so concurrent requests
/// against the same order never lose each other's lines and exactly one of two
/// racing bill requests wins.
pub struct TableOrderService<O, T>
where
    O: TableOrderRepository + ?Sized,
    T: TableRepository + ?Sized,
{
    orders: Arc<O>,
    tables: Arc<T>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    retry: RetryPolicy,
}

impl<O, T> TableOrderService<O, T>
where
    O: TableOrderRepository + ?Sized,
    T: TableRepository + ?Sized,
{
    /// Creates a new table order service.
    pub fn new(
        orders: Arc<O>,
        tables: Arc<T>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            orders,
            tables,
            clock,
            ids,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy for stale writes.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Opens an order for a table.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `customers_count` is 0.
    /// Returns [`AppError::Unprocessable`] (`table_unavailable`) if the table
    /// does not exist or already has an unbilled order.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn start_ordering(
        &self,
        table_number: i64,
        customers_count: u32,
    ) -> Result<TableOrder, AppError> {
        let order = TableOrder::start(
            self.ids.next_id(),
            table_number,
            customers_count,
            self.clock.now(),
        )?;

        if self.tables.find_by_number(table_number).await?.is_none() {
            return Err(AppError::unprocessable(
                "table_unavailable",
                "Table does not exist",
                json!({ "table_number": table_number }),
            ));
        }

        if let Some(open) = self.orders.find_open_for_table(table_number).await? {
            return Err(table_taken(table_number, Some(open.id())));
        }

        // The store re-checks atomically; a racing start surfaces as Conflict.
        let created = self.orders.create(&order).await.map_err(|e| match e {
            AppError::Conflict { .. } => table_taken(table_number, None),
            other => other,
        })?;

        metrics::counter!("dining_orders_started_total").increment(1);
        tracing::info!(
            order_id = %created.id(),
            table_number,
            customers_count,
            status = created.status().as_str(),
            "Table order started"
        );

        Ok(created)
    }

    /// Adds items to an open order, merging with an existing line for the same item.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the order does not exist.
    /// Returns [`AppError::Validation`] if `how_many` is 0 or the merged quantity overflows.
    /// Returns [`AppError::Unprocessable`] (`illegal_state`) if the order is billed.
    /// Returns [`AppError::Conflict`] if concurrent writers exhausted the retries.
    pub async fn add_item(
        &self,
        order_id: Uuid,
        item: ItemRef,
        how_many: u32,
    ) -> Result<TableOrder, AppError> {
        let (order, ()) = self
            .mutate(order_id, |order| {
                order.add_item(item.clone(), how_many).map(|_| ())
            })
            .await?;

        tracing::debug!(
            order_id = %order_id,
            item = item.short_name(),
            how_many,
            lines = order.lines().len(),
            "Item added to order"
        );

        Ok(order)
    }

    /// Sends every not yet sent line to the kitchen.
    ///
    /// Returns how many individual items were newly sent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the order does not exist.
    /// Returns [`AppError::Unprocessable`] (`illegal_state`) if the order is billed.
    /// Returns [`AppError::Conflict`] if concurrent writers exhausted the retries.
    pub async fn send_for_preparation(&self, order_id: Uuid) -> Result<u64, AppError> {
        let (_, sent) = self
            .mutate(order_id, |order| order.send_for_preparation())
            .await?;

        metrics::counter!("dining_items_sent_total").increment(sent);
        tracing::info!(order_id = %order_id, items_sent = sent, "Items sent for preparation");

        Ok(sent)
    }

    /// Bills the order, closing it for good.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the order does not exist.
    /// Returns [`AppError::Unprocessable`] (`illegal_state`) if it was billed before.
    /// Returns [`AppError::Conflict`] if concurrent writers exhausted the retries.
    pub async fn bill(&self, order_id: Uuid) -> Result<TableOrder, AppError> {
        let at = self.clock.now();
        let (order, _) = self.mutate(order_id, |order| order.bill(at)).await?;

        metrics::counter!("dining_orders_billed_total").increment(1);
        tracing::info!(
            order_id = %order_id,
            table_number = order.table_number(),
            status = order.status().as_str(),
            "Table order billed"
        );

        Ok(order)
    }

    /// Retrieves an order by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the order does not exist.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn get_order(&self, order_id: Uuid) -> Result<TableOrder, AppError> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))
    }

    /// Lists orders, newest first, together with the total matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
    ) -> Result<(Vec<TableOrder>, i64), AppError> {
        let billed = filter.billed;
        tokio::try_join!(self.orders.list(filter), self.orders.count(billed))
    }

    /// Applies `operation` to the stored order, retrying on stale writes.
    ///
    /// State-machine rejections are returned immediately; only a lost version
    /// race triggers another round.
    async fn mutate<R, F>(
        &self,
        order_id: Uuid,
        operation: F,
    ) -> Result<(TableOrder, R), AppError>
    where
        R: Send,
        F: Fn(&mut TableOrder) -> Result<R, OrderError> + Send + Sync,
    {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(self.retry.base_delay_ms)
            .map(jitter)
            .take(self.retry.max_retries);
        let operation = &operation;

        RetryIf::spawn(
            strategy,
            move || self.try_mutate(order_id, operation),
            |e: &Attempt| matches!(e, Attempt::Stale),
        )
        .await
        .map_err(|e| match e {
            Attempt::Stale => {
                metrics::counter!("dining_order_update_conflicts_total").increment(1);
                tracing::warn!(order_id = %order_id, "Gave up on concurrently modified order");
                AppError::conflict(
                    "Table order was modified concurrently, retry later",
                    json!({ "order_id": order_id }),
                )
            }
            Attempt::Failed(err) => err,
        })
    }

    async fn try_mutate<R, F>(
        &self,
        order_id: Uuid,
        operation: &F,
    ) -> Result<(TableOrder, R), Attempt>
    where
        F: Fn(&mut TableOrder) -> Result<R, OrderError>,
    {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(Attempt::Failed)?
            .ok_or_else(|| Attempt::Failed(order_not_found(order_id)))?;

        let outcome = operation(&mut order).map_err(|e| Attempt::Failed(e.into()))?;

        match self.orders.update(&order).await.map_err(Attempt::Failed)? {
            Some(saved) => Ok((saved, outcome)),
            None => {
                tracing::debug!(
                    order_id = %order_id,
                    version = order.version(),
                    "Stale order version, retrying"
                );
                Err(Attempt::Stale)
            }
        }
    }
}

fn order_not_found(order_id: Uuid) -> AppError {
    AppError::not_found("Table order not found", json!({ "order_id": order_id }))
}

fn table_taken(table_number: i64, open_order_id: Option<Uuid>) -> AppError {
    AppError::unprocessable(
        "table_unavailable",
        "Table already has an open order",
        json!({ "table_number": table_number, "open_order_id": open_order_id }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Table;
    use crate::domain::repositories::{MockTableOrderRepository, MockTableRepository};
    use crate::domain::{FixedClock, RandomIdGenerator};
    use chrono::{DateTime, TimeZone, Utc};

    struct FixedIds(Uuid);

    impl IdGenerator for FixedIds {
        fn next_id(&self) -> Uuid {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 20, 0, 0).unwrap()
    }

    fn service(
        orders: MockTableOrderRepository,
        tables: MockTableRepository,
    ) -> TableOrderService<MockTableOrderRepository, MockTableRepository> {
        TableOrderService::new(
            Arc::new(orders),
            Arc::new(tables),
            Arc::new(FixedClock(now())),
            Arc::new(RandomIdGenerator),
        )
        .with_retry_policy(RetryPolicy {
            max_retries: 2,
            base_delay_ms: 1,
        })
    }

    fn stored_order(id: Uuid) -> TableOrder {
        TableOrder::start(id, 1, 4, now()).unwrap().with_version(1)
    }

    fn tables_with(number: i64) -> MockTableRepository {
        let mut tables = MockTableRepository::new();
        tables
            .expect_find_by_number()
            .withf(move |n| *n == number)
            .returning(move |n| Ok(Some(Table::new(n, now()))));
        tables
    }

    fn expect_saves(orders: &mut MockTableOrderRepository) {
        orders
            .expect_update()
            .returning(|o| Ok(Some(o.clone().with_version(o.version() + 1))));
    }

    #[tokio::test]
    async fn test_start_ordering_success() {
        let id = Uuid::new_v4();
        let mut orders = MockTableOrderRepository::new();
        orders
            .expect_find_open_for_table()
            .times(1)
            .returning(|_| Ok(None));
        orders
            .expect_create()
            .times(1)
            .returning(|o| Ok(o.clone().with_version(1)));

        let service = TableOrderService::new(
            Arc::new(orders),
            Arc::new(tables_with(1)),
            Arc::new(FixedClock(now())),
            Arc::new(FixedIds(id)),
        );

        let order = service.start_ordering(1, 4).await.unwrap();

        assert_eq!(order.id(), id);
        assert_eq!(order.table_number(), 1);
        assert_eq!(order.customers_count(), 4);
        assert_eq!(order.opened(), now());
        assert!(order.billed().is_none());
        assert!(order.lines().is_empty());
    }

    #[tokio::test]
    async fn test_start_ordering_zero_customers() {
        let service = service(MockTableOrderRepository::new(), MockTableRepository::new());

        let result = service.start_ordering(1, 0).await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_start_ordering_unknown_table() {
        let mut tables = MockTableRepository::new();
        tables
            .expect_find_by_number()
            .times(1)
            .returning(|_| Ok(None));
        let mut orders = MockTableOrderRepository::new();
        orders.expect_create().times(0);

        let result = service(orders, tables).start_ordering(9, 2).await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::Unprocessable {
                code: "table_unavailable",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_start_ordering_table_already_taken() {
        let mut orders = MockTableOrderRepository::new();
        let open = stored_order(Uuid::new_v4());
        orders
            .expect_find_open_for_table()
            .times(1)
            .returning(move |_| Ok(Some(open.clone())));
        orders.expect_create().times(0);

        let result = service(orders, tables_with(1)).start_ordering(1, 4).await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::Unprocessable {
                code: "table_unavailable",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_start_ordering_lost_race_on_create() {
        let mut orders = MockTableOrderRepository::new();
        orders
            .expect_find_open_for_table()
            .returning(|_| Ok(None));
        orders
            .expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let result = service(orders, tables_with(1)).start_ordering(1, 4).await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::Unprocessable {
                code: "table_unavailable",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_add_item_merges_and_saves() {
        let id = Uuid::new_v4();
        let mut stored = stored_order(id);
        stored.add_item(ItemRef::named("pizza"), 2).unwrap();

        let mut orders = MockTableOrderRepository::new();
        orders
            .expect_find_by_id()
            .withf(move |i| *i == id)
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));
        orders
            .expect_update()
            .withf(|o| o.version() == 1 && o.lines()[0].how_many() == 5)
            .times(1)
            .returning(|o| Ok(Some(o.clone().with_version(2))));

        let order = service(orders, MockTableRepository::new())
            .add_item(id, ItemRef::named("pizza"), 3)
            .await
            .unwrap();

        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.lines()[0].how_many(), 5);
        assert_eq!(order.version(), 2);
    }

    #[tokio::test]
    async fn test_add_item_unknown_order() {
        let mut orders = MockTableOrderRepository::new();
        orders.expect_find_by_id().times(1).returning(|_| Ok(None));
        orders.expect_update().times(0);

        let result = service(orders, MockTableRepository::new())
            .add_item(Uuid::new_v4(), ItemRef::named("pizza"), 1)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_item_to_billed_order_is_not_retried() {
        let id = Uuid::new_v4();
        let mut billed = stored_order(id);
        billed.bill(now()).unwrap();

        let mut orders = MockTableOrderRepository::new();
        orders
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(billed.clone())));
        orders.expect_update().times(0);

        let result = service(orders, MockTableRepository::new())
            .add_item(id, ItemRef::named("lasagna"), 1)
            .await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::Unprocessable {
                code: "illegal_state",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_stale_write_is_retried_with_fresh_state() {
        let id = Uuid::new_v4();
        let mut loads = 0;
        let mut orders = MockTableOrderRepository::new();
        orders.expect_find_by_id().times(2).returning(move |_| {
            loads += 1;
            let mut order = stored_order(id).with_version(loads);
            if loads == 2 {
                // A concurrent request added a coke in between.
                order.add_item(ItemRef::named("coke"), 3).unwrap();
            }
            Ok(Some(order))
        });

        let mut saves = 0;
        orders.expect_update().times(2).returning(move |o| {
            saves += 1;
            if saves == 1 {
                Ok(None)
            } else {
                Ok(Some(o.clone().with_version(o.version() + 1)))
            }
        });

        let order = service(orders, MockTableRepository::new())
            .add_item(id, ItemRef::named("pizza"), 2)
            .await
            .unwrap();

        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.lines()[0].item().short_name(), "coke");
        assert_eq!(order.lines()[1].item().short_name(), "pizza");
        assert_eq!(order.version(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_conflict() {
        let id = Uuid::new_v4();
        let mut orders = MockTableOrderRepository::new();
        orders
            .expect_find_by_id()
            .times(3)
            .returning(move |_| Ok(Some(stored_order(id))));
        orders.expect_update().times(3).returning(|_| Ok(None));

        let result = service(orders, MockTableRepository::new()).bill(id).await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_send_for_preparation_returns_item_count() {
        let id = Uuid::new_v4();
        let mut stored = stored_order(id);
        stored.add_item(ItemRef::named("pizza"), 2).unwrap();
        stored.add_item(ItemRef::named("coke"), 3).unwrap();

        let mut orders = MockTableOrderRepository::new();
        orders
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));
        orders
            .expect_update()
            .withf(|o| o.lines().iter().all(|l| l.is_sent_for_preparation()))
            .times(1)
            .returning(|o| Ok(Some(o.clone())));

        let sent = service(orders, MockTableRepository::new())
            .send_for_preparation(id)
            .await
            .unwrap();

        assert_eq!(sent, 5);
    }

    #[tokio::test]
    async fn test_bill_stamps_clock_time() {
        let id = Uuid::new_v4();
        let mut orders = MockTableOrderRepository::new();
        orders
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored_order(id))));
        expect_saves(&mut orders);

        let order = service(orders, MockTableRepository::new())
            .bill(id)
            .await
            .unwrap();

        assert_eq!(order.billed(), Some(now()));
    }

    #[tokio::test]
    async fn test_get_order_not_found() {
        let mut orders = MockTableOrderRepository::new();
        orders.expect_find_by_id().times(1).returning(|_| Ok(None));

        let result = service(orders, MockTableRepository::new())
            .get_order(Uuid::new_v4())
            .await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_orders_with_total() {
        let mut orders = MockTableOrderRepository::new();
        orders
            .expect_list()
            .withf(|f| f.offset == 0 && f.limit == 25 && f.billed == Some(false))
            .times(1)
            .returning(|_| Ok(vec![stored_order(Uuid::new_v4())]));
        orders
            .expect_count()
            .withf(|billed| *billed == Some(false))
            .times(1)
            .returning(|_| Ok(1));

        let (items, total) = service(orders, MockTableRepository::new())
            .list_orders(OrderFilter::new(0, 25).with_billed(Some(false)))
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(total, 1);
    }
}
