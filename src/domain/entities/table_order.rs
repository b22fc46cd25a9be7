//! Table order entity and its lifecycle state machine.
//!
//! An order starts **open**, accepts items and preparation sweeps while open,
//! and moves once, irreversibly, to **billed**. Every operation validates first
//! and mutates second, so a rejected call leaves the order untouched.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::item::ItemRef;
use super::ordering_line::OrderingLine;
use crate::domain::order_error::OrderError;

/// Lifecycle state of a [`TableOrder`], derived from its `billed` timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Open,
    Billed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Billed => "billed",
        }
    }
}

/// An order placed by the customers seated at one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOrder {
    id: Uuid,
    table_number: i64,
    customers_count: u32,
    opened: DateTime<Utc>,
    billed: Option<DateTime<Utc>>,
    lines: Vec<OrderingLine>,
    version: i64,
}

impl TableOrder {
    /// Opens a new order for a table.
    ///
    /// Table existence and the one-open-order-per-table rule are checked by
    /// the caller against the repositories.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NonPositiveCustomersCount`] when `customers_count` is 0.
    pub fn start(
        id: Uuid,
        table_number: i64,
        customers_count: u32,
        opened: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if customers_count == 0 {
            return Err(OrderError::NonPositiveCustomersCount);
        }

        Ok(Self {
            id,
            table_number,
            customers_count,
            opened,
            billed: None,
            lines: Vec::new(),
            version: 0,
        })
    }

    /// Rebuilds an order from storage without re-running lifecycle checks.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: Uuid,
        table_number: i64,
        customers_count: u32,
        opened: DateTime<Utc>,
        billed: Option<DateTime<Utc>>,
        lines: Vec<OrderingLine>,
        version: i64,
    ) -> Self {
        Self {
            id,
            table_number,
            customers_count,
            opened,
            billed,
            lines,
            version,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn table_number(&self) -> i64 {
        self.table_number
    }

    pub fn customers_count(&self) -> u32 {
        self.customers_count
    }

    pub fn opened(&self) -> DateTime<Utc> {
        self.opened
    }

    pub fn billed(&self) -> Option<DateTime<Utc>> {
        self.billed
    }

    /// Lines in the order their items were first added.
    pub fn lines(&self) -> &[OrderingLine] {
        &self.lines
    }

    /// Storage revision this snapshot was loaded at.
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Returns a copy stamped with a new storage revision.
    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn status(&self) -> OrderStatus {
        if self.billed.is_some() {
            OrderStatus::Billed
        } else {
            OrderStatus::Open
        }
    }

    pub fn is_billed(&self) -> bool {
        self.billed.is_some()
    }

    /// Adds `how_many` of `item` to the order.
    ///
    /// Quantities for an item already on the order accumulate on its existing
    /// line, whose preparation flag is left as it was. New items get a new line
    /// at the end.
    ///
    /// # Errors
    ///
    /// - [`OrderError::AlreadyBilled`] if the order is billed
    /// - [`OrderError::NonPositiveQuantity`] if `how_many` is 0
    /// - [`OrderError::QuantityOverflow`] if the merged quantity does not fit
    pub fn add_item(
        &mut self,
        item: ItemRef,
        how_many: u32,
    ) -> Result<&[OrderingLine], OrderError> {
        self.ensure_open()?;

        if how_many == 0 {
            return Err(OrderError::NonPositiveQuantity);
        }

        match self.lines.iter_mut().find(|line| *line.item() == item) {
            Some(line) => {
                if line.how_many().checked_add(how_many).is_none() {
                    return Err(OrderError::QuantityOverflow {
                        short_name: item.short_name().to_string(),
                    });
                }
                line.increase(how_many);
            }
            None => self.lines.push(OrderingLine::new(item, how_many)),
        }

        Ok(&self.lines)
    }

    /// Marks every unsent line as sent for preparation.
    ///
    /// Returns the total quantity of items on the lines this call flipped,
    /// so a second sweep with nothing new added returns 0.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::AlreadyBilled`] if the order is billed.
    pub fn send_for_preparation(&mut self) -> Result<u64, OrderError> {
        self.ensure_open()?;

        let sent = self
            .lines
            .iter_mut()
            .filter_map(|line| {
                line.mark_sent_for_preparation()
                    .then(|| u64::from(line.how_many()))
            })
            .sum();

        Ok(sent)
    }

    /// Closes the order. This is the only transition and it happens once.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::AlreadyBilled`] on a second call; the original
    /// billing time is kept.
    pub fn bill(&mut self, at: DateTime<Utc>) -> Result<DateTime<Utc>, OrderError> {
        self.ensure_open()?;
        self.billed = Some(at);
        Ok(at)
    }

    fn ensure_open(&self) -> Result<(), OrderError> {
        if self.is_billed() {
            return Err(OrderError::AlreadyBilled { order_id: self.id });
        }
        Ok(())
    }
}
