//! A single line of a table order.

use super::item::ItemRef;

/// One ordered item and how many of it were requested.
///
/// Lines are owned by their [`super::TableOrder`] and only mutated through it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingLine {
    item: ItemRef,
    how_many: u32,
    sent_for_preparation: bool,
}

impl OrderingLine {
    /// Creates an unsent line.
    pub fn new(item: ItemRef, how_many: u32) -> Self {
        Self {
            item,
            how_many,
            sent_for_preparation: false,
        }
    }

    /// Rebuilds a line from storage.
    pub fn from_parts(item: ItemRef, how_many: u32, sent_for_preparation: bool) -> Self {
        Self {
            item,
            how_many,
            sent_for_preparation,
        }
    }

    pub fn item(&self) -> &ItemRef {
        &self.item
    }

    pub fn how_many(&self) -> u32 {
        self.how_many
    }

    pub fn is_sent_for_preparation(&self) -> bool {
        self.sent_for_preparation
    }

    /// Adds `by` to the quantity. Callers guarantee the sum fits.
    pub fn increase(&mut self, by: u32) {
        self.how_many += by;
    }

    /// Flags the line as sent to the kitchen.
    ///
    /// Returns `true` only when this call flipped the flag.
    pub fn mark_sent_for_preparation(&mut self) -> bool {
        let transitioned = !self.sent_for_preparation;
        self.sent_for_preparation = true;
        transitioned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_is_unsent() {
        let line = OrderingLine::new(ItemRef::named("pizza"), 2);
        assert_eq!(line.how_many(), 2);
        assert!(!line.is_sent_for_preparation());
        assert_eq!(line.item().short_name(), "pizza");
    }

    #[test]
    fn test_increase() {
        let mut line = OrderingLine::new(ItemRef::named("coke"), 3);
        line.increase(4);
        assert_eq!(line.how_many(), 7);
    }

    #[test]
    fn test_mark_sent_is_idempotent() {
        let mut line = OrderingLine::new(ItemRef::named("coke"), 1);
        assert!(line.mark_sent_for_preparation());
        assert!(!line.mark_sent_for_preparation());
        assert!(line.is_sent_for_preparation());
    }
}
