//! Menu item reference as seen by an order.

use std::hash::{Hash, Hasher};

/// An immutable reference to a menu item.
///
/// The catalog is owned elsewhere, so the identifier is opaque and may be
/// missing when an item is ordered by short name only. Two references denote
/// the same item when both carry an identifier and the identifiers match, or
/// when neither carries one and the short names match.
#[derive(Debug, Clone)]
pub struct ItemRef {
    id: Option<String>,
    short_name: String,
}

impl ItemRef {
    /// Creates a reference resolved against the catalog.
    pub fn new(id: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            short_name: short_name.into(),
        }
    }

    /// Creates a reference known only by its short name.
    pub fn named(short_name: impl Into<String>) -> Self {
        Self {
            id: None,
            short_name: short_name.into(),
        }
    }

    /// Builds a reference from an optional identifier.
    pub fn from_parts(id: Option<String>, short_name: String) -> Self {
        Self { id, short_name }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }
}

impl PartialEq for ItemRef {
    fn eq(&self, other: &Self) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.short_name == other.short_name,
            _ => false,
        }
    }
}

impl Eq for ItemRef {}

impl Hash for ItemRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.id {
            Some(id) => {
                0u8.hash(state);
                id.hash(state);
            }
            None => {
                1u8.hash(state);
                self.short_name.hash(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equal_by_id_regardless_of_name() {
        let a = ItemRef::new("42", "pizza");
        let b = ItemRef::new("42", "pizza margherita");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_ids_are_different_items() {
        assert_ne!(ItemRef::new("1", "pizza"), ItemRef::new("2", "pizza"));
    }

    #[test]
    fn test_equal_by_short_name_without_id() {
        assert_eq!(ItemRef::named("coke"), ItemRef::named("coke"));
        assert_ne!(ItemRef::named("coke"), ItemRef::named("lasagna"));
    }

    #[test]
    fn test_resolved_and_unresolved_never_match() {
        assert_ne!(ItemRef::new("1", "coke"), ItemRef::named("coke"));
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        let mut set = HashSet::new();
        set.insert(ItemRef::new("7", "pizza"));
        set.insert(ItemRef::new("7", "pizza (large)"));
        set.insert(ItemRef::named("pizza"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_accessors() {
        let item = ItemRef::from_parts(None, "lasagna".to_string());
        assert!(item.id().is_none());
        assert_eq!(item.short_name(), "lasagna");
    }
}
