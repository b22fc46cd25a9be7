//! Errors raised by the table order state machine.

use thiserror::Error;
use uuid::Uuid;

/// Rejection of a table order operation.
///
/// Every variant is raised before any field of the order is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The order was billed; it accepts no further items or preparation requests.
    #[error("order {order_id} already billed")]
    AlreadyBilled { order_id: Uuid },

    #[error("quantity must be a positive integer")]
    NonPositiveQuantity,

    #[error("customers count must be a positive integer")]
    NonPositiveCustomersCount,

    #[error("quantity of '{short_name}' would exceed {max}", max = u32::MAX)]
    QuantityOverflow { short_name: String },
}

impl OrderError {
    /// Returns true when the operation is illegal in the order's current state,
    /// as opposed to being malformed input.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, OrderError::AlreadyBilled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_billed_is_illegal_state() {
        let err = OrderError::AlreadyBilled {
            order_id: Uuid::nil(),
        };
        assert!(err.is_illegal_state());
        assert!(err.to_string().contains("already billed"));
    }

    #[test]
    fn test_validation_errors_are_not_illegal_state() {
        assert!(!OrderError::NonPositiveQuantity.is_illegal_state());
        assert!(!OrderError::NonPositiveCustomersCount.is_illegal_state());
        assert!(
            !OrderError::QuantityOverflow {
                short_name: "pizza".to_string()
            }
            .is_illegal_state()
        );
    }
}
