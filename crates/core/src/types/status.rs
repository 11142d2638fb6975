//! Order delivery status.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Delivery status carried on an order.
///
/// Stored and serialized as a plain integer. The two states the kitchen
/// workflow uses are [`OrderStatus::OUT_FOR_DELIVERY`] (0) and
/// [`OrderStatus::DELIVERED`] (1), but the value is deliberately open:
/// status updates are accepted verbatim and unknown integers round-trip
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct OrderStatus(i64);

impl OrderStatus {
    /// The order has been placed and is out for delivery.
    pub const OUT_FOR_DELIVERY: Self = Self(0);

    /// The order has been delivered.
    pub const DELIVERED: Self = Self(1);

    /// Wrap a raw status value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the underlying integer value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Whether this is the delivered state.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        self.0 == Self::DELIVERED.0
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderStatus {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<OrderStatus> for i64 {
    fn from(status: OrderStatus) -> Self {
        status.0
    }
}
