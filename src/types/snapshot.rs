//! Level-3 full book snapshot payload.
//!
//! The snapshot endpoint returns every resting order individually (not
//! aggregated by level), which is what the reconstruction engine needs in
//! order to apply later per-order match/change/done messages.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{OrderId, Sequence};

/// One resting order in a snapshot: `[price, size, order_id]` on the wire
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookEntry(pub Decimal, pub Decimal, pub OrderId);

impl BookEntry {
    /// Create an entry (mostly useful in tests)
    pub fn new(price: Decimal, size: Decimal, order_id: impl Into<OrderId>) -> Self {
        Self(price, size, order_id.into())
    }

    /// Price of the resting order
    pub fn price(&self) -> Decimal {
        self.0
    }

    /// Remaining size of the resting order
    pub fn size(&self) -> Decimal {
        self.1
    }

    /// Identifier of the resting order
    pub fn order_id(&self) -> &str {
        &self.2
    }
}

/// A full (level 3) order book snapshot with its sequence number
#[derive(Debug, Clone, Deserialize)]
pub struct BookSnapshot {
    /// Feed sequence number the snapshot corresponds to
    pub sequence: Sequence,
    /// Every resting bid, best first
    pub bids: Vec<BookEntry>,
    /// Every resting ask, best first
    pub asks: Vec<BookEntry>,
}
