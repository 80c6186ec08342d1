//! Order-related types.

use serde::{Deserialize, Serialize};

/// Side of the book an order rests on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bid side - resting buy orders
    Buy,
    /// Ask side - resting sell orders
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}
