//! Core price-level data structure.
//!
//! This implementation uses `BTreeMap` for sorted price levels, providing:
//!
//! - O(log n) level insertion, deletion, and lookup
//! - O(1) access to the best price (via `first_key_value` / `last_key_value`)
//! - Ordered iteration for depth-of-book reads
//!
//! Each level holds a `VecDeque` of resting orders in arrival order, so the
//! queue front is always the order with price-time priority.

use std::collections::{BTreeMap, VecDeque};

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::Error;
use crate::types::order::Side;
use crate::types::OrderId;

/// A single resting order on the book.
///
/// Created by an "open" message or a snapshot entry, shrunk in place by
/// partial matches, overwritten by "change" amendments, and destroyed by a
/// "done" message or a fully consuming match.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Exchange-assigned order identifier
    pub id: OrderId,
    /// Side the order rests on
    pub side: Side,
    /// Limit price (also the key of the containing level)
    pub price: Decimal,
    /// Remaining size
    pub size: Decimal,
}

impl OrderRecord {
    /// Create a new resting order
    pub fn new(id: impl Into<OrderId>, side: Side, price: Decimal, size: Decimal) -> Self {
        Self {
            id: id.into(),
            side,
            price,
            size,
        }
    }
}

/// One side of the book: a sorted mapping from price to the FIFO queue of
/// orders resting at that price.
///
/// # Design Decisions
///
/// 1. **`Decimal` prices**: exact decimal keys, never binary floats. Two
///    prices that differ only past `f64` precision must stay distinct
///    levels.
///
/// 2. **`BTreeMap`**: sorted price levels with O(log n) operations. The best
///    price is O(1) via `last_key_value()` (bids) / `first_key_value()`
///    (asks).
///
/// 3. **No empty levels**: every mutation that drains a queue removes the
///    level in the same call, so best-price reads never see stale levels.
///
/// # Thread Safety
///
/// This struct is `Send + Sync` but not internally synchronized. The
/// reconstructor wraps it in `parking_lot::RwLock`.
#[derive(Debug, Clone)]
pub struct HalfBook {
    /// Which side this store holds
    side: Side,
    /// price -> resting orders in arrival (priority) order
    levels: BTreeMap<Decimal, VecDeque<OrderRecord>>,
}

impl HalfBook {
    /// Create an empty store for the given side
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// The side this store holds
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Get the order queue at a price, if the level exists
    #[must_use]
    pub fn level(&self, price: &Decimal) -> Option<&VecDeque<OrderRecord>> {
        self.levels.get(price)
    }

    /// Replace the queue at a price. An empty queue removes the level
    /// instead of storing it.
    pub fn set_level(&mut self, price: Decimal, orders: VecDeque<OrderRecord>) {
        if orders.is_empty() {
            self.levels.remove(&price);
        } else {
            self.levels.insert(price, orders);
        }
    }

    /// Delete a level entirely
    pub fn remove_level(&mut self, price: &Decimal) {
        self.levels.remove(price);
    }

    /// Best price on this side: highest bid or lowest ask.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBook`] when no levels exist, so callers can
    /// tell "no liquidity" apart from any real price.
    pub fn best_price(&self) -> Result<Decimal, Error> {
        let best = match self.side {
            Side::Buy => self.levels.last_key_value(),
            Side::Sell => self.levels.first_key_value(),
        };
        best.map(|(price, _)| *price)
            .ok_or(Error::EmptyBook { side: self.side })
    }

    /// Append an order to the tail of its price's queue, creating the level
    /// if absent. New orders queue behind existing ones at the same price,
    /// which is exactly price-time priority.
    pub fn insert_order(&mut self, order: OrderRecord) {
        debug_assert_eq!(order.side, self.side);
        self.levels.entry(order.price).or_default().push_back(order);
    }

    /// Remove the order with the given id from the queue at `price`.
    ///
    /// A missing level or unknown id is a silent no-op: the feed routinely
    /// references orders this book never saw (opened before initialization,
    /// or already removed around a snapshot boundary).
    pub fn remove_order(&mut self, price: &Decimal, order_id: &str) {
        if let Some(queue) = self.levels.get_mut(price) {
            queue.retain(|order| order.id != order_id);
            if queue.is_empty() {
                self.levels.remove(price);
            }
        }
    }

    /// Consume `traded_size` from the maker order at the head of the queue
    /// at `price`.
    ///
    /// A full consume pops the head (and prunes the level if it drained);
    /// a partial fill decrements the head's size in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MakerMismatch`] when the level does not exist or the
    /// queue head is not `maker_order_id`. Either way the exchange matched a
    /// maker this book disagrees about, which means the book has diverged
    /// and cannot be trusted incrementally.
    pub fn apply_match(
        &mut self,
        price: &Decimal,
        maker_order_id: &str,
        traded_size: Decimal,
    ) -> Result<(), Error> {
        let Some(queue) = self.levels.get_mut(price) else {
            return Err(Error::MakerMismatch {
                price: *price,
                expected: maker_order_id.to_string(),
                found: None,
            });
        };

        let Some(head) = queue.front_mut() else {
            debug_assert!(false, "empty level at {price} was not pruned");
            return Err(Error::MakerMismatch {
                price: *price,
                expected: maker_order_id.to_string(),
                found: None,
            });
        };

        if head.id != maker_order_id {
            return Err(Error::MakerMismatch {
                price: *price,
                expected: maker_order_id.to_string(),
                found: Some(head.id.clone()),
            });
        }

        if traded_size >= head.size {
            queue.pop_front();
            if queue.is_empty() {
                self.levels.remove(price);
            }
        } else {
            head.size -= traded_size;
        }

        Ok(())
    }

    /// Overwrite the size of the order with the given id at `price`.
    ///
    /// An unknown level or id is a silent no-op (the order may predate book
    /// initialization). A negative size is malformed and ignored.
    pub fn apply_change(&mut self, price: &Decimal, order_id: &str, new_size: Decimal) {
        if new_size.is_sign_negative() {
            debug!(%price, order_id, %new_size, "ignoring change to negative size");
            return;
        }
        if let Some(queue) = self.levels.get_mut(price) {
            if let Some(order) = queue.iter_mut().find(|order| order.id == order_id) {
                order.size = new_size;
            }
        }
    }

    /// Iterate all resting orders in price-priority order (best level
    /// first, queue order within a level).
    pub fn orders_by_priority(&self) -> Box<dyn Iterator<Item = &OrderRecord> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev().flatten()),
            Side::Sell => Box::new(self.levels.values().flatten()),
        }
    }

    /// All level prices in priority order (best first)
    #[must_use]
    pub fn prices_by_priority(&self) -> Vec<Decimal> {
        match self.side {
            Side::Buy => self.levels.keys().rev().copied().collect(),
            Side::Sell => self.levels.keys().copied().collect(),
        }
    }

    /// Number of price levels
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check whether the store has no levels
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Remove every level
    pub fn clear(&mut self) {
        self.levels.clear();
    }
}
