//! Book reconstruction from the sequenced feed.
//!
//! This module provides [`BookReconstructor`], which owns the two
//! [`HalfBook`] stores and keeps them synchronized with the feed:
//!
//! - Bootstraps (and re-bootstraps) from a [`SnapshotProvider`] full-book
//!   snapshot
//! - Classifies every incoming message against the last applied sequence
//!   number and drops stale messages
//! - Dispatches in-order messages to the open/done/match/change handlers
//! - Answers a detected gap, or a desynchronized match, with a full rebuild
//!   from a fresh snapshot
//!
//! # Thread Safety
//!
//! The reconstructor is safe to share via `Arc`. One task feeds
//! [`BookReconstructor::on_message`] serially; any number of threads may
//! call the read-side queries concurrently. All shared state lives behind a
//! single `parking_lot::RwLock`, taken briefly per operation.

use std::future::Future;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use crate::error::Error;
use crate::types::messages::{FeedMessage, MatchMsg};
use crate::types::order::Side;
use crate::types::{BookSnapshot, OrderId, Sequence};

use super::book::{HalfBook, OrderRecord};

/// Outcome of checking an incoming sequence number against the book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqStatus {
    /// The book has never been snapshotted; bootstrap before applying
    /// anything
    Uninitialized,
    /// At or before the last applied sequence: already reflected, drop it
    Stale,
    /// Exactly the next sequence number: apply it
    Next,
    /// Beyond the next sequence number: messages were missed, resync
    Gap,
}

/// Classify an incoming message's sequence number.
///
/// Pure function of the two numbers. A message with no sequence number is
/// Stale once the book is initialized: it can never be applied, and it is
/// no evidence of a gap either.
pub fn classify_sequence(current: Option<Sequence>, incoming: Option<Sequence>) -> SeqStatus {
    let Some(current) = current else {
        return SeqStatus::Uninitialized;
    };
    match incoming {
        None => SeqStatus::Stale,
        Some(seq) if seq <= current => SeqStatus::Stale,
        Some(seq) if seq == current + 1 => SeqStatus::Next,
        Some(_) => SeqStatus::Gap,
    }
}

/// Source of full (level 3) book snapshots.
///
/// Implemented by [`crate::client::rest::RestClient`] for the live
/// exchange; tests substitute an in-memory provider.
pub trait SnapshotProvider {
    /// Fetch the current full book for a product, with its sequence number.
    ///
    /// The snapshot must be per-order (not aggregated by level): the
    /// reconstructor needs order granularity to apply later match, change
    /// and done messages.
    fn full_book(
        &self,
        product_id: &str,
    ) -> impl Future<Output = Result<BookSnapshot, Error>> + Send;
}

/// One resting order in a read-side snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct BookOrder {
    /// Price level the order rests at
    pub price: Decimal,
    /// Remaining size
    pub size: Decimal,
    /// Exchange-assigned order identifier
    pub order_id: OrderId,
}

/// Flattened read-side view of the whole book
#[derive(Debug, Clone)]
pub struct BookView {
    /// Sequence number the view corresponds to (None before bootstrap)
    pub sequence: Option<Sequence>,
    /// Every resting bid in price-priority order (best level first, queue
    /// order within a level)
    pub bids: Vec<BookOrder>,
    /// Every resting ask in price-priority order
    pub asks: Vec<BookOrder>,
}

/// Book state guarded by the reconstructor's lock
#[derive(Debug)]
struct BookState {
    sequence: Option<Sequence>,
    bids: HalfBook,
    asks: HalfBook,
    last_trade: Option<MatchMsg>,
}

impl BookState {
    fn store(&self, side: Side) -> &HalfBook {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn store_mut(&mut self, side: Side) -> &mut HalfBook {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}

/// Local order book for one product, reconstructed from the full channel.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use l3_orderbook::client::rest::RestClient;
/// use l3_orderbook::orderbook::BookReconstructor;
/// use l3_orderbook::Config;
///
/// # async fn example() -> l3_orderbook::Result<()> {
/// let rest = RestClient::new(&Config::new())?;
/// let book = Arc::new(BookReconstructor::new("BTC-USD", rest));
///
/// // In the feed task: book.on_message(&msg).await?;
///
/// // From any thread:
/// if let Ok(bid) = book.best_bid_price() {
///     println!("best bid: {bid}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BookReconstructor<P> {
    /// Product this book tracks
    product_id: String,
    /// Where full-book snapshots come from
    snapshots: P,
    /// Sequence number, both sides of the book, and the last trade
    state: RwLock<BookState>,
}

impl<P: SnapshotProvider> BookReconstructor<P> {
    /// Create an empty, uninitialized book for the given product.
    ///
    /// The first call to [`on_message`](Self::on_message) (or an explicit
    /// [`reset_book`](Self::reset_book)) loads the bootstrap snapshot.
    pub fn new(product_id: impl Into<String>, snapshots: P) -> Self {
        Self {
            product_id: product_id.into(),
            snapshots,
            state: RwLock::new(BookState {
                sequence: None,
                bids: HalfBook::new(Side::Buy),
                asks: HalfBook::new(Side::Sell),
                last_trade: None,
            }),
        }
    }

    /// The product this book tracks
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Get a reference to the snapshot provider
    pub fn snapshot_provider(&self) -> &P {
        &self.snapshots
    }

    /// Last applied sequence number (None before the first snapshot)
    pub fn sequence(&self) -> Option<Sequence> {
        self.state.read().sequence
    }

    /// Whether the book has been initialized from a snapshot
    pub fn is_synced(&self) -> bool {
        self.state.read().sequence.is_some()
    }

    /// Discard the in-memory book and rebuild it from a fresh snapshot.
    ///
    /// The replacement stores are fully built before the swap, so
    /// concurrent readers see either the old book or the new one, never a
    /// half-populated one.
    ///
    /// # Errors
    ///
    /// Propagates snapshot-provider failures; the book keeps its previous
    /// state in that case.
    pub async fn reset_book(&self) -> Result<(), Error> {
        let snapshot = self.snapshots.full_book(&self.product_id).await?;

        let mut bids = HalfBook::new(Side::Buy);
        for entry in &snapshot.bids {
            bids.insert_order(OrderRecord::new(
                entry.order_id(),
                Side::Buy,
                entry.price(),
                entry.size(),
            ));
        }
        let mut asks = HalfBook::new(Side::Sell);
        for entry in &snapshot.asks {
            asks.insert_order(OrderRecord::new(
                entry.order_id(),
                Side::Sell,
                entry.price(),
                entry.size(),
            ));
        }

        debug!(
            product = %self.product_id,
            sequence = snapshot.sequence,
            bids = bids.len(),
            asks = asks.len(),
            "book rebuilt from snapshot"
        );

        let mut state = self.state.write();
        state.bids = bids;
        state.asks = asks;
        state.sequence = Some(snapshot.sequence);
        state.last_trade = None;
        Ok(())
    }

    /// Process one feed message.
    ///
    /// Stale messages are dropped. A sequence gap, and the bootstrap of an
    /// uninitialized book, are answered with [`reset_book`](Self::reset_book)
    /// and the triggering message is discarded: the fresh snapshot already
    /// reflects it. Malformed or book-irrelevant messages are no-ops that
    /// still advance the sequence number.
    ///
    /// # Errors
    ///
    /// Only snapshot-provider failures propagate. Message-level problems
    /// are absorbed here so the feed loop never stops on bad data.
    pub async fn on_message(&self, message: &FeedMessage) -> Result<(), Error> {
        let current = self.state.read().sequence;

        match classify_sequence(current, message.sequence()) {
            SeqStatus::Uninitialized => self.reset_book().await,
            SeqStatus::Stale => Ok(()),
            SeqStatus::Gap => self.on_sequence_gap(current, message.sequence()).await,
            SeqStatus::Next => {
                let Some(seq) = message.sequence() else {
                    return Ok(());
                };
                match self.apply(message, seq) {
                    Ok(()) => Ok(()),
                    Err(err @ Error::MakerMismatch { .. }) => {
                        // The exchange matched a maker this book disagrees
                        // about: the local state can no longer be trusted.
                        error!(
                            product = %self.product_id,
                            %err,
                            "book desync detected, rebuilding from snapshot"
                        );
                        self.reset_book().await
                    }
                    Err(other) => Err(other),
                }
            }
        }
    }

    /// Handle a detected sequence gap by resynchronizing
    async fn on_sequence_gap(
        &self,
        current: Option<Sequence>,
        incoming: Option<Sequence>,
    ) -> Result<(), Error> {
        if let (Some(current), Some(got)) = (current, incoming) {
            warn!(
                product = %self.product_id,
                expected = current + 1,
                got,
                "sequence gap, rebuilding from snapshot"
            );
        }
        self.reset_book().await
    }

    /// Apply one in-order message under the write lock.
    ///
    /// Each arm is atomic with respect to a single order mutation; the
    /// sequence number only advances after the mutation succeeded.
    fn apply(&self, message: &FeedMessage, seq: Sequence) -> Result<(), Error> {
        let mut state = self.state.write();

        match message {
            FeedMessage::Open(open) => {
                state.store_mut(open.side).insert_order(OrderRecord::new(
                    open.order_id.clone(),
                    open.side,
                    open.price,
                    open.size,
                ));
            }
            FeedMessage::Done(done) => {
                // A done without a price refers to an order that never
                // rested (e.g. immediately filled) and is not book-relevant.
                if let Some(price) = done.price {
                    state
                        .store_mut(done.side)
                        .remove_order(&price, &done.order_id);
                }
            }
            FeedMessage::Match(m) => {
                state
                    .store_mut(m.side)
                    .apply_match(&m.price, &m.maker_order_id, m.size)?;
                state.last_trade = Some(m.clone());
            }
            FeedMessage::Change(change) => {
                // A change is only a resting-order amendment when it names
                // both the level and the new size.
                if let (Some(price), Some(new_size)) = (change.price, change.new_size) {
                    state
                        .store_mut(change.side)
                        .apply_change(&price, &change.order_id, new_size);
                }
            }
            FeedMessage::Other(_) => {}
        }

        state.sequence = Some(seq);
        Ok(())
    }

    /// Best (highest) bid price
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBook`] when no bids are resting.
    pub fn best_bid_price(&self) -> Result<Decimal, Error> {
        self.state.read().bids.best_price()
    }

    /// Best (lowest) ask price
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBook`] when no asks are resting.
    pub fn best_ask_price(&self) -> Result<Decimal, Error> {
        self.state.read().asks.best_price()
    }

    /// Mid price (average of best bid and best ask), if both sides have
    /// resting orders
    pub fn mid_price(&self) -> Option<Decimal> {
        let state = self.state.read();
        match (state.bids.best_price(), state.asks.best_price()) {
            (Ok(bid), Ok(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }

    /// Spread (best ask minus best bid), if both sides have resting orders
    pub fn spread(&self) -> Option<Decimal> {
        let state = self.state.read();
        match (state.bids.best_price(), state.asks.best_price()) {
            (Ok(bid), Ok(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Number of price levels on each side (bids, asks)
    pub fn num_levels(&self) -> (usize, usize) {
        let state = self.state.read();
        (state.bids.len(), state.asks.len())
    }

    /// The most recently applied match message, or None if no trade has
    /// occurred since the last reset
    pub fn last_trade(&self) -> Option<MatchMsg> {
        self.state.read().last_trade.clone()
    }

    /// Flattened view of the whole book in price-priority order.
    ///
    /// Levels are enumerated under one short lock, then each level is read
    /// under its own short lock. A level that the feed removes in between
    /// is skipped rather than reported as an error, so a slow reader never
    /// blocks the feed for the duration of a full scan.
    pub fn snapshot(&self) -> BookView {
        let (sequence, bid_prices, ask_prices) = {
            let state = self.state.read();
            (
                state.sequence,
                state.bids.prices_by_priority(),
                state.asks.prices_by_priority(),
            )
        };

        BookView {
            sequence,
            bids: self.collect_side(Side::Buy, &bid_prices),
            asks: self.collect_side(Side::Sell, &ask_prices),
        }
    }

    fn collect_side(&self, side: Side, prices: &[Decimal]) -> Vec<BookOrder> {
        let mut orders = Vec::new();
        for price in prices {
            let state = self.state.read();
            if let Some(queue) = state.store(side).level(price) {
                orders.extend(queue.iter().map(|order| BookOrder {
                    price: order.price,
                    size: order.size,
                    order_id: order.id.clone(),
                }));
            }
        }
        orders
    }
}
