//! Local order book reconstruction.
//!
//! This module provides the book data structure and the engine that keeps
//! it synchronized with a sequenced full-channel feed:
//!
//! - [`HalfBook`] - sorted price levels with per-price FIFO order queues,
//!   one instance per side
//! - [`BookReconstructor`] - owns both sides, classifies sequence numbers,
//!   dispatches mutations, and resynchronizes from snapshots
//!
//! # Example
//!
//! ```rust
//! use l3_orderbook::orderbook::{HalfBook, OrderRecord};
//! use l3_orderbook::types::Side;
//! use rust_decimal::Decimal;
//!
//! let mut bids = HalfBook::new(Side::Buy);
//! bids.insert_order(OrderRecord::new(
//!     "d50ec984-77a8-460a-b958-66f114b0de9b",
//!     Side::Buy,
//!     Decimal::new(10000, 2),
//!     Decimal::ONE,
//! ));
//!
//! assert_eq!(bids.best_price().unwrap(), Decimal::new(10000, 2));
//! ```

pub mod book;
pub mod reconstructor;

pub use book::{HalfBook, OrderRecord};
pub use reconstructor::{
    classify_sequence, BookOrder, BookReconstructor, BookView, SeqStatus, SnapshotProvider,
};
