//! # l3-orderbook
//!
//! Local limit order book reconstruction from a Coinbase-style full-channel
//! (level 3) market data feed.
//!
//! ## Features
//!
//! - **Per-order book** - every resting order tracked individually, with
//!   price-time (FIFO) priority inside each price level
//! - **Sequence gating** - stale messages dropped, gaps detected and healed
//!   by an automatic full resync from a REST snapshot
//! - **Concurrent reads** - best bid/ask and full-book snapshots from any
//!   thread while the feed task applies mutations
//! - **Async/Await** - built on Tokio
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use l3_orderbook::client::rest::RestClient;
//! use l3_orderbook::client::websocket::{drive, FeedClient};
//! use l3_orderbook::orderbook::BookReconstructor;
//! use l3_orderbook::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), l3_orderbook::Error> {
//!     let config = Config::new();
//!
//!     // The book, backed by the REST snapshot endpoint
//!     let book = BookReconstructor::new("BTC-USD", RestClient::new(&config)?);
//!
//!     // The feed
//!     let mut feed = FeedClient::connect(&config).await?;
//!     feed.subscribe_full(&["BTC-USD"]).await?;
//!
//!     // Pump messages until the shutdown flag flips
//!     let (_stop, mut shutdown) = tokio::sync::watch::channel(false);
//!     drive(&mut feed, &book, &mut shutdown).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Price Representation
//!
//! All prices and sizes are `rust_decimal::Decimal`. Exact decimals are
//! load-bearing here: price levels are keyed by price, and two prices that
//! differ past `f64` precision must remain two distinct levels.
//!
//! ## Architecture
//!
//! This crate is organized into several modules:
//!
//! - [`orderbook`] - the book data structure and the reconstruction engine
//! - [`client`] - REST (snapshots) and WebSocket (feed) clients
//! - [`types`] - feed message and snapshot payload types
//! - [`config`] - environment and client settings
//! - [`error`] - error types for the crate
//!
//! ## Consistency Model
//!
//! Message application is strictly serial and gated on sequence numbers:
//! a message is applied only when it is exactly the next sequence number.
//! Anything at or before the current number is dropped; anything beyond the
//! next one triggers a rebuild from a fresh snapshot, never a partial
//! merge. A match that contradicts the local queue head (book desync) is
//! surfaced loudly and answered the same way.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod orderbook;
pub mod types;

// Re-export main types at crate root for convenience
pub use config::Config;
pub use error::Error;
pub use orderbook::{BookReconstructor, BookView};

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
