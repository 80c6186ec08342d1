//! REST and WebSocket clients for the exchange market-data API.
//!
//! - [`rest`] - snapshot fetches over HTTP (the [`SnapshotProvider`]
//!   implementation)
//! - [`websocket`] - the full-channel feed and the message pump
//!
//! [`SnapshotProvider`]: crate::orderbook::SnapshotProvider

pub mod rest;
pub mod websocket;

pub use rest::RestClient;
pub use websocket::FeedClient;
