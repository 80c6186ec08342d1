//! Error types for the l3-orderbook crate.
//!
//! This module defines the error types that can occur while reconstructing
//! a book from the feed, including transport errors, snapshot (REST) errors,
//! and book-consistency errors.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::order::Side;
use crate::types::{OrderId, Sequence};

/// The main error type for this crate
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration (missing fields, bad format)
    #[error("Configuration error: {0}")]
    Config(String),

    /// API returned an error response
    #[error("API error ({}): {}", .0.status, .0.message)]
    Api(ApiError),

    /// Rate limit exceeded
    #[error("Rate limited, retry after {retry_after_ms:?} ms")]
    RateLimited {
        /// Retry after this many milliseconds
        retry_after_ms: Option<u64>,
    },

    /// WebSocket connection closed unexpectedly
    #[error("WebSocket connection closed")]
    ConnectionClosed,

    /// Feed sequence gap detected (missed messages)
    #[error("Sequence gap: expected {expected}, got {got}")]
    SequenceGap {
        /// Expected sequence number
        expected: Sequence,
        /// Actual sequence number received
        got: Sequence,
    },

    /// Best-price query against a side with no resting orders
    #[error("No resting orders on the {side:?} side")]
    EmptyBook {
        /// The side that had no levels
        side: Side,
    },

    /// A match message named a maker order that is not at the head of its
    /// price level's queue. The local book has diverged from the exchange.
    #[error("Book desync at {price}: match names maker {expected}, level head is {found:?}")]
    MakerMismatch {
        /// Price level the match referenced
        price: Decimal,
        /// Maker order id claimed by the match message
        expected: OrderId,
        /// Order id actually at the head of the queue, if the level existed
        found: Option<OrderId>,
    },

    /// Operation timed out
    #[error("Operation timed out")]
    Timeout,
}

/// Error returned by the exchange REST API
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Error message
    pub message: String,
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid URL: {err}"))
    }
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}
