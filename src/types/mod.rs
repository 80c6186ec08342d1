//! Types for the feed wire format and the snapshot REST payload.
//!
//! This module contains Rust types that correspond to the exchange's
//! JSON messages and responses.
//!
//! - [`order`] - Order-related types (Side, identifiers)
//! - [`messages`] - Full-channel feed message types
//! - [`snapshot`] - Level-3 full book snapshot payload

pub mod messages;
pub mod order;
pub mod snapshot;

pub use messages::FeedMessage;
pub use order::Side;
pub use snapshot::{BookEntry, BookSnapshot};

/// Opaque order identifier as sent by the exchange (a UUID string).
///
/// Kept as an owned string rather than a parsed UUID: the engine never
/// inspects its structure, only compares it for equality.
pub type OrderId = String;

/// Feed sequence number
///
/// Every message on the full channel occupies exactly one sequence slot.
/// Gaps in this number are the only signal that messages were missed.
pub type Sequence = u64;
