//! Full-channel feed message types.
//!
//! This module contains the commands sent to the feed and the messages
//! received from it.
//!
//! The feed's wire format is a flat JSON object whose meaning depends on a
//! `type` field, with most other fields optional. Messages are decoded once
//! at this boundary into the [`FeedMessage`] variants; everything downstream
//! matches on the variant tag instead of probing for key presence. A frame
//! whose kind-specific required fields are missing degrades to
//! [`FeedMessage::Other`], which still carries the sequence number so the
//! sequence accounting stays intact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::Side;
use super::{OrderId, Sequence};

/// Command sent to the feed server
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedCommand {
    /// Subscribe to channels for the given products
    Subscribe {
        /// Products to subscribe to
        product_ids: Vec<String>,
        /// Channels to subscribe to (the book engine uses "full")
        channels: Vec<String>,
    },
    /// Unsubscribe from channels
    Unsubscribe {
        /// Products to unsubscribe from
        product_ids: Vec<String>,
        /// Channels to unsubscribe from
        channels: Vec<String>,
    },
}

/// A message received from the full channel
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawFeedMessage")]
pub enum FeedMessage {
    /// A limit order was accepted onto the book
    Open(OpenMsg),
    /// An order left the book (canceled or fully filled)
    Done(DoneMsg),
    /// A trade occurred against a resting maker order
    Match(MatchMsg),
    /// A resting order was amended
    Change(ChangeMsg),
    /// Any other frame: received/activate/heartbeat/subscriptions, unknown
    /// kinds, or a known kind missing its required fields. Not a book
    /// mutation, but it still occupies a sequence slot.
    Other(OtherMsg),
}

/// "open": a new order is resting on the book
#[derive(Debug, Clone, PartialEq)]
pub struct OpenMsg {
    /// Sequence number of this message
    pub sequence: Option<Sequence>,
    /// Identifier of the newly resting order
    pub order_id: OrderId,
    /// Side the order rests on
    pub side: Side,
    /// Limit price
    pub price: Decimal,
    /// Resting size (the wire's `size`, or `remaining_size` when absent)
    pub size: Decimal,
}

/// "done": an order is no longer on the book
#[derive(Debug, Clone, PartialEq)]
pub struct DoneMsg {
    /// Sequence number of this message
    pub sequence: Option<Sequence>,
    /// Identifier of the removed order
    pub order_id: OrderId,
    /// Side the order rested on
    pub side: Side,
    /// Price level the order rested at. Absent for orders that never rested
    /// (e.g. immediately filled) - presence is the book-relevance
    /// discriminator.
    pub price: Option<Decimal>,
}

/// "match": a trade against a resting maker order
#[derive(Debug, Clone, PartialEq)]
pub struct MatchMsg {
    /// Sequence number of this message
    pub sequence: Option<Sequence>,
    /// Trade identifier
    pub trade_id: Option<u64>,
    /// The resting order that was matched
    pub maker_order_id: OrderId,
    /// The aggressing order
    pub taker_order_id: Option<OrderId>,
    /// Side of the maker order
    pub side: Side,
    /// Price the trade executed at
    pub price: Decimal,
    /// Traded size
    pub size: Decimal,
    /// Exchange timestamp (ISO 8601)
    pub time: Option<String>,
}

/// "change": a resting order's size was amended
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeMsg {
    /// Sequence number of this message
    pub sequence: Option<Sequence>,
    /// Identifier of the amended order
    pub order_id: OrderId,
    /// Side the order rests on
    pub side: Side,
    /// Price level of the amended order. A change without a price cannot be
    /// a resting-order amendment and is not book-relevant.
    pub price: Option<Decimal>,
    /// New resting size
    pub new_size: Option<Decimal>,
}

/// Any frame that is not a book mutation
#[derive(Debug, Clone, PartialEq)]
pub struct OtherMsg {
    /// The wire `type` field
    pub kind: String,
    /// Sequence number of this message, if present
    pub sequence: Option<Sequence>,
}

impl FeedMessage {
    /// Sequence number of the message, if the frame carried one
    pub fn sequence(&self) -> Option<Sequence> {
        match self {
            FeedMessage::Open(m) => m.sequence,
            FeedMessage::Done(m) => m.sequence,
            FeedMessage::Match(m) => m.sequence,
            FeedMessage::Change(m) => m.sequence,
            FeedMessage::Other(m) => m.sequence,
        }
    }
}

/// Wire-shape record the feed boundary decodes before classification.
///
/// Every field except `type` is optional on the wire.
#[derive(Debug, Deserialize)]
struct RawFeedMessage {
    #[serde(rename = "type")]
    kind: String,
    sequence: Option<Sequence>,
    #[serde(alias = "id")]
    order_id: Option<OrderId>,
    maker_order_id: Option<OrderId>,
    taker_order_id: Option<OrderId>,
    side: Option<Side>,
    price: Option<Decimal>,
    size: Option<Decimal>,
    remaining_size: Option<Decimal>,
    new_size: Option<Decimal>,
    trade_id: Option<u64>,
    time: Option<String>,
}

impl From<RawFeedMessage> for FeedMessage {
    fn from(raw: RawFeedMessage) -> Self {
        let RawFeedMessage {
            kind,
            sequence,
            order_id,
            maker_order_id,
            taker_order_id,
            side,
            price,
            size,
            remaining_size,
            new_size,
            trade_id,
            time,
        } = raw;

        let classified = match kind.as_str() {
            "open" => match (order_id, side, price, size.or(remaining_size)) {
                (Some(order_id), Some(side), Some(price), Some(size)) => {
                    Some(FeedMessage::Open(OpenMsg {
                        sequence,
                        order_id,
                        side,
                        price,
                        size,
                    }))
                }
                _ => None,
            },
            "done" => match (order_id, side) {
                (Some(order_id), Some(side)) => Some(FeedMessage::Done(DoneMsg {
                    sequence,
                    order_id,
                    side,
                    price,
                })),
                _ => None,
            },
            "match" => match (maker_order_id, side, price, size) {
                (Some(maker_order_id), Some(side), Some(price), Some(size)) => {
                    Some(FeedMessage::Match(MatchMsg {
                        sequence,
                        trade_id,
                        maker_order_id,
                        taker_order_id,
                        side,
                        price,
                        size,
                        time,
                    }))
                }
                _ => None,
            },
            "change" => match (order_id, side) {
                (Some(order_id), Some(side)) => Some(FeedMessage::Change(ChangeMsg {
                    sequence,
                    order_id,
                    side,
                    price,
                    new_size,
                })),
                _ => None,
            },
            _ => None,
        };

        classified.unwrap_or(FeedMessage::Other(OtherMsg { kind, sequence }))
    }
}
