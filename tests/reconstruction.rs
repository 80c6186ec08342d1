//! End-to-end reconstruction tests against an in-memory snapshot provider.
//!
//! These tests drive [`BookReconstructor`] with hand-built feed messages and
//! verify the sequence-gating, dispatch, and read-side contracts.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use l3_orderbook::orderbook::{BookReconstructor, SnapshotProvider};
use l3_orderbook::types::messages::{ChangeMsg, DoneMsg, FeedMessage, MatchMsg, OpenMsg, OtherMsg};
use l3_orderbook::types::snapshot::{BookEntry, BookSnapshot};
use l3_orderbook::types::{Sequence, Side};
use l3_orderbook::Error;

/// Snapshot provider that serves a queue of canned snapshots and counts
/// fetches. The last snapshot is sticky so repeated resyncs keep working.
struct MockSnapshots {
    calls: AtomicUsize,
    queue: Mutex<VecDeque<BookSnapshot>>,
}

impl MockSnapshots {
    fn new(snapshots: Vec<BookSnapshot>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            queue: Mutex::new(snapshots.into()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SnapshotProvider for MockSnapshots {
    async fn full_book(&self, _product_id: &str) -> Result<BookSnapshot, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.queue.lock();
        if queue.len() > 1 {
            Ok(queue.pop_front().expect("queue is non-empty"))
        } else {
            queue
                .front()
                .cloned()
                .ok_or(Error::Config("no snapshot queued".to_string()))
        }
    }
}

/// The §8-style starting book: one bid, one ask.
fn base_snapshot() -> BookSnapshot {
    BookSnapshot {
        sequence: 100,
        bids: vec![BookEntry::new(dec!(100.00), dec!(5), "A")],
        asks: vec![BookEntry::new(dec!(101.00), dec!(3), "B")],
    }
}

fn open(seq: Sequence, id: &str, side: Side, price: Decimal, size: Decimal) -> FeedMessage {
    FeedMessage::Open(OpenMsg {
        sequence: Some(seq),
        order_id: id.to_string(),
        side,
        price,
        size,
    })
}

fn done(seq: Sequence, id: &str, side: Side, price: Option<Decimal>) -> FeedMessage {
    FeedMessage::Done(DoneMsg {
        sequence: Some(seq),
        order_id: id.to_string(),
        side,
        price,
    })
}

fn match_msg(seq: Sequence, maker: &str, side: Side, price: Decimal, size: Decimal) -> FeedMessage {
    FeedMessage::Match(MatchMsg {
        sequence: Some(seq),
        trade_id: None,
        maker_order_id: maker.to_string(),
        taker_order_id: None,
        side,
        price,
        size,
        time: None,
    })
}

async fn synced_book(provider: MockSnapshots) -> BookReconstructor<MockSnapshots> {
    let book = BookReconstructor::new("TEST-USD", provider);
    book.reset_book().await.expect("bootstrap snapshot");
    book
}

#[tokio::test]
async fn stale_messages_are_idempotent_noops() {
    let book = synced_book(MockSnapshots::new(vec![base_snapshot()])).await;
    let before = book.snapshot();

    // at, and well before, the current sequence - delivered twice each
    for _ in 0..2 {
        book.on_message(&open(100, "X", Side::Buy, dec!(99.00), dec!(1)))
            .await
            .unwrap();
        book.on_message(&done(42, "A", Side::Buy, Some(dec!(100.00))))
            .await
            .unwrap();
    }

    let after = book.snapshot();
    assert_eq!(before.sequence, after.sequence);
    assert_eq!(before.bids, after.bids);
    assert_eq!(before.asks, after.asks);
}

#[tokio::test]
async fn gap_triggers_exactly_one_resync_with_fresh_state() {
    let resynced = BookSnapshot {
        sequence: 500,
        bids: vec![BookEntry::new(dec!(90.00), dec!(1), "N1")],
        asks: vec![
            BookEntry::new(dec!(91.00), dec!(2), "N2"),
            BookEntry::new(dec!(92.00), dec!(4), "N3"),
        ],
    };
    let book = synced_book(MockSnapshots::new(vec![base_snapshot(), resynced])).await;
    assert_eq!(book.snapshot_provider().calls(), 1);

    // expected 101, got 103: a gap of one missed message
    book.on_message(&open(103, "C", Side::Buy, dec!(100.00), dec!(2)))
        .await
        .unwrap();

    assert_eq!(book.snapshot_provider().calls(), 2);
    assert_eq!(book.sequence(), Some(500));

    // the state is the fresh snapshot, not a merge with the old book
    let view = book.snapshot();
    assert_eq!(view.bids.len(), 1);
    assert_eq!(view.bids[0].order_id, "N1");
    assert_eq!(view.asks.len(), 2);
    assert!(view.bids.iter().all(|o| o.order_id != "A"));
    assert!(view.bids.iter().all(|o| o.order_id != "C"));
}

#[tokio::test]
async fn fifo_priority_is_preserved_and_matches_consume_the_head() {
    let book = synced_book(MockSnapshots::new(vec![base_snapshot()])).await;

    // three more orders queue behind "A" at 100.00 in arrival order
    book.on_message(&open(101, "C", Side::Buy, dec!(100.00), dec!(2)))
        .await
        .unwrap();
    book.on_message(&open(102, "D", Side::Buy, dec!(100.00), dec!(1)))
        .await
        .unwrap();
    book.on_message(&open(103, "E", Side::Buy, dec!(100.00), dec!(4)))
        .await
        .unwrap();

    let ids: Vec<_> = book.snapshot().bids.into_iter().map(|o| o.order_id).collect();
    assert_eq!(ids, ["A", "C", "D", "E"]);

    // the oldest order is always consumed first
    book.on_message(&match_msg(104, "A", Side::Buy, dec!(100.00), dec!(5)))
        .await
        .unwrap();
    book.on_message(&match_msg(105, "C", Side::Buy, dec!(100.00), dec!(2)))
        .await
        .unwrap();

    let ids: Vec<_> = book.snapshot().bids.into_iter().map(|o| o.order_id).collect();
    assert_eq!(ids, ["D", "E"]);
}

#[tokio::test]
async fn match_size_arithmetic_and_level_pruning() {
    let snapshot = BookSnapshot {
        sequence: 100,
        bids: vec![],
        asks: vec![BookEntry::new(dec!(200.00), dec!(10), "M")],
    };
    let book = synced_book(MockSnapshots::new(vec![snapshot])).await;

    // 10 - 4 leaves 6 at the head
    book.on_message(&match_msg(101, "M", Side::Sell, dec!(200.00), dec!(4)))
        .await
        .unwrap();
    let view = book.snapshot();
    assert_eq!(view.asks.len(), 1);
    assert_eq!(view.asks[0].size, dec!(6));

    // a further 6 removes the order and prunes the level
    book.on_message(&match_msg(102, "M", Side::Sell, dec!(200.00), dec!(6)))
        .await
        .unwrap();
    assert!(book.snapshot().asks.is_empty());
    assert!(matches!(
        book.best_ask_price(),
        Err(Error::EmptyBook { side: Side::Sell })
    ));
    assert_eq!(book.num_levels(), (0, 0));
}

#[tokio::test]
async fn round_trip_reconstruction_preserves_the_order_multiset() {
    let snapshot = BookSnapshot {
        sequence: 7,
        bids: vec![
            BookEntry::new(dec!(99.50), dec!(1.5), "b1"),
            BookEntry::new(dec!(99.50), dec!(0.5), "b2"),
            BookEntry::new(dec!(98.00), dec!(2), "b3"),
        ],
        asks: vec![
            BookEntry::new(dec!(100.50), dec!(3), "a1"),
            BookEntry::new(dec!(101.00), dec!(0.25), "a2"),
        ],
    };
    let book = synced_book(MockSnapshots::new(vec![snapshot.clone()])).await;

    let view = book.snapshot();
    assert_eq!(view.sequence, Some(7));
    assert_eq!(view.bids.len() + view.asks.len(), 5);

    let mut expected: Vec<(Decimal, Decimal, String)> = snapshot
        .bids
        .iter()
        .chain(snapshot.asks.iter())
        .map(|e| (e.price(), e.size(), e.order_id().to_string()))
        .collect();
    let mut actual: Vec<(Decimal, Decimal, String)> = view
        .bids
        .iter()
        .chain(view.asks.iter())
        .map(|o| (o.price, o.size, o.order_id.clone()))
        .collect();
    expected.sort();
    actual.sort();
    assert_eq!(expected, actual);

    // and priority order within the view: bids descending, asks ascending
    assert_eq!(view.bids[0].price, dec!(99.50));
    assert_eq!(view.bids[2].price, dec!(98.00));
    assert_eq!(view.asks[0].price, dec!(100.50));
}

#[tokio::test]
async fn done_without_price_is_ignored_but_advances_sequence() {
    let book = synced_book(MockSnapshots::new(vec![base_snapshot()])).await;

    // an order that never rested: no price field
    book.on_message(&done(101, "A", Side::Buy, None)).await.unwrap();

    // "A" is still on the book, but 101 was consumed
    assert_eq!(book.snapshot().bids[0].order_id, "A");
    assert_eq!(book.sequence(), Some(101));

    // so 102 applies normally
    book.on_message(&done(102, "A", Side::Buy, Some(dec!(100.00))))
        .await
        .unwrap();
    assert!(book.snapshot().bids.is_empty());
}

#[tokio::test]
async fn change_requires_price_and_new_size() {
    let book = synced_book(MockSnapshots::new(vec![base_snapshot()])).await;

    let partial = FeedMessage::Change(ChangeMsg {
        sequence: Some(101),
        order_id: "A".to_string(),
        side: Side::Buy,
        price: None,
        new_size: Some(dec!(1)),
    });
    book.on_message(&partial).await.unwrap();
    assert_eq!(book.snapshot().bids[0].size, dec!(5));
    assert_eq!(book.sequence(), Some(101));

    let full = FeedMessage::Change(ChangeMsg {
        sequence: Some(102),
        order_id: "A".to_string(),
        side: Side::Buy,
        price: Some(dec!(100.00)),
        new_size: Some(dec!(7)),
    });
    book.on_message(&full).await.unwrap();
    assert_eq!(book.snapshot().bids[0].size, dec!(7));
}

#[tokio::test]
async fn unknown_kinds_advance_the_sequence() {
    let book = synced_book(MockSnapshots::new(vec![base_snapshot()])).await;

    book.on_message(&FeedMessage::Other(OtherMsg {
        kind: "received".to_string(),
        sequence: Some(101),
    }))
    .await
    .unwrap();
    assert_eq!(book.sequence(), Some(101));

    // no resync happened: the next in-order message still applies
    book.on_message(&open(102, "C", Side::Sell, dec!(102.00), dec!(1)))
        .await
        .unwrap();
    assert_eq!(book.snapshot().asks.len(), 2);
    assert_eq!(book.snapshot_provider().calls(), 1);
}

#[tokio::test]
async fn end_to_end_scenario() {
    let resynced = BookSnapshot {
        sequence: 200,
        bids: vec![BookEntry::new(dec!(99.00), dec!(1), "R1")],
        asks: vec![BookEntry::new(dec!(100.00), dec!(1), "R2")],
    };
    let provider = MockSnapshots::new(vec![base_snapshot(), resynced]);
    let book = BookReconstructor::new("TEST-USD", provider);

    // first message bootstraps from the snapshot and is itself discarded
    book.on_message(&open(1, "IGNORED", Side::Buy, dec!(1.00), dec!(1)))
        .await
        .unwrap();
    assert_eq!(book.sequence(), Some(100));

    // open: level 100.00 becomes ["A"(5), "C"(2)]
    book.on_message(&open(101, "C", Side::Buy, dec!(100.00), dec!(2)))
        .await
        .unwrap();
    let bids = book.snapshot().bids;
    assert_eq!(
        bids.iter()
            .map(|o| (o.order_id.as_str(), o.size))
            .collect::<Vec<_>>(),
        [("A", dec!(5)), ("C", dec!(2))]
    );

    // match consumes "A" entirely: only ["C"(2)] remains
    book.on_message(&match_msg(102, "A", Side::Buy, dec!(100.00), dec!(5)))
        .await
        .unwrap();
    let bids = book.snapshot().bids;
    assert_eq!(
        bids.iter()
            .map(|o| (o.order_id.as_str(), o.size))
            .collect::<Vec<_>>(),
        [("C", dec!(2))]
    );

    // done at 104 while 103 is expected: a gap, so the book resyncs and
    // becomes exactly what the provider now returns
    book.on_message(&done(104, "B", Side::Sell, Some(dec!(101.00))))
        .await
        .unwrap();
    assert_eq!(book.sequence(), Some(200));
    assert_eq!(book.snapshot_provider().calls(), 2);

    let view = book.snapshot();
    assert_eq!(view.bids.len(), 1);
    assert_eq!(view.bids[0].order_id, "R1");
    assert_eq!(view.asks.len(), 1);
    assert_eq!(view.asks[0].order_id, "R2");
}

#[tokio::test]
async fn snapshot_reads_are_consistent_around_resets() {
    let book = synced_book(MockSnapshots::new(vec![base_snapshot()])).await;

    // a reset must swap in a fully built book: a view taken after it
    // reflects the whole new snapshot, never a partial population
    book.reset_book().await.unwrap();
    let view = book.snapshot();
    assert_eq!(view.bids.len() + view.asks.len(), 2);
    assert_eq!(view.sequence, Some(100));
}
