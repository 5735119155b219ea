//! Drop-newest backpressure and close semantics of the handoff channel

mod common;

use common::*;
use eeg_lib::handoff::{self, SendOutcome};
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;

#[test]
fn test_zero_capacity_rejected() {
    assert!(matches!(handoff::channel(0), Err(EegError::InvalidCapacity)));
}

#[tokio::test]
async fn test_fifo_order() {
    let (tx, mut rx) = handoff::channel(10).unwrap();
    for i in 0..5 {
        assert_eq!(tx.send(numbered_frame(i)), SendOutcome::Queued);
    }
    drop(tx);

    for i in 0..5 {
        assert_eq!(rx.recv().await, Some(numbered_frame(i)));
    }
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_overflow_drops_newest_without_blocking() {
    let capacity = 4;
    let (mut tx, mut rx) = handoff::channel(capacity).unwrap();

    // Must complete immediately even though nobody is receiving
    let outcomes = tokio::time::timeout(Duration::from_millis(100), async {
        (0..10).map(|i| tx.send(numbered_frame(i))).collect::<Vec<_>>()
    })
    .await
    .expect("send blocked on a full queue");

    assert_eq!(&outcomes[..capacity], &[SendOutcome::Queued; 4]);
    assert!(outcomes[capacity..].iter().all(|o| *o == SendOutcome::Dropped));
    assert_eq!(tx.stats().dropped(), 6);
    assert_eq!(rx.len(), capacity);

    // Room again: later frames get through, leaving a gap where drops happened
    assert_eq!(rx.recv().await, Some(numbered_frame(0)));
    assert_eq!(tx.send(numbered_frame(10)), SendOutcome::Queued);
    tx.close();

    let mut received = Vec::new();
    while let Some(frame) = rx.recv().await {
        received.push(frame);
    }
    assert_eq!(
        received,
        vec![numbered_frame(1), numbered_frame(2), numbered_frame(3), numbered_frame(10)]
    );
    assert_eq!(rx.stats().queued(), 5);
}

#[tokio::test]
async fn test_send_after_close_is_noop() {
    let (mut tx, mut rx) = handoff::channel(4).unwrap();
    tx.send(numbered_frame(1));
    tx.close();
    tx.close();

    assert!(tx.is_closed());
    assert_eq!(tx.send(numbered_frame(2)), SendOutcome::Closed);

    // Backlog is still delivered before end-of-stream
    assert_eq!(rx.recv().await, Some(numbered_frame(1)));
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_send_to_dropped_receiver() {
    let (tx, rx) = handoff::channel(4).unwrap();
    drop(rx);
    assert!(tx.is_closed());
    assert_eq!(tx.send(numbered_frame(0)), SendOutcome::Closed);
    assert_eq!(tx.stats().dropped(), 0);
}

#[test]
fn test_try_recv_tells_empty_from_closed() {
    let (mut tx, mut rx) = handoff::channel(4).unwrap();
    assert!(rx.is_empty());
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

    tx.send(numbered_frame(3));
    assert!(!rx.is_empty());
    assert_eq!(rx.try_recv(), Ok(numbered_frame(3)));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

    tx.send(numbered_frame(4));
    tx.close();
    // Backlog first, then end-of-stream
    assert_eq!(rx.try_recv(), Ok(numbered_frame(4)));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
}
