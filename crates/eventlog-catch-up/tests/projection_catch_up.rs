//! Catching up projections against the in-memory backends.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::num::NonZeroUsize;

use eventlog_catch_up::{CatchUp, CatchUpConfig, CatchUpError};
use eventlog_core::checkpoint::CheckpointStorage;
use eventlog_core::error::CheckpointError;
use eventlog_core::model::{EventEnvelope, Events, ExpectedVersion, SequenceNumber, StreamName};
use eventlog_core::store::EventStore;
use eventlog_core::stream::{BatchEventStream, EventStreamFilter, StreamTarget};
use eventlog_in_memory::{CheckpointLockRegistry, InMemoryCheckpointStorage, InMemoryEventStore};
use eventlog_test_support::{event, init_test_tracing};

fn commit(store: &InMemoryEventStore, stream: &str, data: &[&str]) {
    let events =
        Events::from_vec(data.iter().map(|d| event("SomeEventType", d)).collect()).unwrap();
    store
        .commit(
            &StreamName::from_string(stream).unwrap(),
            events,
            ExpectedVersion::Any,
        )
        .unwrap();
}

/// Counts events per stream.
#[derive(Debug, Default)]
struct StreamSizes(RefCell<BTreeMap<String, usize>>);

impl StreamSizes {
    fn apply(&self, envelope: &EventEnvelope) -> Result<(), Infallible> {
        *self
            .0
            .borrow_mut()
            .entry(envelope.stream_name.to_string())
            .or_default() += 1;
        Ok(())
    }

    fn get(&self, stream: &str) -> usize {
        self.0.borrow().get(stream).copied().unwrap_or_default()
    }
}

#[test]
fn test_second_run_only_applies_new_events() {
    // Arrange
    init_test_tracing();
    let store = InMemoryEventStore::new();
    let registry = CheckpointLockRegistry::new();
    let checkpoints = InMemoryCheckpointStorage::new("stream-sizes", &registry);
    let projection = StreamSizes::default();
    commit(&store, "customer-1", &["a", "b", "c"]);
    commit(&store, "customer-2", &["d", "e"]);

    // Act
    let first = CatchUp::new(|envelope: &EventEnvelope| projection.apply(envelope), &checkpoints)
        .run(&store.load(StreamTarget::all(), EventStreamFilter::none()))
        .unwrap();
    commit(&store, "customer-1", &["f"]);
    let second = CatchUp::new(|envelope: &EventEnvelope| projection.apply(envelope), &checkpoints)
        .run(&store.load(StreamTarget::all(), EventStreamFilter::none()))
        .unwrap();

    // Assert
    assert_eq!(first, SequenceNumber::from_u64(5));
    assert_eq!(second, SequenceNumber::from_u64(6));
    assert_eq!(projection.get("customer-1"), 4);
    assert_eq!(projection.get("customer-2"), 2);
    assert_eq!(
        checkpoints.highest_applied_sequence_number(),
        Ok(SequenceNumber::from_u64(6))
    );
    assert!(!registry.is_held("stream-sizes"));
}

#[test]
fn test_catch_up_over_batched_stream() {
    init_test_tracing();
    let store = InMemoryEventStore::new();
    let checkpoints = InMemoryCheckpointStorage::new("stream-sizes", &CheckpointLockRegistry::new());
    let projection = StreamSizes::default();
    for n in 0..10 {
        commit(&store, &format!("order-{}", n % 3), &["x", "y"]);
    }
    let config = CatchUpConfig::from_lookup(|_| Some("7".to_owned())).unwrap();
    let batched = BatchEventStream::create(
        store.load(StreamTarget::all(), EventStreamFilter::none()),
        NonZeroUsize::new(4).unwrap(),
    );

    let highest = CatchUp::new(|envelope: &EventEnvelope| projection.apply(envelope), &checkpoints)
        .with_config(&config)
        .run(&batched)
        .unwrap();

    assert_eq!(highest, SequenceNumber::from_u64(20));
    assert_eq!(projection.get("order-0"), 8);
    assert_eq!(projection.get("order-1"), 6);
    assert_eq!(projection.get("order-2"), 6);
}

#[test]
fn test_overlapping_runs_for_one_subscription_are_rejected() {
    // Arrange
    init_test_tracing();
    let store = InMemoryEventStore::new();
    let registry = CheckpointLockRegistry::new();
    let running = InMemoryCheckpointStorage::new("stream-sizes", &registry);
    let competing = InMemoryCheckpointStorage::new("stream-sizes", &registry);
    let other_subscription = InMemoryCheckpointStorage::new("other", &registry);
    commit(&store, "customer-1", &["a", "b"]);
    let events = store.load(StreamTarget::all(), EventStreamFilter::none());
    let competing_results = RefCell::new(Vec::new());

    // Act
    CatchUp::new(
        |_: &EventEnvelope| -> Result<(), Infallible> {
            let competing_result = CatchUp::new(|_: &EventEnvelope| Ok::<_, Infallible>(()), &competing)
                .with_batch_size(NonZeroUsize::new(100).unwrap())
                .run(&events);
            let other_result = CatchUp::new(|_: &EventEnvelope| Ok::<_, Infallible>(()), &other_subscription)
                .run(&events);
            competing_results
                .borrow_mut()
                .push((competing_result.is_err(), other_result.is_ok()));
            if let Err(CatchUpError::Checkpoint(error)) = competing_result {
                assert!(matches!(error, CheckpointError::LockAlreadyHeld { .. }));
            }
            Ok(())
        },
        &running,
    )
    .with_batch_size(NonZeroUsize::new(100).unwrap())
    .run(&events)
    .unwrap();

    // Assert
    assert_eq!(*competing_results.borrow(), vec![(true, true), (true, true)]);
}

#[derive(Debug)]
struct FlushFailed;

#[test]
fn test_failed_flush_leaves_unflushed_batch_to_the_next_run() {
    // Arrange
    init_test_tracing();
    let store = InMemoryEventStore::new();
    let checkpoints = InMemoryCheckpointStorage::new("buffered", &CheckpointLockRegistry::new());
    commit(&store, "customer-1", &["a", "b", "c", "d", "e", "f", "g", "h"]);
    let events = store.load(StreamTarget::all(), EventStreamFilter::none());
    let pending = RefCell::new(Vec::new());
    let flushed = RefCell::new(Vec::new());
    let flushes = RefCell::new(0);
    let buffer = |envelope: &EventEnvelope| -> Result<(), FlushFailed> {
        pending.borrow_mut().push(envelope.sequence_number.value());
        Ok(())
    };

    // Act
    let failed = CatchUp::new(buffer, &checkpoints)
        .with_batch_size(NonZeroUsize::new(3).unwrap())
        .with_before_batch_completed(|| {
            *flushes.borrow_mut() += 1;
            if *flushes.borrow() == 2 {
                pending.borrow_mut().clear();
                return Err(FlushFailed);
            }
            flushed.borrow_mut().append(&mut pending.borrow_mut());
            Ok(())
        })
        .run(&events);
    let checkpoint_after_failure = checkpoints.highest_applied_sequence_number();
    let resumed = CatchUp::new(buffer, &checkpoints)
        .with_batch_size(NonZeroUsize::new(3).unwrap())
        .with_before_batch_completed(|| {
            flushed.borrow_mut().append(&mut pending.borrow_mut());
            Ok(())
        })
        .run(&events);

    // Assert
    assert!(matches!(failed, Err(CatchUpError::BeforeBatchCompleted(FlushFailed))));
    assert_eq!(checkpoint_after_failure, Ok(SequenceNumber::from_u64(3)));
    assert_eq!(resumed.unwrap(), SequenceNumber::from_u64(8));
    assert_eq!(*flushed.borrow(), (1..=8).collect::<Vec<u64>>());
}
