//! In-memory `EventStore`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use eventlog_core::clock::{Clock, SystemClock};
use eventlog_core::error::EventStoreError;
use eventlog_core::model::{
    EventEnvelope, Events, ExpectedVersion, SequenceNumber, StreamName, Version,
};
use eventlog_core::status::{ProvidesSetup, ProvidesStatus, SetupResult, Status};
use eventlog_core::store::{CommitResult, EventStore};
use eventlog_core::stream::{EventStreamFilter, InMemoryEventStream, StreamTarget};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct EventLog {
    envelopes: Vec<EventEnvelope>,
    /// Current version of every non-empty stream.
    versions: HashMap<StreamName, Version>,
    /// Last assigned sequence number; survives stream deletion.
    sequence_number: SequenceNumber,
}

/// An [`EventStore`] keeping every envelope in a vector.
///
/// Commits are serialised by a mutex, so each one is atomic with respect to
/// every other commit. [`EventStore::load`] takes a snapshot: events committed
/// after the call are not visible through the returned cursor.
pub struct InMemoryEventStore {
    log: Mutex<EventLog>,
    clock: Box<dyn Clock>,
}

impl InMemoryEventStore {
    /// Creates an empty store stamping events with the system time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty store stamping events with `clock`.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            log: Mutex::new(EventLog::default()),
            clock: Box::new(clock),
        }
    }

    /// Current version of `stream_name`, `None` if it holds no events.
    #[must_use]
    pub fn current_version(&self, stream_name: &StreamName) -> Option<Version> {
        self.lock().versions.get(stream_name).copied()
    }

    // Every mutation completes before its guard drops, so a poisoned log is
    // still consistent.
    fn lock(&self) -> MutexGuard<'_, EventLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryEventStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let log = self.lock();
        f.debug_struct("InMemoryEventStore")
            .field("envelopes", &log.envelopes.len())
            .field("sequence_number", &log.sequence_number)
            .finish_non_exhaustive()
    }
}

impl EventStore for InMemoryEventStore {
    type Stream = InMemoryEventStream;

    fn load(&self, target: StreamTarget, filter: EventStreamFilter) -> Self::Stream {
        let log = self.lock();
        InMemoryEventStream::new(
            log.envelopes
                .iter()
                .filter(|envelope| target.matches(envelope) && filter.matches(envelope))
                .cloned()
                .collect::<Vec<_>>(),
        )
    }

    fn commit(
        &self,
        stream_name: &StreamName,
        events: Events,
        expected_version: ExpectedVersion,
    ) -> Result<CommitResult, EventStoreError> {
        let mut log = self.lock();
        let current = log.versions.get(stream_name).copied();

        if let Err(error) = expected_version.verify(stream_name, current) {
            warn!(
                stream_name = %stream_name,
                expected = %expected_version,
                "commit rejected by concurrency check"
            );
            return Err(error);
        }

        let count = events.len();
        let recorded_at = self.clock.now();
        let mut next_version = current.map_or(Version::first(), Version::next);
        let mut version = next_version;
        let mut sequence_number = log.sequence_number;
        for event in events {
            version = next_version;
            sequence_number = sequence_number.next();
            log.envelopes.push(EventEnvelope {
                event,
                stream_name: stream_name.clone(),
                version,
                sequence_number,
                recorded_at,
            });
            next_version = version.next();
        }

        let result = CommitResult {
            highest_committed_version: version,
            highest_committed_sequence_number: sequence_number,
        };
        log.sequence_number = sequence_number;
        log.versions
            .insert(stream_name.clone(), result.highest_committed_version);

        debug!(
            stream_name = %stream_name,
            count,
            highest_sequence_number = %sequence_number,
            "committed events"
        );
        Ok(result)
    }

    fn delete_stream(&self, stream_name: &StreamName) -> Result<(), EventStoreError> {
        let mut log = self.lock();
        let before = log.envelopes.len();
        log.envelopes
            .retain(|envelope| &envelope.stream_name != stream_name);
        log.versions.remove(stream_name);

        debug!(
            stream_name = %stream_name,
            removed = before - log.envelopes.len(),
            "deleted stream"
        );
        Ok(())
    }
}

impl ProvidesSetup for InMemoryEventStore {
    type Error = Infallible;

    fn setup(&self) -> Result<SetupResult, Self::Error> {
        Ok(SetupResult::with_message(
            "in-memory event store requires no setup",
        ))
    }
}

impl ProvidesStatus for InMemoryEventStore {
    fn status(&self) -> Status {
        Status::ok()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use eventlog_core::model::{CorrelationId, EventType, EventTypes};
    use eventlog_core::stream::{EventStream, VirtualStreamName};
    use eventlog_test_support::{FixedClock, SteppingClock, data_of, event, sequence_numbers_of};

    use super::*;

    fn stream(name: &str) -> StreamName {
        StreamName::from_string(name).unwrap()
    }

    fn three_events() -> Events {
        Events::from_vec(vec![
            event("SomeEventType", "a"),
            event("SomeEventType", "b"),
            event("SomeEventType", "c"),
        ])
        .unwrap()
    }

    fn store_with_three_events() -> InMemoryEventStore {
        let store = InMemoryEventStore::new();
        store
            .commit(&stream("existing-stream"), three_events(), ExpectedVersion::Any)
            .unwrap();
        store
    }

    fn versions_of(store: &InMemoryEventStore, target: StreamTarget) -> Vec<u64> {
        store
            .load(target, EventStreamFilter::none())
            .iter()
            .map(|item| item.unwrap().version.value())
            .collect()
    }

    #[test]
    fn test_commit_assigns_versions_and_sequence_numbers() {
        // Arrange
        let store = InMemoryEventStore::new();

        // Act
        let result = store
            .commit(&stream("stream-a"), three_events(), ExpectedVersion::NoStream)
            .unwrap();

        // Assert
        assert_eq!(result.highest_committed_version, Version::from_u64(2));
        assert_eq!(
            result.highest_committed_sequence_number,
            SequenceNumber::from_u64(3)
        );
        assert_eq!(versions_of(&store, stream("stream-a").into()), vec![0, 1, 2]);
        assert_eq!(
            store.current_version(&stream("stream-a")),
            Some(Version::from_u64(2))
        );
    }

    #[test]
    fn test_expected_versions_that_succeed() {
        let accepted = [
            ExpectedVersion::Any,
            ExpectedVersion::StreamExists,
            ExpectedVersion::Exact(Version::from_u64(2)),
        ];

        for expected_version in accepted {
            let store = store_with_three_events();

            let result = store.commit(
                &stream("existing-stream"),
                Events::single(event("SomeEventType", "d")),
                expected_version,
            );

            assert!(result.is_ok(), "{expected_version} should be accepted");
        }
    }

    #[test]
    fn test_expected_versions_that_fail_on_existing_stream() {
        let rejected = [
            ExpectedVersion::NoStream,
            ExpectedVersion::Exact(Version::first()),
            ExpectedVersion::Exact(Version::from_u64(123)),
        ];

        for expected_version in rejected {
            let store = store_with_three_events();

            let result = store.commit(
                &stream("existing-stream"),
                Events::single(event("SomeEventType", "d")),
                expected_version,
            );

            assert!(
                matches!(result, Err(EventStoreError::Concurrency { .. })),
                "{expected_version} should be rejected"
            );
            assert_eq!(versions_of(&store, StreamTarget::all()), vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_expected_versions_that_fail_on_missing_stream() {
        let rejected = [
            ExpectedVersion::StreamExists,
            ExpectedVersion::Exact(Version::first()),
            ExpectedVersion::Exact(Version::from_u64(123)),
        ];

        for expected_version in rejected {
            let store = store_with_three_events();

            let result = store.commit(
                &stream("missing-stream"),
                Events::single(event("SomeEventType", "d")),
                expected_version,
            );

            match result {
                Err(EventStoreError::Concurrency {
                    stream_name,
                    expected,
                    actual,
                }) => {
                    assert_eq!(stream_name, stream("missing-stream"));
                    assert_eq!(expected, expected_version);
                    assert_eq!(actual, None);
                }
                other => panic!("expected Concurrency for {expected_version}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_events_of_one_commit_share_recorded_at() {
        // Arrange
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let store = InMemoryEventStore::with_clock(SteppingClock::new(start, TimeDelta::seconds(1)));

        // Act
        store
            .commit(&stream("stream-a"), three_events(), ExpectedVersion::Any)
            .unwrap();
        store
            .commit(&stream("stream-b"), three_events(), ExpectedVersion::Any)
            .unwrap();

        // Assert
        let recorded: Vec<_> = store
            .load(StreamTarget::all(), EventStreamFilter::none())
            .iter()
            .map(|item| item.unwrap().recorded_at)
            .collect();
        let later = start + TimeDelta::seconds(1);
        assert_eq!(recorded, vec![start, start, start, later, later, later]);
    }

    #[test]
    fn test_recorded_at_comes_from_injected_clock() {
        let now = Utc.with_ymd_and_hms(2026, 5, 17, 8, 30, 0).unwrap();
        let store = InMemoryEventStore::with_clock(FixedClock(now));

        store
            .commit(&stream("stream-a"), three_events(), ExpectedVersion::Any)
            .unwrap();

        assert!(
            store
                .load(StreamTarget::all(), EventStreamFilter::none())
                .iter()
                .all(|item| item.unwrap().recorded_at == now)
        );
    }

    #[test]
    fn test_load_filters_by_event_type() {
        let store = InMemoryEventStore::new();
        store
            .commit(
                &stream("stream-a"),
                Events::from_vec(vec![
                    event("Created", "a"),
                    event("Renamed", "b"),
                    event("Deleted", "c"),
                    event("Renamed", "d"),
                ])
                .unwrap(),
                ExpectedVersion::Any,
            )
            .unwrap();
        let types = EventTypes::create([
            EventType::from_string("Renamed").unwrap(),
            EventType::from_string("Deleted").unwrap(),
        ])
        .unwrap();

        let loaded = store.load(StreamTarget::all(), EventStreamFilter::for_event_types(types));

        assert_eq!(data_of(&loaded), "bcd");
    }

    #[test]
    fn test_load_by_category_and_correlation_id() {
        let store = InMemoryEventStore::new();
        let correlation_id = CorrelationId::from_string("request-7").unwrap();
        store
            .commit(
                &stream("customer-1"),
                Events::single(event("SomeEventType", "a").with_correlation_id(correlation_id.clone())),
                ExpectedVersion::Any,
            )
            .unwrap();
        store
            .commit(
                &stream("order-1"),
                Events::single(event("SomeEventType", "b").with_correlation_id(correlation_id.clone())),
                ExpectedVersion::Any,
            )
            .unwrap();
        store
            .commit(
                &stream("customer-2"),
                Events::single(event("SomeEventType", "c")),
                ExpectedVersion::Any,
            )
            .unwrap();

        let customers = store.load(
            VirtualStreamName::for_category("customer-").unwrap().into(),
            EventStreamFilter::none(),
        );
        let correlated = store.load(
            VirtualStreamName::for_correlation_id(&correlation_id).into(),
            EventStreamFilter::none(),
        );

        assert_eq!(data_of(&customers), "ac");
        assert_eq!(data_of(&correlated), "ab");
    }

    #[test]
    fn test_load_is_a_snapshot() {
        let store = store_with_three_events();

        let loaded = store.load(StreamTarget::all(), EventStreamFilter::none());
        store
            .commit(
                &stream("existing-stream"),
                Events::single(event("SomeEventType", "d")),
                ExpectedVersion::Any,
            )
            .unwrap();

        assert_eq!(data_of(&loaded), "abc");
    }

    #[test]
    fn test_delete_stream_never_reuses_sequence_numbers() {
        // Arrange
        let store = store_with_three_events();

        // Act
        store.delete_stream(&stream("existing-stream")).unwrap();
        store
            .commit(&stream("existing-stream"), three_events(), ExpectedVersion::NoStream)
            .unwrap();

        // Assert
        let loaded = store.load(StreamTarget::all(), EventStreamFilter::none());
        assert_eq!(sequence_numbers_of(&loaded), vec![4, 5, 6]);
        assert_eq!(versions_of(&store, StreamTarget::all()), vec![0, 1, 2]);
    }

    #[test]
    fn test_delete_missing_stream_is_a_no_op() {
        let store = store_with_three_events();

        store.delete_stream(&stream("missing-stream")).unwrap();

        assert_eq!(
            sequence_numbers_of(&store.load(StreamTarget::all(), EventStreamFilter::none())),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_setup_and_status() {
        let store = InMemoryEventStore::default();

        let setup = store.setup().unwrap();

        assert_eq!(setup.messages.len(), 1);
        assert!(store.status().is_ok());
    }
}
