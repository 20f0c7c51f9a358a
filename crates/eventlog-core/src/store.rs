//! Event store contract.

use serde::{Deserialize, Serialize};

use crate::error::EventStoreError;
use crate::model::{Events, ExpectedVersion, SequenceNumber, StreamName, Version};
use crate::stream::{EventStream, EventStreamFilter, StreamTarget};

/// Positions assigned to the last event of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    /// Version of the last committed event within its stream.
    pub highest_committed_version: Version,
    /// Global sequence number of the last committed event.
    pub highest_committed_sequence_number: SequenceNumber,
}

/// An append-only log of events partitioned into named streams.
///
/// Every stored event has a version, gap-free and starting at 0 within its
/// stream, and a sequence number, strictly increasing across the whole log
/// and never reused.
pub trait EventStore: Send + Sync {
    /// The cursor returned by [`EventStore::load`].
    type Stream: EventStream;

    /// Returns a lazy cursor over the events of `target` that pass `filter`.
    ///
    /// Nothing is read until the cursor is iterated; storage failures surface
    /// as `Err` items during iteration.
    fn load(&self, target: StreamTarget, filter: EventStreamFilter) -> Self::Stream;

    /// Appends `events` to `stream_name` if `expected_version` holds.
    ///
    /// The commit is atomic: either every event is appended or none is.
    ///
    /// # Errors
    ///
    /// Returns `EventStoreError::Concurrency` if the stream's current version
    /// does not satisfy `expected_version`, or `EventStoreError::Infrastructure`
    /// on a storage failure.
    fn commit(
        &self,
        stream_name: &StreamName,
        events: Events,
        expected_version: ExpectedVersion,
    ) -> Result<CommitResult, EventStoreError>;

    /// Removes every event of `stream_name`.
    ///
    /// Sequence numbers of deleted events are never reassigned; a stream
    /// recreated afterwards starts again at version 0.
    ///
    /// # Errors
    ///
    /// Returns `EventStoreError::Unsupported` for backends that cannot delete,
    /// or `EventStoreError::Infrastructure` on a storage failure.
    fn delete_stream(&self, stream_name: &StreamName) -> Result<(), EventStoreError>;
}
