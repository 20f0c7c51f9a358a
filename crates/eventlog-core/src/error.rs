//! Error types for the event log.

use thiserror::Error;

use crate::model::{ExpectedVersion, StreamName, Version};

/// Rejected input to a value-object constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required value was empty.
    #[error("the {field} must not be empty")]
    Empty {
        /// Human-readable name of the rejected value.
        field: &'static str,
    },

    /// A value exceeded its maximum length.
    #[error("the {field} must not exceed {max} characters, got {actual}")]
    TooLong {
        /// Human-readable name of the rejected value.
        field: &'static str,
        /// Maximum number of characters allowed.
        max: usize,
        /// Number of characters given.
        actual: usize,
    },

    /// A value contained characters outside the ASCII range.
    #[error("the {field} must only contain ASCII characters, given: {value}")]
    NonAscii {
        /// Human-readable name of the rejected value.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// An event id that is not a UUID.
    #[error("invalid event id \"{0}\": expected a UUID")]
    InvalidEventId(String),

    /// Event metadata that is not a JSON object.
    #[error("invalid event metadata: {0}")]
    InvalidMetadata(String),

    /// An event batch without events.
    #[error("writable events must contain at least one event")]
    EmptyEvents,

    /// An event type set without event types.
    #[error("event types must not be empty")]
    EmptyEventTypes,

    /// An integer that does not encode an expected version.
    #[error("{0} does not encode an expected version")]
    InvalidExpectedVersion(i64),

    /// A version too large for the integer encoding.
    #[error("version {0} exceeds the integer encoding of expected versions")]
    UnencodableVersion(u64),
}

/// Errors raised by an [`EventStore`](crate::store::EventStore) or while
/// iterating one of its streams.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// Optimistic concurrency precondition failed at commit.
    #[error(
        "concurrency conflict on stream \"{stream_name}\": expected version {expected}, found {}",
        describe_version(.actual)
    )]
    Concurrency {
        /// The stream the commit targeted.
        stream_name: StreamName,
        /// The precondition supplied by the writer.
        expected: ExpectedVersion,
        /// The version of the last event in the stream, if any.
        actual: Option<Version>,
    },

    /// The backend does not implement this operation.
    #[error("operation not supported by this event store: {0}")]
    Unsupported(&'static str),

    /// A storage/persistence failure.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// Errors raised by a [`CheckpointStorage`](crate::checkpoint::CheckpointStorage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointError {
    /// Another holder already owns the lock for this subscription.
    #[error("lock for subscription \"{subscription_id}\" is already held")]
    LockAlreadyHeld {
        /// The subscription whose lock was requested.
        subscription_id: String,
    },

    /// Release was requested without a held lock.
    #[error("lock for subscription \"{subscription_id}\" is not held")]
    LockNotHeld {
        /// The subscription whose lock was released.
        subscription_id: String,
    },

    /// A storage/persistence failure.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

#[allow(clippy::ref_option)]
fn describe_version(version: &Option<Version>) -> String {
    version.map_or_else(|| "[none]".to_owned(), |version| version.to_string())
}
