//! Catch-up error types.

use std::num::ParseIntError;

use eventlog_core::error::{CheckpointError, EventStoreError};
use thiserror::Error;

/// Failure of a [`CatchUp::run`](crate::CatchUp::run).
///
/// `E` is the error type of the event handler and of the
/// before-batch-completed hook.
#[derive(Debug, Error)]
pub enum CatchUpError<E> {
    /// The checkpoint storage refused or failed an operation.
    #[error("checkpoint storage failed: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// The event stream yielded an error.
    #[error("event stream failed: {0}")]
    EventStream(#[from] EventStoreError),

    /// The event handler failed.
    #[error("event handler failed")]
    Handler(#[source] E),

    /// The before-batch-completed hook failed.
    #[error("before-batch-completed hook failed")]
    BeforeBatchCompleted(#[source] E),
}

/// Invalid catch-up configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The batch size is not a positive integer.
    #[error("invalid batch size \"{value}\": {source}")]
    InvalidBatchSize {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        source: ParseIntError,
    },
}
