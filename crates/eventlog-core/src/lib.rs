//! Eventlog Core: the event model and storage contracts.
//!
//! This crate defines the value objects of an append-only, multi-stream
//! event log, the [`EventStream`](stream::EventStream) cursor abstraction,
//! and the [`EventStore`](store::EventStore) and
//! [`CheckpointStorage`](checkpoint::CheckpointStorage) contracts that
//! backends implement. It contains no storage code.

pub mod checkpoint;
pub mod clock;
pub mod error;
pub mod model;
pub mod status;
pub mod store;
pub mod stream;
