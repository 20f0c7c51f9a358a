//! In-memory implementations of the eventlog storage contracts.
//!
//! Both backends keep their state in process memory behind a mutex. They are
//! meant for tests and prototypes; nothing survives a restart.

mod checkpoint;
mod event_store;

pub use checkpoint::{CheckpointLockRegistry, InMemoryCheckpointStorage};
pub use event_store::InMemoryEventStore;
