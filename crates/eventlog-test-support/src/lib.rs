//! Shared test doubles and fixtures for the eventlog engine.

mod checkpoint;
mod clock;
mod fixtures;
mod logging;

pub use checkpoint::{FailingCheckpointStorage, RecordingCheckpointStorage};
pub use clock::{FixedClock, SteppingClock};
pub use fixtures::{data_of, envelope, envelopes, event, mock_event_stream, sequence_numbers_of};
pub use logging::init_test_tracing;
