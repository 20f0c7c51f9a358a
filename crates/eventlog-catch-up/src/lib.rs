//! Eventlog Catch-Up: feeds a projection every event it has not seen yet.
//!
//! [`CatchUp`] iterates an event stream starting after the position stored
//! in a [`CheckpointStorage`](eventlog_core::checkpoint::CheckpointStorage),
//! hands each event to a handler, and persists the new position every
//! `batch_size` events. The checkpoint's lock keeps two runs for the same
//! subscription from overlapping.

mod catch_up;
mod config;
mod error;

pub use catch_up::CatchUp;
pub use config::{BATCH_SIZE_ENV, CatchUpConfig};
pub use error::{CatchUpError, ConfigError};
