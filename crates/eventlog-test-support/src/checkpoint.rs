//! Checkpoint storages for tests.

use std::sync::Mutex;

use eventlog_core::checkpoint::CheckpointStorage;
use eventlog_core::error::CheckpointError;
use eventlog_core::model::SequenceNumber;

const SUBSCRIPTION_ID: &str = "recording";

#[derive(Debug, Default)]
struct State {
    highest_applied: SequenceNumber,
    locked: bool,
    acquisitions: usize,
    updates: Vec<SequenceNumber>,
    fail_updates: bool,
}

/// A checkpoint storage that enforces the lock protocol and records every
/// persisted position.
#[derive(Debug, Default)]
pub struct RecordingCheckpointStorage {
    state: Mutex<State>,
}

impl RecordingCheckpointStorage {
    /// Creates a storage with no persisted position.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage whose persisted position is `sequence_number`.
    #[must_use]
    pub fn with_highest_applied(sequence_number: SequenceNumber) -> Self {
        Self {
            state: Mutex::new(State {
                highest_applied: sequence_number,
                ..State::default()
            }),
        }
    }

    /// Creates a storage whose `update_and_release_lock` always fails with an
    /// infrastructure error. The lock stays held.
    #[must_use]
    pub fn failing_updates() -> Self {
        Self {
            state: Mutex::new(State {
                fail_updates: true,
                ..State::default()
            }),
        }
    }

    /// Positions passed to successful `update_and_release_lock` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn updates(&self) -> Vec<SequenceNumber> {
        self.state.lock().unwrap().updates.clone()
    }

    /// Number of successful `acquire_lock` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn acquisitions(&self) -> usize {
        self.state.lock().unwrap().acquisitions
    }

    /// Returns `true` while the lock is held.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn is_locked(&self) -> bool {
        self.state.lock().unwrap().locked
    }
}

impl CheckpointStorage for RecordingCheckpointStorage {
    fn acquire_lock(&self) -> Result<SequenceNumber, CheckpointError> {
        let mut state = self.state.lock().unwrap();
        if state.locked {
            return Err(CheckpointError::LockAlreadyHeld {
                subscription_id: SUBSCRIPTION_ID.to_owned(),
            });
        }
        state.locked = true;
        state.acquisitions += 1;
        Ok(state.highest_applied)
    }

    fn update_and_release_lock(
        &self,
        sequence_number: SequenceNumber,
    ) -> Result<(), CheckpointError> {
        let mut state = self.state.lock().unwrap();
        if !state.locked {
            return Err(CheckpointError::LockNotHeld {
                subscription_id: SUBSCRIPTION_ID.to_owned(),
            });
        }
        if state.fail_updates {
            return Err(CheckpointError::Infrastructure("connection refused".into()));
        }
        state.highest_applied = sequence_number;
        state.updates.push(sequence_number);
        state.locked = false;
        Ok(())
    }

    fn highest_applied_sequence_number(&self) -> Result<SequenceNumber, CheckpointError> {
        Ok(self.state.lock().unwrap().highest_applied)
    }
}

/// A checkpoint storage that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingCheckpointStorage;

impl CheckpointStorage for FailingCheckpointStorage {
    fn acquire_lock(&self) -> Result<SequenceNumber, CheckpointError> {
        Err(CheckpointError::Infrastructure("connection refused".into()))
    }

    fn update_and_release_lock(
        &self,
        _sequence_number: SequenceNumber,
    ) -> Result<(), CheckpointError> {
        Err(CheckpointError::Infrastructure("connection refused".into()))
    }

    fn highest_applied_sequence_number(&self) -> Result<SequenceNumber, CheckpointError> {
        Err(CheckpointError::Infrastructure("connection refused".into()))
    }
}
