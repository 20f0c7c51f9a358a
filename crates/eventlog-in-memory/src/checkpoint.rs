//! In-memory `CheckpointStorage` and the lock registry it coordinates through.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eventlog_core::checkpoint::CheckpointStorage;
use eventlog_core::error::CheckpointError;
use eventlog_core::model::SequenceNumber;
use tracing::debug;

/// The set of subscription ids whose lock is currently held.
///
/// Storages created from clones of one registry exclude each other per
/// subscription id. Tests create a fresh registry, or call
/// [`reset`](Self::reset), to isolate themselves.
#[derive(Debug, Clone, Default)]
pub struct CheckpointLockRegistry {
    held: Arc<Mutex<HashSet<String>>>,
}

impl CheckpointLockRegistry {
    /// Creates a registry without held locks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `subscription_id` as held. Returns `false` if it already was.
    pub fn try_acquire(&self, subscription_id: &str) -> bool {
        self.held().insert(subscription_id.to_owned())
    }

    /// Marks `subscription_id` as free. Returns `false` if it was not held.
    pub fn release(&self, subscription_id: &str) -> bool {
        self.held().remove(subscription_id)
    }

    /// Returns `true` while `subscription_id` is held.
    #[must_use]
    pub fn is_held(&self, subscription_id: &str) -> bool {
        self.held().contains(subscription_id)
    }

    /// Releases every lock.
    pub fn reset(&self) {
        self.held().clear();
    }

    fn held(&self) -> MutexGuard<'_, HashSet<String>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default)]
struct Checkpoint {
    highest_applied: SequenceNumber,
    holds_lock: bool,
}

/// A [`CheckpointStorage`] keeping its position in memory.
///
/// Each instance owns its position; the lock lives in the shared
/// [`CheckpointLockRegistry`].
#[derive(Debug)]
pub struct InMemoryCheckpointStorage {
    subscription_id: String,
    registry: CheckpointLockRegistry,
    checkpoint: Mutex<Checkpoint>,
}

impl InMemoryCheckpointStorage {
    /// Creates a storage for `subscription_id` locking through `registry`.
    pub fn new(subscription_id: impl Into<String>, registry: &CheckpointLockRegistry) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            registry: registry.clone(),
            checkpoint: Mutex::new(Checkpoint::default()),
        }
    }

    /// The subscription this storage tracks.
    #[must_use]
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn checkpoint(&self) -> MutexGuard<'_, Checkpoint> {
        self.checkpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl CheckpointStorage for InMemoryCheckpointStorage {
    fn acquire_lock(&self) -> Result<SequenceNumber, CheckpointError> {
        let mut checkpoint = self.checkpoint();
        if !self.registry.try_acquire(&self.subscription_id) {
            return Err(CheckpointError::LockAlreadyHeld {
                subscription_id: self.subscription_id.clone(),
            });
        }
        checkpoint.holds_lock = true;

        debug!(
            subscription_id = %self.subscription_id,
            highest_applied = %checkpoint.highest_applied,
            "acquired checkpoint lock"
        );
        Ok(checkpoint.highest_applied)
    }

    fn update_and_release_lock(
        &self,
        sequence_number: SequenceNumber,
    ) -> Result<(), CheckpointError> {
        let mut checkpoint = self.checkpoint();
        if !checkpoint.holds_lock {
            return Err(CheckpointError::LockNotHeld {
                subscription_id: self.subscription_id.clone(),
            });
        }
        checkpoint.highest_applied = sequence_number;
        checkpoint.holds_lock = false;
        self.registry.release(&self.subscription_id);

        debug!(
            subscription_id = %self.subscription_id,
            highest_applied = %sequence_number,
            "released checkpoint lock"
        );
        Ok(())
    }

    fn highest_applied_sequence_number(&self) -> Result<SequenceNumber, CheckpointError> {
        Ok(self.checkpoint().highest_applied)
    }
}
