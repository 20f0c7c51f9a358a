//! Checkpoint contract for subscriptions.

use crate::error::CheckpointError;
use crate::model::SequenceNumber;

/// Durable "highest applied" position of one subscription, guarded by an
/// exclusive lock.
///
/// A holder calls [`acquire_lock`](CheckpointStorage::acquire_lock), applies
/// events, then persists its new position with
/// [`update_and_release_lock`](CheckpointStorage::update_and_release_lock).
/// At most one holder owns the lock of a subscription at any time.
pub trait CheckpointStorage: Send + Sync {
    /// Takes the subscription's lock and returns the last persisted position,
    /// [`SequenceNumber::none`] on first use.
    ///
    /// # Errors
    ///
    /// Returns `CheckpointError::LockAlreadyHeld` if another holder owns the
    /// lock.
    fn acquire_lock(&self) -> Result<SequenceNumber, CheckpointError>;

    /// Persists `sequence_number` and releases the lock.
    ///
    /// # Errors
    ///
    /// Returns `CheckpointError::LockNotHeld` if the lock is not held.
    fn update_and_release_lock(&self, sequence_number: SequenceNumber)
    -> Result<(), CheckpointError>;

    /// Reads the persisted position without locking.
    ///
    /// # Errors
    ///
    /// Returns `CheckpointError::Infrastructure` on a storage failure.
    fn highest_applied_sequence_number(&self) -> Result<SequenceNumber, CheckpointError>;
}
