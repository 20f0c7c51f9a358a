//! The catch-up loop.

use std::fmt;
use std::num::NonZeroUsize;

use eventlog_core::checkpoint::CheckpointStorage;
use eventlog_core::model::{EventEnvelope, SequenceNumber};
use eventlog_core::stream::EventStream;
use tracing::{debug, info, instrument, warn};

use crate::config::CatchUpConfig;
use crate::error::CatchUpError;

type Hook<'a, E> = Box<dyn FnMut() -> Result<(), E> + 'a>;

/// Applies the not yet applied events of a stream to a handler, persisting
/// progress in a [`CheckpointStorage`].
///
/// A run takes the checkpoint lock, so two runs for the same subscription
/// never overlap. Every `batch_size` applied events the position is persisted
/// and the lock is released and taken again. When the checkpoint storage shares
/// a transaction with the projection, each event is applied exactly once.
///
/// ```ignore
/// let mut catch_up = CatchUp::new(|envelope| projection.apply(envelope), &checkpoints)
///     .with_batch_size(NonZeroUsize::new(100).unwrap());
/// let position = catch_up.run(&store.load(StreamTarget::all(), EventStreamFilter::none()))?;
/// ```
pub struct CatchUp<'a, H, E> {
    event_handler: H,
    checkpoint_storage: &'a dyn CheckpointStorage,
    batch_size: NonZeroUsize,
    before_batch_completed: Option<Hook<'a, E>>,
}

/// Where a run currently stands.
struct Progress {
    highest_applied: SequenceNumber,
    /// Position returned by the last `acquire_lock`.
    persisted: SequenceNumber,
    lock_held: bool,
    applied: usize,
}

impl<'a, H, E> CatchUp<'a, H, E>
where
    H: FnMut(&EventEnvelope) -> Result<(), E>,
{
    /// Creates a catch-up persisting after every event.
    pub fn new(event_handler: H, checkpoint_storage: &'a dyn CheckpointStorage) -> Self {
        Self {
            event_handler,
            checkpoint_storage,
            batch_size: NonZeroUsize::MIN,
            before_batch_completed: None,
        }
    }

    /// Persists the position every `batch_size` events instead.
    #[must_use]
    pub fn with_batch_size(self, batch_size: NonZeroUsize) -> Self {
        Self { batch_size, ..self }
    }

    /// Applies `config`.
    #[must_use]
    pub fn with_config(self, config: &CatchUpConfig) -> Self {
        self.with_batch_size(config.batch_size)
    }

    /// Runs `hook` right before each position update becomes visible, e.g. to
    /// flush buffered projection writes. Replaces any previous hook.
    #[must_use]
    pub fn with_before_batch_completed(
        self,
        hook: impl FnMut() -> Result<(), E> + 'a,
    ) -> Self {
        Self {
            before_batch_completed: Some(Box::new(hook)),
            ..self
        }
    }

    /// Applies every event of `event_stream` after the persisted position and
    /// returns the new position.
    ///
    /// On failure the position of the last completed event is still
    /// persisted before the error is returned. If the hook fails at a batch
    /// boundary, the position of the previous batch is persisted instead.
    ///
    /// # Errors
    ///
    /// Returns `CatchUpError::Checkpoint` if the lock cannot be taken or the
    /// position cannot be persisted, `CatchUpError::EventStream` if the stream
    /// yields an error, and `CatchUpError::Handler` or
    /// `CatchUpError::BeforeBatchCompleted` with the callback's error. A hook
    /// error takes precedence over a checkpoint error, which takes precedence
    /// over the error that stopped iteration.
    #[instrument(skip_all, fields(batch_size = self.batch_size.get()))]
    pub fn run<S: EventStream>(
        &mut self,
        event_stream: &S,
    ) -> Result<SequenceNumber, CatchUpError<E>> {
        let persisted = self.checkpoint_storage.acquire_lock()?;
        let mut progress = Progress {
            highest_applied: persisted,
            persisted,
            lock_held: true,
            applied: 0,
        };
        info!(highest_applied = %progress.highest_applied, "starting catch-up");

        let outcome = self.apply_events(event_stream, &mut progress);

        // The hook already failed for this batch; do not call it again.
        let hook_result = if matches!(outcome, Err(CatchUpError::BeforeBatchCompleted(_))) {
            Ok(())
        } else {
            self.complete_batch()
        };
        let release_result = if progress.lock_held {
            self.checkpoint_storage
                .update_and_release_lock(progress.highest_applied)
        } else {
            Ok(())
        };

        hook_result?;
        let outcome = match outcome {
            Err(error @ CatchUpError::BeforeBatchCompleted(_)) => return Err(error),
            other => other,
        };
        release_result?;
        outcome?;

        info!(
            highest_applied = %progress.highest_applied,
            applied = progress.applied,
            "finished catch-up"
        );
        Ok(progress.highest_applied)
    }

    fn apply_events<S: EventStream>(
        &mut self,
        event_stream: &S,
        progress: &mut Progress,
    ) -> Result<(), CatchUpError<E>> {
        let pending = event_stream.with_minimum_sequence_number(progress.highest_applied.next());
        for item in pending.iter() {
            let envelope = item?;
            let sequence_number = envelope.sequence_number;
            if sequence_number <= progress.highest_applied {
                continue;
            }

            if let Err(error) = (self.event_handler)(&envelope) {
                warn!(%sequence_number, "event handler failed, stopping catch-up");
                return Err(CatchUpError::Handler(error));
            }
            progress.applied += 1;

            if progress.applied % self.batch_size != 0 {
                progress.highest_applied = sequence_number;
                continue;
            }
            if let Err(error) = self.complete_batch() {
                // Nothing of the unflushed batch may be checkpointed.
                progress.highest_applied = progress.persisted;
                return Err(error);
            }
            progress.lock_held = false;
            self.checkpoint_storage
                .update_and_release_lock(sequence_number)?;
            progress.persisted = self.checkpoint_storage.acquire_lock()?;
            progress.highest_applied = progress.persisted;
            progress.lock_held = true;
            debug!(%sequence_number, applied = progress.applied, "completed batch");
        }
        Ok(())
    }

    fn complete_batch(&mut self) -> Result<(), CatchUpError<E>> {
        match self.before_batch_completed.as_mut() {
            Some(hook) => hook().map_err(CatchUpError::BeforeBatchCompleted),
            None => Ok(()),
        }
    }
}

impl<H, E> fmt::Debug for CatchUp<'_, H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatchUp")
            .field("batch_size", &self.batch_size)
            .field("has_before_batch_completed", &self.before_batch_completed.is_some())
            .finish_non_exhaustive()
    }
}
