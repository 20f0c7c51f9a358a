//! Lazily iterated, immutable cursors over event envelopes.
//!
//! An [`EventStream`] is a description of what to read: a sequence number
//! window, an item limit, and a direction. Builder methods return new
//! cursors and never touch the underlying source; all work happens once
//! [`EventStream::iter`] is called.

mod batch;
mod closure;
mod filter;
mod in_memory;
mod target;

pub use batch::{BatchEventStream, BatchEventStreamIter, BatchSource};
pub use closure::ClosureEventStream;
pub use filter::EventStreamFilter;
pub use in_memory::{InMemoryEventStream, InMemoryEventStreamIter};
pub use target::{StreamTarget, VirtualStreamName, VirtualStreamType};

use crate::error::EventStoreError;
use crate::model::{EventEnvelope, SequenceNumber};

/// An item produced while iterating an [`EventStream`].
pub type StreamItem = Result<EventEnvelope, EventStoreError>;

/// Iteration order of an [`EventStream`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Ascending sequence numbers.
    #[default]
    Forward,
    /// Descending sequence numbers.
    Backward,
}

/// The parameters of an [`EventStream`] cursor.
///
/// Both bounds are inclusive. A window whose minimum exceeds its maximum is
/// empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StreamWindow {
    /// Lowest sequence number to yield.
    pub minimum_sequence_number: Option<SequenceNumber>,
    /// Highest sequence number to yield.
    pub maximum_sequence_number: Option<SequenceNumber>,
    /// Maximum number of items to yield.
    pub limit: Option<usize>,
    /// Iteration order.
    pub direction: Direction,
}

impl StreamWindow {
    /// Returns a copy with the given lower bound.
    #[must_use]
    pub const fn with_minimum_sequence_number(self, sequence_number: SequenceNumber) -> Self {
        Self {
            minimum_sequence_number: Some(sequence_number),
            ..self
        }
    }

    /// Returns a copy with the given upper bound.
    #[must_use]
    pub const fn with_maximum_sequence_number(self, sequence_number: SequenceNumber) -> Self {
        Self {
            maximum_sequence_number: Some(sequence_number),
            ..self
        }
    }

    /// Returns a copy with the given item limit.
    #[must_use]
    pub const fn with_limit(self, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    /// Returns a copy iterating in descending order.
    #[must_use]
    pub const fn backwards(self) -> Self {
        Self {
            direction: Direction::Backward,
            ..self
        }
    }

    /// Returns `true` when iterating in descending order.
    #[must_use]
    pub const fn is_backwards(&self) -> bool {
        matches!(self.direction, Direction::Backward)
    }

    /// Returns `true` if `sequence_number` lies within both bounds.
    #[must_use]
    pub fn contains(&self, sequence_number: SequenceNumber) -> bool {
        self.minimum_sequence_number
            .is_none_or(|minimum| sequence_number >= minimum)
            && self
                .maximum_sequence_number
                .is_none_or(|maximum| sequence_number <= maximum)
    }
}

/// An immutable, fluent cursor over event envelopes ordered by sequence
/// number.
///
/// Builder methods take `&self` and return a new cursor; the receiver is
/// left untouched. Cursors are cheap to clone.
pub trait EventStream: Clone {
    /// The iterator produced by [`EventStream::iter`].
    type Iter: Iterator<Item = StreamItem>;

    /// Returns the parameters of this cursor.
    fn window(&self) -> StreamWindow;

    /// Restricts the cursor to sequence numbers `>= sequence_number`.
    #[must_use]
    fn with_minimum_sequence_number(&self, sequence_number: SequenceNumber) -> Self;

    /// Restricts the cursor to sequence numbers `<= sequence_number`.
    #[must_use]
    fn with_maximum_sequence_number(&self, sequence_number: SequenceNumber) -> Self;

    /// Caps the number of yielded envelopes.
    #[must_use]
    fn limit(&self, limit: usize) -> Self;

    /// Iterates in descending sequence number order.
    #[must_use]
    fn backwards(&self) -> Self;

    /// Starts iterating.
    ///
    /// Errors of the underlying source are yielded as `Err` items; consumers
    /// should stop at the first one.
    fn iter(&self) -> Self::Iter;
}
