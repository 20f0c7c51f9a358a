//! An [`EventStream`] over a snapshot of envelopes held in memory.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::model::{EventEnvelope, SequenceNumber};
use crate::stream::{EventStream, StreamItem, StreamWindow};

/// A cursor over an immutable, shared slice of envelopes.
///
/// The envelopes are sorted by sequence number on construction; cursors
/// derived with the builder methods share the same slice.
#[derive(Clone)]
pub struct InMemoryEventStream {
    envelopes: Arc<[EventEnvelope]>,
    window: StreamWindow,
}

impl InMemoryEventStream {
    /// Creates a cursor over `envelopes`.
    pub fn new(envelopes: impl IntoIterator<Item = EventEnvelope>) -> Self {
        let mut envelopes: Vec<EventEnvelope> = envelopes.into_iter().collect();
        envelopes.sort_by_key(|envelope| envelope.sequence_number);
        Self {
            envelopes: envelopes.into(),
            window: StreamWindow::default(),
        }
    }

    /// An empty cursor.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    fn with_window(&self, window: StreamWindow) -> Self {
        Self {
            envelopes: Arc::clone(&self.envelopes),
            window,
        }
    }

    fn bounds(&self) -> Range<usize> {
        let start = self.window.minimum_sequence_number.map_or(0, |minimum| {
            self.envelopes
                .partition_point(|envelope| envelope.sequence_number < minimum)
        });
        let end = self
            .window
            .maximum_sequence_number
            .map_or(self.envelopes.len(), |maximum| {
                self.envelopes
                    .partition_point(|envelope| envelope.sequence_number <= maximum)
            });
        // An inverted window yields nothing.
        start..end.max(start)
    }
}

impl fmt::Debug for InMemoryEventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryEventStream")
            .field("len", &self.envelopes.len())
            .field("window", &self.window)
            .finish()
    }
}

impl EventStream for InMemoryEventStream {
    type Iter = InMemoryEventStreamIter;

    fn window(&self) -> StreamWindow {
        self.window
    }

    fn with_minimum_sequence_number(&self, sequence_number: SequenceNumber) -> Self {
        self.with_window(self.window.with_minimum_sequence_number(sequence_number))
    }

    fn with_maximum_sequence_number(&self, sequence_number: SequenceNumber) -> Self {
        self.with_window(self.window.with_maximum_sequence_number(sequence_number))
    }

    fn limit(&self, limit: usize) -> Self {
        self.with_window(self.window.with_limit(limit))
    }

    fn backwards(&self) -> Self {
        self.with_window(self.window.backwards())
    }

    fn iter(&self) -> Self::Iter {
        InMemoryEventStreamIter {
            envelopes: Arc::clone(&self.envelopes),
            range: self.bounds(),
            remaining: self.window.limit,
            backwards: self.window.is_backwards(),
        }
    }
}

/// Iterator of an [`InMemoryEventStream`].
#[derive(Debug)]
pub struct InMemoryEventStreamIter {
    envelopes: Arc<[EventEnvelope]>,
    range: Range<usize>,
    remaining: Option<usize>,
    backwards: bool,
}

impl Iterator for InMemoryEventStreamIter {
    type Item = StreamItem;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        let index = if self.backwards {
            self.range.next_back()?
        } else {
            self.range.next()?
        };
        self.envelopes.get(index).cloned().map(Ok)
    }
}
