//! Pagination over an [`EventStream`] with bounded fetches.

use std::num::NonZeroUsize;

use tracing::trace;

use crate::model::SequenceNumber;
use crate::stream::{
    ClosureEventStream, EventStream, InMemoryEventStream, StreamItem, StreamWindow,
};

/// A stream [`BatchEventStream::create`] can paginate.
///
/// Splits into the source pages are fetched from and the window the
/// paginated stream starts with. A [`BatchEventStream`] hands over its own
/// inner source, so batching never nests.
pub trait BatchSource {
    type Source: EventStream;

    fn into_batch_source(self) -> (Self::Source, StreamWindow);
}

impl BatchSource for InMemoryEventStream {
    type Source = Self;

    fn into_batch_source(self) -> (Self, StreamWindow) {
        let window = self.window();
        (self, window)
    }
}

impl BatchSource for ClosureEventStream {
    type Source = Self;

    fn into_batch_source(self) -> (Self, StreamWindow) {
        let window = self.window();
        (self, window)
    }
}

impl<S: EventStream> BatchSource for BatchEventStream<S> {
    type Source = S;

    fn into_batch_source(self) -> (S, StreamWindow) {
        (self.source, self.window)
    }
}

/// Iterates an arbitrarily large stream while fetching at most `batch_size`
/// items from the inner source at a time.
///
/// Externally it behaves like any other [`EventStream`]: the same bounds,
/// limit, and direction yield the same items as the inner source would.
#[derive(Debug, Clone)]
pub struct BatchEventStream<S> {
    source: S,
    batch_size: NonZeroUsize,
    window: StreamWindow,
}

impl<S: EventStream> BatchEventStream<S> {
    /// Paginates `source`, taking over its window. Passing a
    /// `BatchEventStream` replaces its batch size.
    pub fn create(source: impl BatchSource<Source = S>, batch_size: NonZeroUsize) -> Self {
        let (source, window) = source.into_batch_source();
        Self {
            source,
            batch_size,
            window,
        }
    }

    /// Returns a copy with a different batch size over the same inner source.
    #[must_use]
    pub fn rebatch(&self, batch_size: NonZeroUsize) -> Self {
        Self::create(self.clone(), batch_size)
    }

    /// Maximum number of items fetched from the inner source at once.
    #[must_use]
    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    fn with_window(&self, window: StreamWindow) -> Self {
        Self {
            source: self.source.clone(),
            batch_size: self.batch_size,
            window,
        }
    }

    /// The inner source narrowed to this wrapper's bounds and direction.
    fn bounded_source(&self) -> S {
        let mut source = self.source.clone();
        if let Some(minimum) = self.window.minimum_sequence_number {
            source = source.with_minimum_sequence_number(minimum);
        }
        if let Some(maximum) = self.window.maximum_sequence_number {
            source = source.with_maximum_sequence_number(maximum);
        }
        if self.window.is_backwards() {
            source = source.backwards();
        }
        source
    }
}

impl<S: EventStream> EventStream for BatchEventStream<S> {
    type Iter = BatchEventStreamIter<S>;

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
        BatchEventStreamIter {
            source: self.bounded_source(),
            batch_size: self.batch_size.get(),
            page: None,
            last_in_page: None,
            remaining: self.window.limit,
            backwards: self.window.is_backwards(),
            finished: false,
        }
    }
}

/// Iterator of a [`BatchEventStream`].
pub struct BatchEventStreamIter<S: EventStream> {
    source: S,
    batch_size: usize,
    page: Option<S::Iter>,
    last_in_page: Option<SequenceNumber>,
    remaining: Option<usize>,
    backwards: bool,
    finished: bool,
}

impl<S: EventStream> BatchEventStreamIter<S> {
    /// Moves the inner window strictly past the last item of the exhausted
    /// page. Returns `false` when there is nothing left to fetch.
    fn advance_page(&mut self) -> bool {
        let Some(last) = self.last_in_page.take() else {
            return false;
        };
        if self.backwards {
            match last.previous() {
                Some(previous) if !previous.is_none() => {
                    self.source = self.source.with_maximum_sequence_number(previous);
                    true
                }
                _ => false,
            }
        } else {
            self.source = self.source.with_minimum_sequence_number(last.next());
            true
        }
    }
}

impl<S: EventStream> Iterator for BatchEventStreamIter<S> {
    type Item = StreamItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished || self.remaining == Some(0) {
                self.finished = true;
                return None;
            }

            let page = self.page.get_or_insert_with(|| {
                trace!(
                    batch_size = self.batch_size,
                    window = ?self.source.window(),
                    "fetching page"
                );
                self.source.limit(self.batch_size).iter()
            });

            match page.next() {
                Some(Ok(envelope)) => {
                    self.last_in_page = Some(envelope.sequence_number);
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    return Some(Ok(envelope));
                }
                Some(Err(error)) => {
                    self.finished = true;
                    return Some(Err(error));
                }
                None => {
                    self.page = None;
                    if !self.advance_page() {
                        self.finished = true;
                        return None;
                    }
                }
            }
        }
    }
}
