//! An [`EventStream`] whose items come from a caller-supplied function.

use std::fmt;
use std::sync::Arc;

use crate::model::SequenceNumber;
use crate::stream::{EventStream, StreamItem, StreamWindow};

type BoxedIter = Box<dyn Iterator<Item = StreamItem>>;
type Source = Arc<dyn Fn(StreamWindow) -> BoxedIter>;

/// Adapts a function to the [`EventStream`] interface.
///
/// The cursor only records its window. On iteration the function receives
/// that window verbatim and is responsible for honouring the bounds, the
/// limit, and the direction.
#[derive(Clone)]
pub struct ClosureEventStream {
    source: Source,
    window: StreamWindow,
}

impl ClosureEventStream {
    /// Wraps `source`.
    pub fn create<F, I>(source: F) -> Self
    where
        F: Fn(StreamWindow) -> I + 'static,
        I: IntoIterator<Item = StreamItem>,
        I::IntoIter: 'static,
    {
        Self {
            source: Arc::new(move |window| Box::new(source(window).into_iter()) as BoxedIter),
            window: StreamWindow::default(),
        }
    }

    fn with_window(&self, window: StreamWindow) -> Self {
        Self {
            source: Arc::clone(&self.source),
            window,
        }
    }
}

impl fmt::Debug for ClosureEventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureEventStream")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl EventStream for ClosureEventStream {
    type Iter = BoxedIter;

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
        (self.source)(self.window)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_passes_window_through_verbatim() {
        // Arrange
        let seen = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::clone(&seen);
        let stream = ClosureEventStream::create(move |window| {
            recorder.borrow_mut().push(window);
            Vec::new()
        });

        // Act
        let _ = stream
            .with_minimum_sequence_number(SequenceNumber::from_u64(3))
            .with_maximum_sequence_number(SequenceNumber::from_u64(6))
            .limit(2)
            .backwards()
            .iter()
            .count();

        // Assert
        let expected = StreamWindow {
            minimum_sequence_number: Some(SequenceNumber::from_u64(3)),
            maximum_sequence_number: Some(SequenceNumber::from_u64(6)),
            limit: Some(2),
            direction: crate::stream::Direction::Backward,
        };
        assert_eq!(*seen.borrow(), vec![expected]);
    }

    #[test]
    fn test_builders_do_not_call_the_source() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let stream = ClosureEventStream::create(move |_| {
            *counter.borrow_mut() += 1;
            Vec::new()
        });

        let narrowed = stream.limit(1).backwards();

        assert_eq!(*calls.borrow(), 0);
        assert_eq!(narrowed.iter().count(), 0);
        assert_eq!(*calls.borrow(), 1);
    }
}
