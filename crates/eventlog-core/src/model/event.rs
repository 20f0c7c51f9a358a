//! Events as written by callers and as read back from a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::ids::{CausationId, CorrelationId, EventId, EventType, StreamName};
use crate::model::payload::{EventData, EventMetadata};
use crate::model::position::{SequenceNumber, Version};

/// A single business fact, as written by the caller.
///
/// When read from a store, an event comes wrapped in an [`EventEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Globally unique event identifier.
    pub id: EventId,
    /// Type tag used for routing and filtering.
    pub event_type: EventType,
    /// Serialized payload.
    pub data: EventData,
    /// Arbitrary metadata.
    #[serde(default)]
    pub metadata: EventMetadata,
    /// The event or command that caused this event.
    #[serde(default)]
    pub causation_id: Option<CausationId>,
    /// Correlates this event with others.
    #[serde(default)]
    pub correlation_id: Option<CorrelationId>,
}

impl Event {
    /// Creates an event without metadata, causation, or correlation.
    #[must_use]
    pub fn new(id: EventId, event_type: EventType, data: EventData) -> Self {
        Self {
            id,
            event_type,
            data,
            metadata: EventMetadata::none(),
            causation_id: None,
            correlation_id: None,
        }
    }

    /// Returns a copy carrying `metadata`.
    #[must_use]
    pub fn with_metadata(self, metadata: EventMetadata) -> Self {
        Self { metadata, ..self }
    }

    /// Returns a copy carrying `causation_id`.
    #[must_use]
    pub fn with_causation_id(self, causation_id: CausationId) -> Self {
        Self {
            causation_id: Some(causation_id),
            ..self
        }
    }

    /// Returns a copy carrying `correlation_id`.
    #[must_use]
    pub fn with_correlation_id(self, correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id: Some(correlation_id),
            ..self
        }
    }
}

/// A non-empty, ordered batch of events committed atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct Events(Vec<Event>);

impl Events {
    /// A batch holding one event.
    #[must_use]
    pub fn single(event: Event) -> Self {
        Self(vec![event])
    }

    /// Creates a batch from the given events, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyEvents` if `events` is empty.
    pub fn from_vec(events: Vec<Event>) -> Result<Self, ValidationError> {
        if events.is_empty() {
            return Err(ValidationError::EmptyEvents);
        }
        Ok(Self(events))
    }

    /// Number of events in the batch, always at least one.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the events in commit order.
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.0.iter()
    }
}

impl TryFrom<Vec<Event>> for Events {
    type Error = ValidationError;

    fn try_from(events: Vec<Event>) -> Result<Self, Self::Error> {
        Self::from_vec(events)
    }
}

impl From<Event> for Events {
    fn from(event: Event) -> Self {
        Self::single(event)
    }
}

impl IntoIterator for Events {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Events {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An event together with its position in the log.
///
/// Envelopes are produced by stores at commit or load time and are never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// The event itself.
    pub event: Event,
    /// The stream the event is stored in.
    pub stream_name: StreamName,
    /// Position of the event within its stream.
    pub version: Version,
    /// Global position of the event in the log.
    pub sequence_number: SequenceNumber,
    /// Point in time the event was persisted at.
    pub recorded_at: DateTime<Utc>,
}
