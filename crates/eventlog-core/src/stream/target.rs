//! What a store can load: a single stream or a virtual stream.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{CorrelationId, EventEnvelope, StreamName};

/// The kind of a [`VirtualStreamName`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirtualStreamType {
    /// Every event of the log.
    All,
    /// Events of all streams whose name starts with a prefix.
    Category,
    /// Events carrying a correlation id.
    #[serde(rename = "correlation")]
    CorrelationId,
}

impl VirtualStreamType {
    /// Stable string tag of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Category => "category",
            Self::CorrelationId => "correlation",
        }
    }
}

/// A read-only view spanning several streams.
///
/// Virtual streams can be loaded but never committed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VirtualStreamName {
    /// The kind of view.
    pub stream_type: VirtualStreamType,
    /// Category prefix or correlation id; empty for [`VirtualStreamType::All`].
    pub value: String,
}

impl VirtualStreamName {
    /// All events of the log.
    #[must_use]
    pub fn all() -> Self {
        Self {
            stream_type: VirtualStreamType::All,
            value: String::new(),
        }
    }

    /// Events of all streams whose name starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Empty` if `prefix` is empty; use
    /// [`Self::all`] to read every stream.
    pub fn for_category(prefix: &str) -> Result<Self, ValidationError> {
        if prefix.is_empty() {
            return Err(ValidationError::Empty { field: "category" });
        }
        Ok(Self {
            stream_type: VirtualStreamType::Category,
            value: prefix.to_owned(),
        })
    }

    /// Events whose correlation id equals `correlation_id`.
    #[must_use]
    pub fn for_correlation_id(correlation_id: &CorrelationId) -> Self {
        Self {
            stream_type: VirtualStreamType::CorrelationId,
            value: correlation_id.as_str().to_owned(),
        }
    }

    /// Returns `true` if `envelope` belongs to this view.
    #[must_use]
    pub fn matches(&self, envelope: &EventEnvelope) -> bool {
        match self.stream_type {
            VirtualStreamType::All => true,
            VirtualStreamType::Category => envelope.stream_name.as_str().starts_with(&self.value),
            VirtualStreamType::CorrelationId => envelope
                .event
                .correlation_id
                .as_ref()
                .is_some_and(|id| id.as_str() == self.value),
        }
    }
}

/// The target of a load: a concrete stream or a virtual one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamTarget {
    /// A single writable stream.
    Stream(StreamName),
    /// A read-only view spanning several streams.
    Virtual(VirtualStreamName),
}

impl StreamTarget {
    /// Targets every event of the log.
    #[must_use]
    pub fn all() -> Self {
        Self::Virtual(VirtualStreamName::all())
    }

    /// Returns `true` if `envelope` belongs to this target.
    #[must_use]
    pub fn matches(&self, envelope: &EventEnvelope) -> bool {
        match self {
            Self::Stream(stream_name) => &envelope.stream_name == stream_name,
            Self::Virtual(virtual_stream_name) => virtual_stream_name.matches(envelope),
        }
    }
}

impl From<StreamName> for StreamTarget {
    fn from(stream_name: StreamName) -> Self {
        Self::Stream(stream_name)
    }
}

impl From<&StreamName> for StreamTarget {
    fn from(stream_name: &StreamName) -> Self {
        Self::Stream(stream_name.clone())
    }
}

impl From<VirtualStreamName> for StreamTarget {
    fn from(virtual_stream_name: VirtualStreamName) -> Self {
        Self::Virtual(virtual_stream_name)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::{Event, EventData, EventId, EventType, SequenceNumber, Version};

    fn envelope_in(stream: &str, correlation_id: Option<&str>) -> EventEnvelope {
        let mut event = Event::new(
            EventId::create(),
            EventType::from_string("SomeEventType").unwrap(),
            EventData::from_string("a"),
        );
        if let Some(id) = correlation_id {
            event = event.with_correlation_id(CorrelationId::from_string(id).unwrap());
        }
        EventEnvelope {
            event,
            stream_name: StreamName::from_string(stream).unwrap(),
            version: Version::first(),
            sequence_number: SequenceNumber::from_u64(1),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_stream_target_matches_exact_stream_name() {
        let target = StreamTarget::from(StreamName::from_string("customer-1").unwrap());

        assert!(target.matches(&envelope_in("customer-1", None)));
        assert!(!target.matches(&envelope_in("customer-12", None)));
    }

    #[test]
    fn test_all_matches_everything() {
        assert!(StreamTarget::all().matches(&envelope_in("anything", None)));
    }

    #[test]
    fn test_category_matches_by_prefix() {
        let category = VirtualStreamName::for_category("customer-").unwrap();

        assert!(category.matches(&envelope_in("customer-1", None)));
        assert!(category.matches(&envelope_in("customer-2", None)));
        assert!(!category.matches(&envelope_in("order-1", None)));
    }

    #[test]
    fn test_category_rejects_empty_prefix() {
        assert!(VirtualStreamName::for_category("").is_err());
    }

    #[test]
    fn test_correlation_id_matches_event_field() {
        let view =
            VirtualStreamName::for_correlation_id(&CorrelationId::from_string("request-1").unwrap());

        assert!(view.matches(&envelope_in("a", Some("request-1"))));
        assert!(!view.matches(&envelope_in("a", Some("request-2"))));
        assert!(!view.matches(&envelope_in("a", None)));
    }

    #[test]
    fn test_virtual_stream_type_tags() {
        assert_eq!(VirtualStreamType::All.as_str(), "all");
        assert_eq!(VirtualStreamType::Category.as_str(), "category");
        assert_eq!(VirtualStreamType::CorrelationId.as_str(), "correlation");
        assert_eq!(
            serde_json::to_string(&VirtualStreamType::CorrelationId).unwrap(),
            "\"correlation\""
        );
    }
}
