//! Restricts which events a store returns from a load.

use crate::model::{EventEnvelope, EventTypes};

/// Immutable filter applied by [`EventStore::load`](crate::store::EventStore::load).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStreamFilter {
    /// Only events of one of these types pass; `None` lets every type pass.
    pub event_types: Option<EventTypes>,
}

impl EventStreamFilter {
    /// A filter letting every event pass.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A filter letting only the given event types pass.
    #[must_use]
    pub fn for_event_types(event_types: EventTypes) -> Self {
        Self {
            event_types: Some(event_types),
        }
    }

    /// Returns `true` if `envelope` passes this filter.
    #[must_use]
    pub fn matches(&self, envelope: &EventEnvelope) -> bool {
        self.event_types
            .as_ref()
            .is_none_or(|types| types.contains(&envelope.event.event_type))
    }
}
