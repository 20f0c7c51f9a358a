//! Value objects and the event model.

mod event;
mod expected_version;
mod ids;
mod payload;
mod position;

pub use event::{Event, EventEnvelope, Events};
pub use expected_version::ExpectedVersion;
pub use ids::{CausationId, CorrelationId, EventId, EventType, EventTypes, StreamName};
pub use payload::{EventData, EventMetadata};
pub use position::{SequenceNumber, Version};
