//! Event payload and metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// The serialized payload of an event, usually JSON.
///
/// The log treats it as opaque text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventData(String);

impl EventData {
    /// Wraps a serialized payload.
    #[must_use]
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the serialized payload.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Arbitrary string-keyed metadata attached to an event, serialized as a
/// JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct EventMetadata(Map<String, Value>);

impl EventMetadata {
    /// Empty metadata.
    #[must_use]
    pub fn none() -> Self {
        Self(Map::new())
    }

    /// Wraps an existing JSON object.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Converts a JSON value into metadata.
    ///
    /// Objects are accepted as they are and an empty array counts as empty
    /// metadata (the encoding some serializers produce for an empty map).
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidMetadata` for any other JSON shape.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Array(items) if items.is_empty() => Ok(Self::none()),
            Value::Array(_) => Err(ValidationError::InvalidMetadata(
                "metadata has to be a map with string keys, given a list".to_owned(),
            )),
            other => Err(ValidationError::InvalidMetadata(format!(
                "metadata has to be encoded as an object, given: {other}"
            ))),
        }
    }

    /// Decodes metadata from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidMetadata` if `json` is not valid JSON
    /// or not object-shaped (see [`Self::from_value`]).
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(json).map_err(|e| {
            ValidationError::InvalidMetadata(format!("failed to decode metadata from JSON: {e}"))
        })?;
        Self::from_value(value)
    }

    /// Encodes the metadata as a JSON object string.
    #[must_use]
    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// Returns `true` if `key` is present, even with a `null` value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if no key is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Value> for EventMetadata {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<EventMetadata> for Value {
    fn from(metadata: EventMetadata) -> Self {
        Value::Object(metadata.0)
    }
}
