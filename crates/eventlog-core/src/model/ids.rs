//! Identifier value objects: event ids, event types, stream names, and
//! correlation/causation ids.
//!
//! Every type here is constructed through a validating `from_string`
//! constructor; there are no partially valid instances.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Checks the shared "non-empty, bounded, ASCII-only" rule.
fn validate_bounded_ascii(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let length = value.chars().count();
    if length > max {
        return Err(ValidationError::TooLong {
            field,
            max,
            actual: length,
        });
    }
    if !value.is_ascii() {
        return Err(ValidationError::NonAscii {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

fn validate_max_length(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if length > max {
        return Err(ValidationError::TooLong {
            field,
            max,
            actual: length,
        });
    }
    Ok(())
}

/// Globally unique id of an event in canonical UUID form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    /// Maximum length of the canonical form.
    pub const MAX_LENGTH: usize = 36;

    /// Length of a UUID written without dashes.
    const SIMPLE_LENGTH: usize = 32;

    /// Creates a new random (v4) event id.
    #[must_use]
    pub fn create() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Parses an event id.
    ///
    /// A UUID written without dashes is accepted and normalized to its dashed
    /// form; the input is otherwise kept as given.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the value is empty or not a UUID.
    pub fn from_string(value: &str) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Empty { field: "event id" });
        }
        let invalid = || ValidationError::InvalidEventId(value.to_owned());
        match value.len() {
            Self::MAX_LENGTH => {
                Uuid::try_parse(value).map_err(|_| invalid())?;
                Ok(Self(value.to_owned()))
            }
            Self::SIMPLE_LENGTH => {
                // Only hex digits pass the parse, so slicing by byte is safe.
                Uuid::try_parse(value).map_err(|_| invalid())?;
                Ok(Self(format!(
                    "{}-{}-{}-{}-{}",
                    &value[0..8],
                    &value[8..12],
                    &value[12..16],
                    &value[16..20],
                    &value[20..32]
                )))
            }
            _ => Err(invalid()),
        }
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EventId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl TryFrom<String> for EventId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<EventId> for String {
    fn from(value: EventId) -> Self {
        value.0
    }
}

/// The type of an event, for example `CustomerHasSignedUp`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventType(String);

impl EventType {
    /// Maximum number of characters.
    pub const MAX_LENGTH: usize = 100;

    /// Parses an event type.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the value is empty, longer than
    /// [`Self::MAX_LENGTH`], or contains non-ASCII characters.
    pub fn from_string(value: &str) -> Result<Self, ValidationError> {
        validate_bounded_ascii("event type", value, Self::MAX_LENGTH)?;
        Ok(Self(value.to_owned()))
    }

    /// Returns the string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EventType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.0
    }
}

/// A non-empty set of event types, used to filter streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTypes(Vec<EventType>);

impl EventTypes {
    /// Creates a set from the given types.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyEventTypes` if no type was given.
    pub fn create(types: impl IntoIterator<Item = EventType>) -> Result<Self, ValidationError> {
        let types: Vec<EventType> = types.into_iter().collect();
        if types.is_empty() {
            return Err(ValidationError::EmptyEventTypes);
        }
        Ok(Self(types))
    }

    /// Creates a set containing a single type.
    #[must_use]
    pub fn single(event_type: EventType) -> Self {
        Self(vec![event_type])
    }

    /// Returns `true` if `event_type` is a member of this set.
    #[must_use]
    pub fn contains(&self, event_type: &EventType) -> bool {
        self.0.iter().any(|member| member == event_type)
    }

    /// Iterates over the members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, EventType> {
        self.0.iter()
    }

    /// Returns the members as plain strings.
    #[must_use]
    pub fn to_string_vec(&self) -> Vec<String> {
        self.0.iter().map(|t| t.as_str().to_owned()).collect()
    }
}

impl<'a> IntoIterator for &'a EventTypes {
    type Item = &'a EventType;
    type IntoIter = std::slice::Iter<'a, EventType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The name of a writable stream, i.e. a partition of the log.
///
/// Compared by value. See
/// [`VirtualStreamName`](crate::stream::VirtualStreamName) for read-only
/// views spanning several streams.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamName(String);

impl StreamName {
    /// Maximum number of characters.
    pub const MAX_LENGTH: usize = 100;

    /// Parses a stream name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the value is empty, longer than
    /// [`Self::MAX_LENGTH`], or contains non-ASCII characters.
    pub fn from_string(value: &str) -> Result<Self, ValidationError> {
        validate_bounded_ascii("stream name", value, Self::MAX_LENGTH)?;
        Ok(Self(value.to_owned()))
    }

    /// Returns the string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StreamName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl TryFrom<String> for StreamName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<StreamName> for String {
    fn from(value: StreamName) -> Self {
        value.0
    }
}

/// Points to the cause of an event: another event's id or a domain concept
/// such as a command id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CausationId(String);

impl CausationId {
    /// Maximum number of characters.
    pub const MAX_LENGTH: usize = 40;

    /// Parses a causation id.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::TooLong` if the value exceeds
    /// [`Self::MAX_LENGTH`].
    pub fn from_string(value: &str) -> Result<Self, ValidationError> {
        validate_max_length("causation id", value, Self::MAX_LENGTH)?;
        Ok(Self(value.to_owned()))
    }

    /// Returns the string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CausationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CausationId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<CausationId> for String {
    fn from(value: CausationId) -> Self {
        value.0
    }
}

/// Correlates events, e.g. all events caused by one request.
///
/// Events can be loaded by correlation id through
/// [`VirtualStreamName::for_correlation_id`](crate::stream::VirtualStreamName::for_correlation_id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Maximum number of characters.
    pub const MAX_LENGTH: usize = 40;

    /// Parses a correlation id.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::TooLong` if the value exceeds
    /// [`Self::MAX_LENGTH`].
    pub fn from_string(value: &str) -> Result<Self, ValidationError> {
        validate_max_length("correlation id", value, Self::MAX_LENGTH)?;
        Ok(Self(value.to_owned()))
    }

    /// Returns the string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CorrelationId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<CorrelationId> for String {
    fn from(value: CorrelationId) -> Self {
        value.0
    }
}
