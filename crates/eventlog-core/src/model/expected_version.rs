//! Optimistic concurrency preconditions for commits.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{EventStoreError, ValidationError};
use crate::model::ids::StreamName;
use crate::model::position::Version;

/// The state a writer expects a stream to be in when committing to it.
///
/// An [`ExpectedVersion::Exact`] precondition never matches an empty stream:
/// the first commit to a stream has to use [`ExpectedVersion::NoStream`] or
/// [`ExpectedVersion::Any`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "i64")]
pub enum ExpectedVersion {
    /// No precondition.
    Any,
    /// The stream must not contain any event.
    NoStream,
    /// The stream must contain at least one event.
    StreamExists,
    /// The last event of the stream must have exactly this version.
    Exact(Version),
}

impl ExpectedVersion {
    const ANY: i64 = -2;
    const NO_STREAM: i64 = -1;
    const STREAM_EXISTS: i64 = -4;

    /// Expects the stream's last event to have `version`.
    #[must_use]
    pub const fn from_version(version: Version) -> Self {
        Self::Exact(version)
    }

    /// Expects [`Self::NoStream`] for `None`, the exact version otherwise.
    ///
    /// Handy for writers that just read the stream's current version.
    #[must_use]
    pub const fn from_current(current: Option<Version>) -> Self {
        match current {
            Some(version) => Self::Exact(version),
            None => Self::NoStream,
        }
    }

    /// Returns `true` if a stream whose last event has version `current`
    /// satisfies this precondition.
    #[must_use]
    pub fn is_satisfied_by(self, current: Option<Version>) -> bool {
        match self {
            Self::Any => true,
            Self::NoStream => current.is_none(),
            Self::StreamExists => current.is_some(),
            Self::Exact(version) => current == Some(version),
        }
    }

    /// Checks this precondition against the current state of `stream_name`.
    ///
    /// # Errors
    ///
    /// Returns `EventStoreError::Concurrency` if the precondition fails.
    pub fn verify(
        self,
        stream_name: &StreamName,
        current: Option<Version>,
    ) -> Result<(), EventStoreError> {
        if self.is_satisfied_by(current) {
            return Ok(());
        }
        Err(EventStoreError::Concurrency {
            stream_name: stream_name.clone(),
            expected: self,
            actual: current,
        })
    }

    /// Integer encoding for storage backends: `-2` any, `-1` no stream,
    /// `-4` stream exists, the version value otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnencodableVersion`] for an exact version
    /// above `i64::MAX`.
    pub fn to_i64(self) -> Result<i64, ValidationError> {
        match self {
            Self::Any => Ok(Self::ANY),
            Self::NoStream => Ok(Self::NO_STREAM),
            Self::StreamExists => Ok(Self::STREAM_EXISTS),
            Self::Exact(version) => i64::try_from(version.value())
                .map_err(|_| ValidationError::UnencodableVersion(version.value())),
        }
    }
}

impl TryFrom<i64> for ExpectedVersion {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            Self::ANY => Ok(Self::Any),
            Self::NO_STREAM => Ok(Self::NoStream),
            Self::STREAM_EXISTS => Ok(Self::StreamExists),
            _ => u64::try_from(value)
                .map(|v| Self::Exact(Version::from_u64(v)))
                .map_err(|_| ValidationError::InvalidExpectedVersion(value)),
        }
    }
}

impl TryFrom<ExpectedVersion> for i64 {
    type Error = ValidationError;

    fn try_from(value: ExpectedVersion) -> Result<Self, Self::Error> {
        value.to_i64()
    }
}

impl Serialize for ExpectedVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = self.to_i64().map_err(serde::ser::Error::custom)?;
        serializer.serialize_i64(encoded)
    }
}

impl fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("ANY"),
            Self::NoStream => f.write_str("NO_STREAM"),
            Self::StreamExists => f.write_str("STREAM_EXISTS"),
            Self::Exact(version) => write!(f, "{version}"),
        }
    }
}
