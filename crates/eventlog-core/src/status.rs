//! Setup and health-check surfaces of storage backends.

use serde::{Deserialize, Serialize};

/// Outcome category of a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusType {
    /// The backend is usable.
    Ok,
    /// The backend is unreachable or broken.
    Error,
    /// The backend is reachable but its resources have not been created.
    SetupRequired,
}

/// Result of a health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Outcome category.
    #[serde(rename = "status")]
    pub status_type: StatusType,
    /// Human-readable explanation; empty when healthy.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

impl Status {
    /// A healthy backend.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status_type: StatusType::Ok,
            details: String::new(),
        }
    }

    /// A broken backend.
    #[must_use]
    pub fn error(details: impl Into<String>) -> Self {
        Self {
            status_type: StatusType::Error,
            details: details.into(),
        }
    }

    /// A backend whose resources still need to be created.
    #[must_use]
    pub fn setup_required(details: impl Into<String>) -> Self {
        Self {
            status_type: StatusType::SetupRequired,
            details: details.into(),
        }
    }

    /// Returns `true` for [`StatusType::Ok`].
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status_type == StatusType::Ok
    }
}

/// Messages describing what an idempotent setup run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupResult {
    /// One entry per action taken, or an explanation that nothing was needed.
    pub messages: Vec<String>,
}

impl SetupResult {
    /// A result with a single message.
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }
}

/// Backends that can create their own resources.
pub trait ProvidesSetup {
    /// Failure raised while creating resources.
    type Error;

    /// Creates missing resources. Running it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if its resources cannot be created.
    fn setup(&self) -> Result<SetupResult, Self::Error>;
}

/// Backends that can report their health.
pub trait ProvidesStatus {
    /// Checks the backend.
    fn status(&self) -> Status;
}
