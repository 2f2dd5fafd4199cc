//! Error types for the Rollcall attendance engine.
//!
//! Expected session-domain branches (unknown session, unauthorized actor,
//! out-of-range check-in, duplicate check-in) are modelled as outcome enums
//! and never travel through this type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Rollcall workspace.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RollcallError {
    /// The location provider could not produce a coordinate
    #[error("Location error: {0}")]
    Location(String),

    /// The directory could not resolve a participant
    #[error("Directory error: {0}")]
    Directory(String),

    /// A notification could not be delivered
    #[error("Notification error: {0}")]
    Notification(String),

    /// A collaborator call exceeded the configured timeout
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    /// Caller supplied an invalid argument (e.g. a non-positive radius)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RollcallError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Location error
    pub fn location(message: impl Into<String>) -> Self {
        Self::Location(message.into())
    }

    /// Creates a Directory error
    pub fn directory(message: impl Into<String>) -> Self {
        Self::Directory(message.into())
    }

    /// Creates a Notification error
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification(message.into())
    }

    /// Creates a Timeout error
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true for failures raised by an external collaborator
    /// (location, directory, notifier), including timeouts.
    ///
    /// These are isolated per participant and never abort a fan-out.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::Location(_) | Self::Directory(_) | Self::Notification(_) | Self::Timeout { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RollcallError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RollcallError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RollcallError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, RollcallError>`.
pub type Result<T> = std::result::Result<T, RollcallError>;
