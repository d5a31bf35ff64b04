//! Error handling for the analytics engine.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants are
//! chosen so that callers can tell "could not compute" apart from "nothing to
//! report": an empty registry is never an error, and a failed registry read is
//! never turned into a zero-filled report.

use crate::models::types::Role;

/// Boxed source error carried by registry failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the analytics engine
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// A restricted role reached the engine without an assigned purok
    #[error("Invalid scope configuration: role '{role}' requires an assigned purok")]
    InvalidScopeConfiguration {
        /// The role that was missing its zone assignment
        role: Role,
    },

    /// The identity layer handed over a role this engine does not know
    #[error("Unknown role: '{0}'")]
    UnknownRole(String),

    /// The registry store could not be queried
    #[error("Registry unavailable: {message}")]
    RegistryUnavailable {
        /// What was being read when the failure happened
        message: String,
        /// Underlying cause, if any
        #[source]
        source: Option<BoxError>,
    },

    /// The cache backend failed; absorbed by `ReportCache`
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// A trend was requested over zero months
    #[error("Invalid trend window: {0} months (must be at least 1)")]
    InvalidTrendWindow(u32),

    /// Malformed configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalyticsError {
    /// Create a registry error without an underlying cause
    pub fn registry_unavailable(message: impl Into<String>) -> Self {
        Self::RegistryUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Create a registry error wrapping the error that caused it
    pub fn registry_unavailable_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RegistryUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether retrying the same request may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RegistryUnavailable { .. })
    }
}

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;
