//! Shared error types used across smb-sync crates.

use thiserror::Error;

/// Errors raised while reading handler configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set (or is empty).
    #[error("Missing required configuration variable {key}")]
    Missing {
        /// Name of the variable.
        key: String,
    },

    /// A variable is set but cannot be interpreted.
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Name of the variable.
        key: String,
        /// The raw value found.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create a Missing error for `key`.
    pub fn missing(key: impl Into<String>) -> Self {
        Self::Missing { key: key.into() }
    }

    /// Create an Invalid error.
    ///
    /// # Arguments
    /// * `key` - Variable name
    /// * `value` - Raw value that was rejected
    /// * `reason` - Human-readable reason
    pub fn invalid(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while parsing ARNs and location URIs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Not a task-execution ARN.
    #[error("Not a task execution ARN: {arn}")]
    InvalidRunArn {
        /// The rejected value.
        arn: String,
    },

    /// Not a task ARN.
    #[error("Not a task ARN: {arn}")]
    InvalidJobArn {
        /// The rejected value.
        arn: String,
    },

    /// Location URI does not point into the expected bucket.
    #[error("Location URI {uri} is not inside bucket {bucket}")]
    LocationOutsideBucket {
        /// The location URI.
        uri: String,
        /// The configured destination bucket.
        bucket: String,
    },
}
