//! Error types for handler operations.

use smb_sync_common::IdentifierError;
use thiserror::Error;

/// Errors returned by the external service clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Object not found in the destination bucket.
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The service rejected or failed the call.
    #[error("{service} error: {message}")]
    Api {
        service: &'static str,
        message: String,
        retryable: bool,
    },

    /// The service answered, but without a field the handlers depend on.
    #[error("Invalid {service} response: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
}

impl ServiceError {
    /// Create an Api error.
    pub fn api(service: &'static str, message: impl Into<String>, retryable: bool) -> Self {
        Self::Api {
            service,
            message: message.into(),
            retryable,
        }
    }

    /// Create an InvalidResponse error.
    pub fn invalid_response(service: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            message: message.into(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Api { retryable, .. } => *retryable,
            ServiceError::NotFound { .. } => false,
            ServiceError::InvalidResponse { .. } => false,
        }
    }
}

/// Errors returned by the handlers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The triggering event lacks what the handler needs.
    #[error("Invalid event: {message}")]
    InvalidEvent { message: String },
}

impl HandlerError {
    /// Create an InvalidEvent error.
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }
}
