//! Error types for AWS SDK calls.

use std::error::Error as StdError;
use std::fmt::Debug;

use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use smb_sync_pipeline::ServiceError;
use thiserror::Error;

/// Errors specific to the SDK-backed clients.
#[derive(Error, Debug)]
pub enum AwsError {
    /// The SDK call failed.
    #[error("{service} SDK error: {message}")]
    Sdk {
        service: &'static str,
        message: String,
        retryable: bool,
    },

    /// The call succeeded but a field the handlers need was absent.
    #[error("{service} response is missing {field}")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },
}

impl AwsError {
    /// Wrap an SDK error, keeping its full context chain in the message.
    ///
    /// Timeouts and dispatch failures are marked retryable.
    pub fn sdk<E, R>(service: &'static str, err: SdkError<E, R>) -> Self
    where
        E: StdError + Send + Sync + 'static,
        R: Debug + Send + Sync + 'static,
    {
        let retryable: bool = matches!(
            &err,
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_)
        );
        AwsError::Sdk {
            service,
            message: DisplayErrorContext(err).to_string(),
            retryable,
        }
    }
}

impl From<AwsError> for ServiceError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::Sdk {
                service,
                message,
                retryable,
            } => ServiceError::api(service, message, retryable),
            AwsError::MissingField { service, field } => {
                ServiceError::invalid_response(service, format!("missing {}", field))
            }
        }
    }
}
