//! Client interfaces for the external services the handlers talk to.
//!
//! Each is implemented over the AWS SDK by `smb-sync-aws`, and by in-memory
//! fakes in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use smb_sync_common::{JobId, RunId};

use crate::error::ServiceError;
use crate::types::{Notification, ObjectMetadata, PathFilter, RunStatus};

/// Transfer-job control operations.
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Start a run of `job`, optionally restricted to `filter`.
    async fn start_run(
        &self,
        job: &JobId,
        filter: Option<&PathFilter>,
    ) -> Result<RunId, ServiceError>;

    /// Fetch the status record of `run`.
    async fn describe_run(&self, run: &RunId) -> Result<RunStatus, ServiceError>;

    /// Resolve a location identifier to its URI (e.g. `s3://bucket/prefix/`).
    async fn describe_location(&self, location_arn: &str) -> Result<String, ServiceError>;
}

/// Structured log queries.
#[async_trait]
pub trait LogClient: Send + Sync {
    /// Return every line of `stream` in `group` matching `pattern`,
    /// following pagination to the end.
    async fn filter_lines(
        &self,
        group: &str,
        stream: &str,
        pattern: &str,
    ) -> Result<Vec<String>, ServiceError>;
}

/// Object metadata operations on the destination bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an object's metadata. Returns None if the object doesn't exist.
    async fn head_metadata(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectMetadata>, ServiceError>;

    /// Replace an object's user metadata by copying it onto itself.
    async fn replace_metadata(
        &self,
        bucket: &str,
        key: &str,
        metadata: &HashMap<String, String>,
        storage_class: &str,
    ) -> Result<(), ServiceError>;
}

/// Notification publish channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish `notification` to `topic_arn`.
    async fn publish(&self, topic_arn: &str, notification: &Notification)
        -> Result<(), ServiceError>;
}
