//! Handler configuration read from environment variables.
//!
//! Each handler reads its variables once at cold start. Parsing is written
//! against a lookup function so it can be exercised without touching the
//! process environment.

use std::time::Duration;

use crate::constants::{DEFAULT_SETTLE_DELAY, DEFAULT_STORAGE_CLASS};
use crate::error::{ConfigError, IdentifierError};
use crate::ids::JobId;

pub const ENV_TASK_ARN: &str = "TASK_ARN";
pub const ENV_SYNC_ALL_FILES: &str = "SYNC_ALL_FILES";
pub const ENV_TOPIC_ARN: &str = "TOPIC_ARN";
pub const ENV_JOB_NAME: &str = "JOB_NAME";
pub const ENV_SOURCE_LOCATION_ARN: &str = "SOURCE_LOCATION_ARN";
pub const ENV_DEST_BUCKET: &str = "DEST_BUCKET";
pub const ENV_DEST_LOCATION_ARN: &str = "DEST_LOCATION_ARN";
pub const ENV_SMB_FILE_OWNER: &str = "SMB_FILE_OWNER";
pub const ENV_SMB_FILE_GROUP: &str = "SMB_FILE_GROUP";
pub const ENV_SMB_FILE_PERMISSIONS: &str = "SMB_FILE_PERMISSIONS";
pub const ENV_SMB_FILE_ACL: &str = "SMB_FILE_ACL";
pub const ENV_LOG_GROUP_NAME: &str = "LOG_GROUP_NAME";
pub const ENV_SETTLE_DELAY_SECONDS: &str = "SETTLE_DELAY_SECONDS";
pub const ENV_STORAGE_CLASS: &str = "STORAGE_CLASS";

/// Set by the Lambda runtime for every function.
pub const ENV_LAMBDA_LOG_GROUP: &str = "AWS_LAMBDA_LOG_GROUP_NAME";
/// Set by the Lambda runtime for every function.
pub const ENV_LAMBDA_LOG_STREAM: &str = "AWS_LAMBDA_LOG_STREAM_NAME";

/// Reads configuration values by name.
///
/// Blanket-implemented for closures so tests can pass a map lookup.
pub trait ConfigSource {
    /// Return the raw value of `key`, if set.
    fn get(&self, key: &str) -> Option<String>;
}

impl<F> ConfigSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// The process environment.
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

fn required(source: &impl ConfigSource, key: &str) -> Result<String, ConfigError> {
    match source.get(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::missing(key)),
    }
}

fn optional(source: &impl ConfigSource, key: &str) -> Option<String> {
    source
        .get(key)
        .map(|v: String| v.trim().to_string())
        .filter(|v: &String| !v.is_empty())
}

fn job_id(source: &impl ConfigSource) -> Result<JobId, ConfigError> {
    let arn: String = required(source, ENV_TASK_ARN)?;
    JobId::parse(&arn).map_err(|e: IdentifierError| {
        ConfigError::invalid(ENV_TASK_ARN, arn.clone(), e.to_string())
    })
}

fn job_name(source: &impl ConfigSource, job: &JobId) -> String {
    optional(source, ENV_JOB_NAME).unwrap_or_else(|| job.task_id().to_string())
}

/// Parse a boolean flag. Unset or empty means `false`.
pub fn parse_flag(key: &str, raw: Option<&str>) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw, "expected true or false")),
    }
}

/// Configuration of the Task Trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    /// Transfer job to start.
    pub job: JobId,
    /// Start an unfiltered run instead of yesterday's folder.
    pub sync_all_files: bool,
}

impl TriggerConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    /// Read from an arbitrary source.
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            job: job_id(source)?,
            sync_all_files: parse_flag(
                ENV_SYNC_ALL_FILES,
                source.get(ENV_SYNC_ALL_FILES).as_deref(),
            )?,
        })
    }
}

/// Configuration of the Completion Notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Display name of the transfer job.
    pub job_name: String,
    /// Topic notifications are published to.
    pub topic_arn: String,
    /// Source location, reported in the message body when set.
    pub source_location_arn: Option<String>,
}

impl NotifierConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    /// Read from an arbitrary source.
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let job: JobId = job_id(source)?;
        Ok(Self {
            job_name: job_name(source, &job),
            topic_arn: required(source, ENV_TOPIC_ARN)?,
            source_location_arn: optional(source, ENV_SOURCE_LOCATION_ARN),
        })
    }
}

/// Fixed SMB-style attributes written onto every patched object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmbAttributes {
    pub owner: String,
    pub group: String,
    pub permissions: String,
    pub acl: String,
}

impl SmbAttributes {
    /// Read from an arbitrary source. All four values are required.
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            owner: required(source, ENV_SMB_FILE_OWNER)?,
            group: required(source, ENV_SMB_FILE_GROUP)?,
            permissions: required(source, ENV_SMB_FILE_PERMISSIONS)?,
            acl: required(source, ENV_SMB_FILE_ACL)?,
        })
    }
}

/// Where the running handler writes its own logs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandlerLogLocation {
    pub log_group: Option<String>,
    pub log_stream: Option<String>,
}

impl HandlerLogLocation {
    /// Read from an arbitrary source.
    pub fn from_source(source: &impl ConfigSource) -> Self {
        Self {
            log_group: optional(source, ENV_LAMBDA_LOG_GROUP),
            log_stream: optional(source, ENV_LAMBDA_LOG_STREAM),
        }
    }
}

/// Configuration of the Metadata Patcher.
#[derive(Debug, Clone, PartialEq)]
pub struct PatcherConfig {
    /// Display name of the transfer job.
    pub job_name: String,
    /// Topic failure notifications are published to.
    pub topic_arn: String,
    /// Destination bucket holding the transferred objects.
    pub bucket: String,
    /// Destination location, resolved to a key prefix per run.
    pub destination_location_arn: String,
    /// Log group the transfer service writes run logs to.
    pub log_group: String,
    /// Attributes written onto every object.
    pub attributes: SmbAttributes,
    /// Storage class applied while rewriting.
    pub storage_class: String,
    /// Wait before reading logs.
    pub settle_delay: Duration,
    /// The patcher's own log location, for failure messages.
    pub handler_logs: HandlerLogLocation,
}

impl PatcherConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    /// Read from an arbitrary source.
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let job: JobId = job_id(source)?;

        let settle_delay: Duration = match optional(source, ENV_SETTLE_DELAY_SECONDS) {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::invalid(ENV_SETTLE_DELAY_SECONDS, raw, e.to_string()))?,
            None => DEFAULT_SETTLE_DELAY,
        };

        Ok(Self {
            job_name: job_name(source, &job),
            topic_arn: required(source, ENV_TOPIC_ARN)?,
            bucket: required(source, ENV_DEST_BUCKET)?,
            destination_location_arn: required(source, ENV_DEST_LOCATION_ARN)?,
            log_group: required(source, ENV_LOG_GROUP_NAME)?,
            attributes: SmbAttributes::from_source(source)?,
            storage_class: optional(source, ENV_STORAGE_CLASS)
                .unwrap_or_else(|| DEFAULT_STORAGE_CLASS.to_string()),
            settle_delay,
            handler_logs: HandlerLogLocation::from_source(source),
        })
    }
}
