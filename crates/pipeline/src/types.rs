//! Shared data structures for handler operations.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use smb_sync_common::{RunId, MAX_SUBJECT_LEN};

/// State of a job run as reported by the transfer service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Queued,
    Launching,
    Preparing,
    Transferring,
    Verifying,
    Success,
    Error,
    Cancelling,
    /// A state this code does not know about yet.
    Unknown(String),
}

impl RunState {
    /// Parse the service's upper-case state name.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "QUEUED" => RunState::Queued,
            "LAUNCHING" => RunState::Launching,
            "PREPARING" => RunState::Preparing,
            "TRANSFERRING" => RunState::Transferring,
            "VERIFYING" => RunState::Verifying,
            "SUCCESS" => RunState::Success,
            "ERROR" => RunState::Error,
            "CANCELLING" => RunState::Cancelling,
            other => RunState::Unknown(other.to_string()),
        }
    }

    /// The service's upper-case state name.
    pub fn as_str(&self) -> &str {
        match self {
            RunState::Queued => "QUEUED",
            RunState::Launching => "LAUNCHING",
            RunState::Preparing => "PREPARING",
            RunState::Transferring => "TRANSFERRING",
            RunState::Verifying => "VERIFYING",
            RunState::Success => "SUCCESS",
            RunState::Error => "ERROR",
            RunState::Cancelling => "CANCELLING",
            RunState::Unknown(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome detail of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Total wall-clock duration in milliseconds.
    pub total_duration_ms: Option<u64>,
    pub error_code: Option<String>,
    pub error_detail: Option<String>,
}

/// Status record of one job run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatus {
    pub run: RunId,
    pub state: RunState,
    pub start_time: Option<DateTime<Utc>>,
    pub files_transferred: u64,
    pub bytes_transferred: u64,
    pub result: RunResult,
}

/// Include filter passed when starting a run.
///
/// The value is a simple pattern (`/folder`, wildcards allowed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    pub pattern: String,
}

impl PathFilter {
    /// Create a simple-pattern filter.
    pub fn simple(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

/// Current state of one destination object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// User metadata (`x-amz-meta-*` without the prefix).
    pub user_metadata: HashMap<String, String>,
}

/// A message handed to the publish channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Create a notification.
    ///
    /// The subject is flattened to one line and cut to the publish
    /// channel's maximum length.
    pub fn new(subject: impl AsRef<str>, body: impl Into<String>) -> Self {
        let subject: String = subject
            .as_ref()
            .chars()
            .map(|c: char| if c.is_control() { ' ' } else { c })
            .take(MAX_SUBJECT_LEN)
            .collect();
        Self {
            subject,
            body: body.into(),
        }
    }
}
