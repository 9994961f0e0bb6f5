//! Completion report for a finished transfer run.
//!
//! A run is reported when it failed or when it moved data. A successful run
//! that transferred nothing is skipped, so a quiet day produces no email.

use chrono::{DateTime, SecondsFormat, Utc};
use smb_sync_common::{bytes_to_gb, format_duration_ms, NotifierConfig, RunId};
use tracing::info;

use crate::error::HandlerError;
use crate::traits::{Notifier, TransferClient};
use crate::types::{Notification, RunState, RunStatus};

const NOT_AVAILABLE: &str = "n/a";

/// What the notifier did for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// No-op run, nothing published.
    Skipped,
    /// One report published.
    Published,
}

/// Whether a run warrants a report.
pub fn should_notify(status: &RunStatus) -> bool {
    status.state == RunState::Error || status.bytes_transferred > 0
}

/// Render an optional timestamp as RFC 3339, or `n/a`.
pub(crate) fn format_start_time(start_time: Option<&DateTime<Utc>>) -> String {
    start_time
        .map(|t: &DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Build the report for `status`.
///
/// # Arguments
/// * `status` - Run status record
/// * `config` - Job name and optional source location
pub fn build_report(status: &RunStatus, config: &NotifierConfig) -> Notification {
    let subject: String = format!("DataSync task {} {}", config.job_name, status.state);

    let duration: String = status
        .result
        .total_duration_ms
        .map(format_duration_ms)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut lines: Vec<String> = vec![
        format!("Start time: {}", format_start_time(status.start_time.as_ref())),
        format!("Task name: {}", config.job_name),
        format!("Task: {}", status.run.job()),
        format!("Execution: {}", status.run),
    ];
    if let Some(ref source) = config.source_location_arn {
        lines.push(format!("Source location: {}", source));
    }
    lines.push(format!("Status: {}", status.state));
    lines.push(format!("Duration: {}", duration));
    lines.push(format!("Files transferred: {}", status.files_transferred));
    lines.push(format!(
        "Data transferred: {:.3} GB",
        bytes_to_gb(status.bytes_transferred)
    ));

    if status.state == RunState::Error {
        lines.push(format!(
            "Error code: {}",
            status.result.error_code.as_deref().unwrap_or(NOT_AVAILABLE)
        ));
        lines.push(format!(
            "Error detail: {}",
            status.result.error_detail.as_deref().unwrap_or(NOT_AVAILABLE)
        ));
    }

    Notification::new(subject, lines.join("\n"))
}

/// Reports finished runs on the notification channel.
pub struct CompletionNotifier<'a, C: TransferClient, N: Notifier> {
    transfer: &'a C,
    notifier: &'a N,
    config: &'a NotifierConfig,
}

impl<'a, C: TransferClient, N: Notifier> CompletionNotifier<'a, C, N> {
    /// Create a new completion notifier.
    ///
    /// # Arguments
    /// * `transfer` - Used to fetch the run's status
    /// * `notifier` - Publish channel for the report
    /// * `config` - Topic and job display settings
    pub fn new(transfer: &'a C, notifier: &'a N, config: &'a NotifierConfig) -> Self {
        Self {
            transfer,
            notifier,
            config,
        }
    }

    /// Handle a state change of `run`.
    ///
    /// Failures to describe the run or to publish are returned unchanged.
    pub async fn handle(&self, run: &RunId) -> Result<NotificationOutcome, HandlerError> {
        let status: RunStatus = self.transfer.describe_run(run).await?;

        if !should_notify(&status) {
            info!(run = %run, state = %status.state, "nothing transferred, no report sent");
            return Ok(NotificationOutcome::Skipped);
        }

        let report: Notification = build_report(&status, self.config);
        self.notifier
            .publish(&self.config.topic_arn, &report)
            .await?;

        info!(
            run = %run,
            state = %status.state,
            bytes = status.bytes_transferred,
            "report published"
        );
        Ok(NotificationOutcome::Published)
    }
}
