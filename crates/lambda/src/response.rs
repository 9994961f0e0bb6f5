//! Values returned to the dispatcher.
//!
//! They end up in the invocation record, so they stay small.

use serde::Serialize;
use smb_sync_common::RunId;
use smb_sync_pipeline::{NotificationOutcome, PatchOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerResponse {
    pub task_execution_arn: String,
}

impl From<&RunId> for TriggerResponse {
    fn from(run: &RunId) -> Self {
        Self {
            task_execution_arn: run.arn().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotifyResponse {
    pub published: bool,
}

impl From<NotificationOutcome> for NotifyResponse {
    fn from(outcome: NotificationOutcome) -> Self {
        Self {
            published: outcome == NotificationOutcome::Published,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PatchResponse {
    Skipped { state: String },
    Patched { patched: usize, missing: usize },
    Failed { error: String },
}

impl From<PatchOutcome> for PatchResponse {
    fn from(outcome: PatchOutcome) -> Self {
        match outcome {
            PatchOutcome::Skipped { state } => PatchResponse::Skipped {
                state: state.to_string(),
            },
            PatchOutcome::Patched(summary) => PatchResponse::Patched {
                patched: summary.patched,
                missing: summary.missing,
            },
            PatchOutcome::Failed { error } => PatchResponse::Failed {
                error: error.to_string(),
            },
        }
    }
}
