//! Payloads delivered by the event dispatcher.

use aws_lambda_events::event::eventbridge::EventBridgeEvent;
use serde::{Deserialize, Serialize};
use smb_sync_common::RunId;
use smb_sync_pipeline::HandlerError;

/// `detail` of a "DataSync Task Execution State Change" event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StateChangeDetail {
    #[serde(rename = "State", default)]
    pub state: Option<String>,
}

/// A "DataSync Task Execution State Change" event.
#[derive(Debug, Clone)]
pub struct TaskExecutionStateChange(pub EventBridgeEvent<StateChangeDetail>);

impl TaskExecutionStateChange {
    /// Parse the raw event payload.
    pub fn from_value(value: serde_json::Value) -> Result<Self, HandlerError> {
        serde_json::from_value(value)
            .map(TaskExecutionStateChange)
            .map_err(|e| HandlerError::invalid_event(e.to_string()))
    }

    /// The run whose state changed: the first resource that is an
    /// execution ARN.
    pub fn run_id(&self) -> Result<RunId, HandlerError> {
        let resources: &[String] = self.0.resources.as_deref().unwrap_or_default();
        resources
            .iter()
            .find_map(|arn: &String| RunId::parse(arn).ok())
            .ok_or_else(|| {
                HandlerError::invalid_event(format!(
                    "no task execution ARN in resources {:?}",
                    resources
                ))
            })
    }

    /// The state reported in the event, if any.
    pub fn state(&self) -> Option<&str> {
        self.0.detail.state.as_deref()
    }

    /// The event's `detail-type`.
    pub fn detail_type(&self) -> &str {
        &self.0.detail_type
    }
}
