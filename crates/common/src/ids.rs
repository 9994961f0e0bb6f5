//! Transfer job and job run identifiers.
//!
//! Both are carried around as their full ARNs. The short forms (`task-...`,
//! `exec-...`) are needed to name the run's log stream.

use std::fmt;

use crate::error::IdentifierError;

const TASK_MARKER: &str = ":task/";
const EXECUTION_MARKER: &str = "/execution/";

/// Identifier of a transfer job (a DataSync task ARN).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId {
    arn: String,
    task_id: String,
}

impl JobId {
    /// Parse a task ARN of the form `arn:...:task/task-<id>`.
    pub fn parse(arn: &str) -> Result<Self, IdentifierError> {
        let invalid = || IdentifierError::InvalidJobArn {
            arn: arn.to_string(),
        };

        let (_, task_id) = arn.split_once(TASK_MARKER).ok_or_else(invalid)?;
        if !task_id.starts_with("task-") || task_id.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            arn: arn.to_string(),
            task_id: task_id.to_string(),
        })
    }

    /// Full task ARN.
    pub fn arn(&self) -> &str {
        &self.arn
    }

    /// Short task id (`task-...`).
    pub fn task_id(&self) -> &str {
        &self.task_id
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.arn)
    }
}

/// Identifier of one job run (a DataSync task execution ARN).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId {
    arn: String,
    job: JobId,
    execution_id: String,
}

impl RunId {
    /// Parse an execution ARN of the form
    /// `arn:...:task/task-<id>/execution/exec-<id>`.
    ///
    /// # Arguments
    /// * `arn` - Task execution ARN
    ///
    /// # Errors
    /// Returns `InvalidRunArn` if the value is not an execution ARN.
    pub fn parse(arn: &str) -> Result<Self, IdentifierError> {
        let invalid = || IdentifierError::InvalidRunArn {
            arn: arn.to_string(),
        };

        let (job_arn, execution_id) = arn.split_once(EXECUTION_MARKER).ok_or_else(invalid)?;
        if !execution_id.starts_with("exec-") || execution_id.contains('/') {
            return Err(invalid());
        }
        let job: JobId = JobId::parse(job_arn).map_err(|_| invalid())?;

        Ok(Self {
            arn: arn.to_string(),
            job,
            execution_id: execution_id.to_string(),
        })
    }

    /// Full execution ARN.
    pub fn arn(&self) -> &str {
        &self.arn
    }

    /// The job this run belongs to.
    pub fn job(&self) -> &JobId {
        &self.job
    }

    /// Short execution id (`exec-...`).
    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Name of the log stream the transfer service writes this run's
    /// output to: `<task-id>-<exec-id>`.
    pub fn log_stream_name(&self) -> String {
        format!("{}-{}", self.job.task_id(), self.execution_id)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.arn)
    }
}
