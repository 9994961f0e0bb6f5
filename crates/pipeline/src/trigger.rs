//! Daily start of a date-filtered transfer run.

use chrono::{Local, NaiveDate};
use smb_sync_common::{RunId, TriggerConfig};
use tracing::info;

use crate::error::HandlerError;
use crate::traits::TransferClient;
use crate::types::PathFilter;

/// Include pattern for the folder named after the day before `today`.
///
/// # Examples
/// For 2024-03-01 the filter is `"/2024-02-29"`.
pub fn folder_filter(today: NaiveDate) -> String {
    // NaiveDate::MIN has no predecessor.
    let yesterday: NaiveDate = today.pred_opt().unwrap_or(today);
    format!("/{}", yesterday.format("%Y-%m-%d"))
}

/// Starts one run of the configured transfer job per invocation.
pub struct TaskTrigger<'a, C: TransferClient> {
    client: &'a C,
    config: &'a TriggerConfig,
}

impl<'a, C: TransferClient> TaskTrigger<'a, C> {
    /// Create a new trigger.
    ///
    /// # Arguments
    /// * `client` - Transfer-job control client
    /// * `config` - Job to start and full-sync flag
    pub fn new(client: &'a C, config: &'a TriggerConfig) -> Self {
        Self { client, config }
    }

    /// Start a run filtered to yesterday's folder in local time.
    pub async fn start(&self) -> Result<RunId, HandlerError> {
        self.start_for(Local::now().date_naive()).await
    }

    /// Start a run as if invoked on `today`.
    ///
    /// A single start attempt is made. If the service refuses (e.g. a run is
    /// already active and queueing is off), the error is returned as is.
    pub async fn start_for(&self, today: NaiveDate) -> Result<RunId, HandlerError> {
        let filter: Option<PathFilter> = if self.config.sync_all_files {
            info!(job = %self.config.job, "starting unfiltered run");
            None
        } else {
            let pattern: String = folder_filter(today);
            info!(job = %self.config.job, filter = %pattern, "starting filtered run");
            Some(PathFilter::simple(pattern))
        };

        let run: RunId = self
            .client
            .start_run(&self.config.job, filter.as_ref())
            .await?;

        info!(run = %run, "run started");
        Ok(run)
    }
}
