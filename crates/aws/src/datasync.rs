//! DataSync-backed transfer-job control.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_datasync::primitives::DateTime as SdkDateTime;
use aws_sdk_datasync::types::{FilterRule, FilterType, TaskExecutionResultDetail};
use aws_sdk_datasync::Client as DataSyncClient;
use chrono::{DateTime, Utc};
use smb_sync_common::{JobId, RunId};
use smb_sync_pipeline::{
    PathFilter, RunResult, RunState, RunStatus, ServiceError, TransferClient,
};
use tracing::debug;

use crate::error::AwsError;

const SERVICE: &str = "datasync";

/// TransferClient implementation over the DataSync API.
pub struct DataSyncTransferClient {
    client: DataSyncClient,
}

impl DataSyncTransferClient {
    /// Create a client from shared SDK configuration.
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: DataSyncClient::new(sdk_config),
        }
    }

    /// Create a client from an existing DataSync client (for testing).
    pub fn from_client(client: DataSyncClient) -> Self {
        Self { client }
    }
}

/// Build the include rule for a simple-pattern filter.
pub(crate) fn filter_rule(filter: &PathFilter) -> FilterRule {
    FilterRule::builder()
        .filter_type(FilterType::SimplePattern)
        .value(&filter.pattern)
        .build()
}

pub(crate) fn to_chrono(time: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(time.secs(), time.subsec_nanos())
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

pub(crate) fn to_run_result(detail: Option<&TaskExecutionResultDetail>) -> RunResult {
    match detail {
        Some(detail) => RunResult {
            total_duration_ms: detail.total_duration().map(to_count),
            error_code: detail.error_code().map(str::to_string),
            error_detail: detail.error_detail().map(str::to_string),
        },
        None => RunResult::default(),
    }
}

#[async_trait]
impl TransferClient for DataSyncTransferClient {
    async fn start_run(
        &self,
        job: &JobId,
        filter: Option<&PathFilter>,
    ) -> Result<RunId, ServiceError> {
        let mut request = self.client.start_task_execution().task_arn(job.arn());

        if let Some(filter) = filter {
            request = request.includes(filter_rule(filter));
        }

        let output = request
            .send()
            .await
            .map_err(|err| AwsError::sdk(SERVICE, err))?;

        let arn: &str = output
            .task_execution_arn()
            .ok_or(AwsError::MissingField {
                service: SERVICE,
                field: "TaskExecutionArn",
            })?;

        RunId::parse(arn).map_err(|e| ServiceError::invalid_response(SERVICE, e.to_string()))
    }

    async fn describe_run(&self, run: &RunId) -> Result<RunStatus, ServiceError> {
        let output = self
            .client
            .describe_task_execution()
            .task_execution_arn(run.arn())
            .send()
            .await
            .map_err(|err| AwsError::sdk(SERVICE, err))?;

        let state: RunState = output
            .status()
            .map(|s| RunState::parse(s.as_str()))
            .ok_or(AwsError::MissingField {
                service: SERVICE,
                field: "Status",
            })?;

        debug!(run = %run, state = %state, "described run");

        Ok(RunStatus {
            run: run.clone(),
            state,
            start_time: output.start_time().and_then(to_chrono),
            files_transferred: to_count(output.files_transferred()),
            bytes_transferred: to_count(output.bytes_transferred()),
            result: to_run_result(output.result()),
        })
    }

    async fn describe_location(&self, location_arn: &str) -> Result<String, ServiceError> {
        let output = self
            .client
            .describe_location_s3()
            .location_arn(location_arn)
            .send()
            .await
            .map_err(|err| AwsError::sdk(SERVICE, err))?;

        let uri: &str = output.location_uri().ok_or(AwsError::MissingField {
            service: SERVICE,
            field: "LocationUri",
        })?;

        Ok(uri.to_string())
    }
}
