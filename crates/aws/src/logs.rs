//! CloudWatch Logs-backed log queries.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudwatchlogs::Client as LogsClient;
use smb_sync_pipeline::{LogClient, ServiceError};
use tracing::debug;

use crate::error::AwsError;

const SERVICE: &str = "logs";

/// LogClient implementation over the CloudWatch Logs API.
pub struct CloudWatchLogClient {
    client: LogsClient,
}

impl CloudWatchLogClient {
    /// Create a client from shared SDK configuration.
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: LogsClient::new(sdk_config),
        }
    }

    /// Create a client from an existing CloudWatch Logs client (for testing).
    pub fn from_client(client: LogsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogClient for CloudWatchLogClient {
    async fn filter_lines(
        &self,
        group: &str,
        stream: &str,
        pattern: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let mut lines: Vec<String> = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages: usize = 0;

        loop {
            let request = self
                .client
                .filter_log_events()
                .log_group_name(group)
                .log_stream_names(stream)
                .filter_pattern(pattern)
                .set_next_token(next_token.take());

            // A missing group or stream is an error: the run's objects cannot be found.
            let response = request
                .send()
                .await
                .map_err(|err| AwsError::sdk(SERVICE, err))?;
            pages += 1;

            lines.extend(
                response
                    .events()
                    .iter()
                    .filter_map(|event| event.message())
                    .map(str::to_string),
            );

            match response.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(stream = %stream, pages, lines = lines.len(), "read run log");
        Ok(lines)
    }
}
