//! SNS-backed notification channel.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::Client as SnsClient;
use smb_sync_pipeline::{Notification, Notifier, ServiceError};
use tracing::debug;

use crate::error::AwsError;

const SERVICE: &str = "sns";

/// Notifier implementation over the SNS API.
pub struct SnsNotifier {
    client: SnsClient,
}

impl SnsNotifier {
    /// Create a notifier from shared SDK configuration.
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: SnsClient::new(sdk_config),
        }
    }

    /// Create a notifier from an existing SNS client (for testing).
    pub fn from_client(client: SnsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(
        &self,
        topic_arn: &str,
        notification: &Notification,
    ) -> Result<(), ServiceError> {
        let output = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .subject(&notification.subject)
            .message(&notification.body)
            .send()
            .await
            .map_err(|err| AwsError::sdk(SERVICE, err))?;

        debug!(message_id = ?output.message_id(), "notification published");
        Ok(())
    }
}
