//! Shared SDK configuration for all clients of one process.

use aws_config::{BehaviorVersion, SdkConfig};

/// Load SDK configuration once; every client of the process is built from it.
///
/// Region, credentials and endpoint follow the default provider chain
/// (`AWS_REGION`, the Lambda execution role, `AWS_ENDPOINT_URL`, ...).
pub async fn load_sdk_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest()).load().await
}
