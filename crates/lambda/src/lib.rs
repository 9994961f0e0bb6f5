//! Shared pieces of the three Lambda binaries.
//!
//! Each binary reads its configuration and builds its SDK clients once per
//! process, then hands references to them to every invocation.

pub mod event;
pub mod response;

pub use event::TaskExecutionStateChange;
pub use response::{NotifyResponse, PatchResponse, TriggerResponse};

use smb_sync_aws::{load_sdk_config, SdkConfig};

/// Install the log subscriber and load the SDK configuration.
///
/// Log level follows `AWS_LAMBDA_LOG_LEVEL` / `RUST_LOG`, format follows
/// `AWS_LAMBDA_LOG_FORMAT`.
pub async fn bootstrap() -> SdkConfig {
    lambda_runtime::tracing::init_default_subscriber();
    load_sdk_config().await
}
