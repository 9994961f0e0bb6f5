//! Task execution state change target: emails a report for runs that
//! failed or moved data.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use smb_sync_aws::{DataSyncTransferClient, SnsNotifier};
use smb_sync_common::NotifierConfig;
use smb_sync_lambda::{bootstrap, NotifyResponse, TaskExecutionStateChange};
use smb_sync_pipeline::CompletionNotifier;

async fn handler(
    event: LambdaEvent<Value>,
    transfer: &DataSyncTransferClient,
    notifier: &SnsNotifier,
    config: &NotifierConfig,
) -> Result<NotifyResponse, Error> {
    let change = TaskExecutionStateChange::from_value(event.payload)?;
    let run = change.run_id()?;
    tracing::info!(run = %run, state = ?change.state(), "task execution state changed");

    let outcome = CompletionNotifier::new(transfer, notifier, config)
        .handle(&run)
        .await?;
    Ok(NotifyResponse::from(outcome))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let sdk_config = bootstrap().await;
    let config = NotifierConfig::from_env()?;
    let transfer = DataSyncTransferClient::new(&sdk_config);
    let notifier = SnsNotifier::new(&sdk_config);

    run(service_fn(|event| handler(event, &transfer, &notifier, &config))).await
}
