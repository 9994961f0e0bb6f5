//! Successful task execution target: rewrites SMB metadata on every object
//! the run transferred.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use smb_sync_aws::{CloudWatchLogClient, DataSyncTransferClient, S3ObjectStore, SnsNotifier};
use smb_sync_common::PatcherConfig;
use smb_sync_lambda::{bootstrap, PatchResponse, TaskExecutionStateChange};
use smb_sync_pipeline::MetadataPatcher;

struct Clients {
    transfer: DataSyncTransferClient,
    logs: CloudWatchLogClient,
    store: S3ObjectStore,
    notifier: SnsNotifier,
}

async fn handler(
    event: LambdaEvent<Value>,
    clients: &Clients,
    config: &PatcherConfig,
) -> Result<PatchResponse, Error> {
    let change = TaskExecutionStateChange::from_value(event.payload)?;
    let run = change.run_id()?;
    tracing::info!(run = %run, state = ?change.state(), "patching metadata for run");

    let outcome = MetadataPatcher::new(
        &clients.transfer,
        &clients.logs,
        &clients.store,
        &clients.notifier,
        config,
    )
    .handle(&run)
    .await?;
    Ok(PatchResponse::from(outcome))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let sdk_config = bootstrap().await;
    let config = PatcherConfig::from_env()?;
    let clients = Clients {
        transfer: DataSyncTransferClient::new(&sdk_config),
        logs: CloudWatchLogClient::new(&sdk_config),
        store: S3ObjectStore::new(&sdk_config),
        notifier: SnsNotifier::new(&sdk_config),
    };

    run(service_fn(|event| handler(event, &clients, &config))).await
}
