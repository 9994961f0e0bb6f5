//! Daily schedule target: starts a run filtered to yesterday's folder.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use smb_sync_aws::DataSyncTransferClient;
use smb_sync_common::TriggerConfig;
use smb_sync_lambda::{bootstrap, TriggerResponse};
use smb_sync_pipeline::TaskTrigger;

async fn handler(
    _event: LambdaEvent<Value>,
    client: &DataSyncTransferClient,
    config: &TriggerConfig,
) -> Result<TriggerResponse, Error> {
    let run = TaskTrigger::new(client, config).start().await?;
    Ok(TriggerResponse::from(&run))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let sdk_config = bootstrap().await;
    let config = TriggerConfig::from_env()?;
    let client = DataSyncTransferClient::new(&sdk_config);

    run(service_fn(|event| handler(event, &client, &config))).await
}
