//! S3-backed object metadata operations.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::types::{MetadataDirective, StorageClass};
use aws_sdk_s3::Client as S3Client;
use smb_sync_pipeline::{ObjectMetadata, ObjectStore, ServiceError};

use crate::error::AwsError;

const SERVICE: &str = "s3";

/// ObjectStore implementation using the AWS SDK for S3.
pub struct S3ObjectStore {
    /// The underlying S3 client.
    s3_client: S3Client,
}

impl S3ObjectStore {
    /// Create a store from shared SDK configuration.
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            s3_client: S3Client::new(sdk_config),
        }
    }

    /// Create a store from an existing S3Client (for testing).
    pub fn from_client(s3_client: S3Client) -> Self {
        Self { s3_client }
    }
}

/// Build the `CopySource` value for copying `bucket/key` onto itself.
///
/// Each key segment is URL-encoded; the separators are kept.
pub(crate) fn copy_source(bucket: &str, key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment: &str| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{}/{}", bucket, encoded.join("/"))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn head_metadata(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectMetadata>, ServiceError> {
        let result = self.s3_client.head_object().bucket(bucket).key(key).send().await;

        match result {
            Ok(output) => {
                let user_metadata: HashMap<String, String> =
                    output.metadata().cloned().unwrap_or_default();
                Ok(Some(ObjectMetadata { user_metadata }))
            }
            Err(err) => {
                let not_found: bool = err.as_service_error().is_some_and(|e| e.is_not_found());
                if not_found {
                    Ok(None)
                } else {
                    Err(AwsError::sdk(SERVICE, err).into())
                }
            }
        }
    }

    async fn replace_metadata(
        &self,
        bucket: &str,
        key: &str,
        metadata: &HashMap<String, String>,
        storage_class: &str,
    ) -> Result<(), ServiceError> {
        self.s3_client
            .copy_object()
            .bucket(bucket)
            .key(key)
            .copy_source(copy_source(bucket, key))
            .metadata_directive(MetadataDirective::Replace)
            .set_metadata(Some(metadata.clone()))
            .storage_class(StorageClass::from(storage_class))
            .send()
            .await
            .map_err(|err| AwsError::sdk(SERVICE, err))?;

        Ok(())
    }
}
