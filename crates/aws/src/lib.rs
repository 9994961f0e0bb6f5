//! AWS SDK backends for smb-sync.
//!
//! This crate implements the client interfaces of `smb-sync-pipeline` using
//! the AWS SDK for Rust:
//!
//! - [`DataSyncTransferClient`] - start and describe task executions
//! - [`CloudWatchLogClient`] - read a run's log stream
//! - [`S3ObjectStore`] - head objects and rewrite their metadata in place
//! - [`SnsNotifier`] - publish notifications
//!
//! # Example
//!
//! ```ignore
//! use smb_sync_aws::{load_sdk_config, DataSyncTransferClient};
//!
//! let sdk_config = load_sdk_config().await;
//! let transfer = DataSyncTransferClient::new(&sdk_config);
//! ```

mod datasync;
mod error;
mod logs;
mod s3;
mod settings;
mod sns;

pub use aws_config::SdkConfig;
pub use datasync::DataSyncTransferClient;
pub use error::AwsError;
pub use logs::CloudWatchLogClient;
pub use s3::S3ObjectStore;
pub use settings::load_sdk_config;
pub use sns::SnsNotifier;
