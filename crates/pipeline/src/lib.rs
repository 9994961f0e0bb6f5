//! Reactive handlers for a scheduled DataSync pipeline.
//!
//! This crate holds the handler logic and the client interfaces it depends
//! on. The AWS SDK implementations of those interfaces live in
//! `smb-sync-aws`; the Lambda entry points live in `smb-sync-lambda`.
//!
//! - **Task Trigger** - starts the daily run, filtered to yesterday's folder
//! - **Completion Notifier** - reports runs that failed or moved data
//! - **Metadata Patcher** - rewrites SMB metadata on every transferred object
//!
//! # Example
//!
//! ```ignore
//! use smb_sync_pipeline::{CompletionNotifier, NotificationOutcome};
//!
//! let notifier = CompletionNotifier::new(&transfer, &sns, &config);
//! let outcome: NotificationOutcome = notifier.handle(&run).await?;
//! ```

mod error;
pub mod log_scan;
pub mod metadata;
pub mod notifier;
pub mod patcher;
#[cfg(test)]
mod testing;
mod traits;
pub mod trigger;
mod types;

pub use error::{HandlerError, ServiceError};
pub use log_scan::{
    collect_patch_targets, parse_transferred_object_path, PatchTarget, TargetKind,
};
pub use metadata::build_replacement;
pub use notifier::{build_report, should_notify, CompletionNotifier, NotificationOutcome};
pub use patcher::{MetadataPatcher, PatchOptions, PatchOutcome, PatchSummary};
pub use traits::{LogClient, Notifier, ObjectStore, TransferClient};
pub use trigger::{folder_filter, TaskTrigger};
pub use types::{
    Notification, ObjectMetadata, PathFilter, RunResult, RunState, RunStatus,
};
