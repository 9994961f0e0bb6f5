//! Shared types and utilities for smb-sync.
//!
//! This crate provides functionality used by every handler crate:
//! - Transfer job and job run identifiers
//! - Environment configuration
//! - Destination key helpers
//! - Notification formatting helpers
//! - Shared constants and error types

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod ids;
pub mod path_utils;

// Re-export commonly used items at crate root
pub use config::{
    ConfigSource, HandlerLogLocation, NotifierConfig, PatcherConfig, ProcessEnv, SmbAttributes,
    TriggerConfig,
};
pub use constants::*;
pub use error::{ConfigError, IdentifierError};
pub use format::{bytes_to_gb, format_duration_ms};
pub use ids::{JobId, RunId};
pub use path_utils::{collapse_separators, destination_prefix, folder_key, object_key};
