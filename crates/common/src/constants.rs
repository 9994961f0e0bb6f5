//! Shared constants used across smb-sync crates.

use std::time::Duration;

/// Number of metadata patches issued concurrently before joining.
pub const DEFAULT_PATCH_BATCH_SIZE: usize = 200;

/// Wait applied before reading a run's logs, so late log deliveries land.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(60);

/// Bytes per gigabyte as reported in notifications (decimal, not GiB).
pub const BYTES_PER_GB: f64 = 1e9;

/// SNS rejects subjects longer than this.
pub const MAX_SUBJECT_LEN: usize = 100;

/// Filter pattern that selects per-file transfer lines in a run's log stream.
pub const TRANSFERRED_FILE_FILTER: &str = "\"Transferred file\"";

/// Storage class applied while rewriting metadata, unless configured otherwise.
pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD_IA";

/// Object metadata key for the SMB file owner.
pub const METADATA_KEY_FILE_OWNER: &str = "file-owner";

/// Object metadata key for the SMB file group.
pub const METADATA_KEY_FILE_GROUP: &str = "file-group";

/// Object metadata key for the POSIX-style permission bits.
pub const METADATA_KEY_FILE_PERMISSIONS: &str = "file-permissions";

/// Object metadata key for the SMB access control list.
pub const METADATA_KEY_FILE_ACL: &str = "file-acl";

/// Creation time set by the source system. Carried over when present.
pub const METADATA_KEY_FILE_CTIME: &str = "file-ctime";

/// Modification time set by the source system. Carried over when present.
pub const METADATA_KEY_FILE_MTIME: &str = "file-mtime";

/// Metadata keys copied from an object's prior metadata into its replacement.
pub const PRESERVED_METADATA_KEYS: [&str; 2] = [METADATA_KEY_FILE_CTIME, METADATA_KEY_FILE_MTIME];
