//! Reconstructs the set of transferred objects from a run's log stream.
//!
//! The transfer service logs one line per copied file:
//!
//! ```text
//! [INFO] Transferred file /2024-02-29/report.csv, 1048576 bytes
//! ```
//!
//! That line format is not a documented interface, so everything that depends
//! on it goes through [`parse_transferred_object_path`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use smb_sync_common::{folder_key, object_key};

static TRANSFERRED_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Transferred file (?P<path>.+), (?P<bytes>\d+) bytes").expect("valid regex")
});

/// Extract the source path from a per-file transfer log line.
///
/// Returns None for any other line.
pub fn parse_transferred_object_path(line: &str) -> Option<&str> {
    TRANSFERRED_FILE
        .captures(line)
        .and_then(|caps| caps.name("path"))
        .map(|m| m.as_str())
}

/// Why a key is a patch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Named by a transferred-file line. Must exist.
    Object,
    /// Enclosing folder of a transferred object, or the bare prefix.
    /// The transfer service does not always create these.
    Folder,
}

/// One key to patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchTarget {
    pub key: String,
    pub kind: TargetKind,
}

impl PatchTarget {
    /// Create a target.
    pub fn new(key: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }
}

/// Build the list of keys to patch, sorted by key and deduplicated.
///
/// For every transferred path this yields the object key and its enclosing
/// folder key. The bare prefix is always included, even when no line matches,
/// unless it is empty (bucket root). A key reported both as an object and as
/// a folder is kept as an object.
///
/// # Arguments
/// * `prefix` - Destination key prefix, e.g. `"p/"`
/// * `lines` - Log lines of the run
pub fn collect_patch_targets<S: AsRef<str>>(prefix: &str, lines: &[S]) -> Vec<PatchTarget> {
    let mut targets: BTreeMap<String, TargetKind> = BTreeMap::new();

    if !prefix.is_empty() {
        targets.insert(prefix.to_string(), TargetKind::Folder);
    }

    for path in lines
        .iter()
        .filter_map(|line| parse_transferred_object_path(line.as_ref()))
    {
        let key: String = object_key(prefix, path);
        if key.is_empty() {
            continue;
        }
        if let Some(folder) = folder_key(&key) {
            targets.entry(folder).or_insert(TargetKind::Folder);
        }
        targets.insert(key, TargetKind::Object);
    }

    targets
        .into_iter()
        .map(|(key, kind)| PatchTarget { key, kind })
        .collect()
}
