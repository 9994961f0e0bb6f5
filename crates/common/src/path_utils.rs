//! Object key helpers for the destination bucket.
//!
//! Keys are always POSIX-style (`/` separated) and never start with `/`.

use crate::error::IdentifierError;

const S3_SCHEME: &str = "s3://";

/// Collapse runs of `/` into a single separator.
///
/// # Arguments
/// * `key` - Raw key, possibly built by concatenating a prefix and a path
///
/// # Returns
/// The key with every `//`, `///`, ... replaced by `/`.
pub fn collapse_separators(key: &str) -> String {
    let mut collapsed = String::with_capacity(key.len());
    let mut previous_was_separator: bool = false;

    for c in key.chars() {
        if c == '/' {
            if !previous_was_separator {
                collapsed.push(c);
            }
            previous_was_separator = true;
        } else {
            collapsed.push(c);
            previous_was_separator = false;
        }
    }

    collapsed
}

/// Build the destination object key for a path reported by the transfer log.
///
/// # Arguments
/// * `prefix` - Destination key prefix (e.g. `"p/"`)
/// * `path` - Path as written in the log (e.g. `"/a//b.txt"`)
///
/// # Returns
/// `prefix + path` with duplicate separators collapsed and any leading `/`
/// removed, e.g. `"p/a/b.txt"`.
pub fn object_key(prefix: &str, path: &str) -> String {
    let joined: String = collapse_separators(&format!("{}{}", prefix, path));
    joined.trim_start_matches('/').to_string()
}

/// The folder key enclosing `key`: its directory part plus trailing `/`.
///
/// Returns `None` for a key at the bucket root, which has no folder object.
pub fn folder_key(key: &str) -> Option<String> {
    let trimmed: &str = key.trim_end_matches('/');
    trimmed
        .rfind('/')
        .map(|idx: usize| trimmed[..=idx].to_string())
}

/// Derive the destination key prefix from an S3 location URI.
///
/// Strips the `s3://<bucket>` qualifier and any leading `/`; a non-empty
/// prefix keeps (or gains) its trailing `/`.
///
/// # Arguments
/// * `location_uri` - Location URI, e.g. `"s3://my-bucket/p/"`
/// * `bucket` - Destination bucket the location must point into
///
/// # Errors
/// Returns `LocationOutsideBucket` if the URI names a different bucket.
pub fn destination_prefix(location_uri: &str, bucket: &str) -> Result<String, IdentifierError> {
    let outside = || IdentifierError::LocationOutsideBucket {
        uri: location_uri.to_string(),
        bucket: bucket.to_string(),
    };

    let rest: &str = location_uri
        .strip_prefix(S3_SCHEME)
        .and_then(|s: &str| s.strip_prefix(bucket))
        .ok_or_else(outside)?;

    // Guard against "s3://bucket-other/..." matching bucket "bucket".
    if !rest.is_empty() && !rest.starts_with('/') {
        return Err(outside());
    }

    let prefix: String = collapse_separators(rest.trim_start_matches('/'));
    if prefix.is_empty() || prefix.ends_with('/') {
        Ok(prefix)
    } else {
        Ok(format!("{}/", prefix))
    }
}
