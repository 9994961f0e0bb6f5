//! Replacement metadata for a transferred object.

use std::collections::HashMap;

use smb_sync_common::{
    SmbAttributes, METADATA_KEY_FILE_ACL, METADATA_KEY_FILE_GROUP, METADATA_KEY_FILE_OWNER,
    METADATA_KEY_FILE_PERMISSIONS, PRESERVED_METADATA_KEYS,
};

/// Build the metadata that replaces an object's existing user metadata.
///
/// The result holds the four fixed SMB attributes plus the creation and
/// modification times from `existing`, when present. Every other existing
/// key is dropped. Applying the result twice gives the same metadata.
///
/// # Arguments
/// * `existing` - Current user metadata of the object
/// * `attributes` - Fixed attributes to write
pub fn build_replacement(
    existing: &HashMap<String, String>,
    attributes: &SmbAttributes,
) -> HashMap<String, String> {
    let mut replacement: HashMap<String, String> = HashMap::with_capacity(6);

    replacement.insert(METADATA_KEY_FILE_OWNER.to_string(), attributes.owner.clone());
    replacement.insert(METADATA_KEY_FILE_GROUP.to_string(), attributes.group.clone());
    replacement.insert(
        METADATA_KEY_FILE_PERMISSIONS.to_string(),
        attributes.permissions.clone(),
    );
    replacement.insert(METADATA_KEY_FILE_ACL.to_string(), attributes.acl.clone());

    for key in PRESERVED_METADATA_KEYS {
        if let Some(value) = existing.get(key) {
            replacement.insert(key.to_string(), value.clone());
        }
    }

    replacement
}
