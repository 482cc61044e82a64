//! Key rules shared by every backend.
//!
//! A key becomes a file name in [`FileBackend`](crate::FileBackend), so the
//! same rules apply in memory to keep both modes answering alike.

use crate::StorageError;

/// Reject keys that are empty, could leave the storage root, or collide with
/// hidden staging files.
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let reason = if key.is_empty() {
        "key must not be empty"
    } else if key.contains('/') || key.contains('\\') {
        "path separators are not allowed"
    } else if key.contains("..") {
        "path traversal (..) is not allowed"
    } else if key.contains('\0') {
        "null bytes are not allowed"
    } else if key.starts_with('.') {
        "hidden names are reserved"
    } else {
        return Ok(());
    };

    Err(StorageError::InvalidKey {
        key: key.to_owned(),
        reason: reason.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass() {
        for key in ["Home", "a", "not-a-page", "v2.draft"] {
            assert!(check_key(key).is_ok(), "{key:?}");
        }
    }

    #[test]
    fn escaping_names_fail() {
        for key in ["", "../x", "a/b", "a\\b", "..", ".hidden", "a\0b"] {
            assert!(
                matches!(check_key(key), Err(StorageError::InvalidKey { .. })),
                "{key:?}"
            );
        }
    }
}
