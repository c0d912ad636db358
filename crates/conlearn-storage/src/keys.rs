//! Storage key generation.
//!
//! Key format: `{user_id}/uploads/{uuid}.{ext}`.

use conlearn_core::constants::{DEFAULT_FILE_EXTENSION, UPLOADS_SEGMENT};
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

const MAX_EXTENSION_LEN: usize = 16;

/// Lower-cased final dot-segment of `file_name`, or `bin` when there is none.
///
/// Extensions that are not plain ASCII alphanumerics fall back to `bin` as well
/// so the key never picks up separators or encoded characters from the name.
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext))
            if !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => DEFAULT_FILE_EXTENSION.to_string(),
    }
}

/// Generate a fresh storage key in `user_id`'s namespace.
///
/// The random UUID makes every key unique, so two uploads of the same file
/// never collide.
pub fn generate_upload_key(user_id: &str, file_name: &str) -> StorageResult<String> {
    validate_user_segment(user_id)?;
    Ok(format!(
        "{}/{}/{}.{}",
        user_id,
        UPLOADS_SEGMENT,
        Uuid::new_v4(),
        file_extension(file_name)
    ))
}

fn validate_user_segment(user_id: &str) -> StorageResult<()> {
    if user_id.is_empty() {
        return Err(StorageError::InvalidKey("user id is empty".to_string()));
    }
    if user_id == "." || user_id == ".." {
        return Err(StorageError::InvalidKey(format!(
            "user id '{}' is not a valid path segment",
            user_id
        )));
    }
    if user_id.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(StorageError::InvalidKey(
            "user id must not contain path separators or control characters".to_string(),
        ));
    }
    Ok(())
}
