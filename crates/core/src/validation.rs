//! Argument validation shared by the storage facade and its backends.

use crate::error::{StorageError, StorageResult};

/// Reject an empty required argument.
///
/// # Errors
/// Returns `StorageError::InvalidArgument` naming `field` if `value` is empty.
#[inline]
pub fn require_non_empty(field: &str, value: &str) -> StorageResult<()> {
    if value.is_empty() {
        return Err(StorageError::missing(field));
    }
    Ok(())
}

/// Validate the bucket/key pair every object operation addresses.
///
/// The bucket is checked first so the error names the outermost problem.
///
/// # Errors
/// Returns `StorageError::InvalidArgument` if either value is empty.
pub fn require_object_path(bucket: &str, key: &str) -> StorageResult<()> {
    require_non_empty("bucket", bucket)?;
    require_non_empty("key", key)
}
