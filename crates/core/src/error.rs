//! Structured error handling for object storage operations.
//!
//! Input errors are separated from storage failures so callers can tell
//! a rejected request apart from a failed one. Storage failures keep
//! their cause (missing object, denied credentials, broken transport).

use std::fmt::Display;

use thiserror::Error;

/// Storage error type returned by every facade operation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Create an input error for a required argument that was left empty.
    #[must_use]
    pub fn missing(field: &str) -> Self {
        Self::InvalidArgument(format!("{field} must not be empty"))
    }

    /// Create a not found error for an object.
    pub fn not_found(bucket: &str, key: impl Display) -> Self {
        Self::NotFound(format!("{bucket}/{key}"))
    }

    /// Whether the error was raised before any storage call was made.
    #[inline]
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Extension trait collapsing storage failures into sentinel values.
///
/// Input errors stay errors. Every other failure is assumed to be logged
/// already by the operation that produced it and is turned into an empty
/// value, matching callers that only care about "worked or not".
pub trait SentinelExt<T> {
    /// Map storage failures to `Ok(None)`.
    ///
    /// # Errors
    /// Returns the error unchanged if it is an input error.
    fn or_absent(self) -> StorageResult<Option<T>>;

    /// Map storage failures to `Ok(T::default())` (`false`, `""`, ...).
    ///
    /// # Errors
    /// Returns the error unchanged if it is an input error.
    fn or_sentinel(self) -> StorageResult<T>
    where
        T: Default;
}

impl<T> SentinelExt<T> for StorageResult<T> {
    fn or_absent(self) -> StorageResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_input_error() => Err(e),
            Err(_) => Ok(None),
        }
    }

    fn or_sentinel(self) -> StorageResult<T>
    where
        T: Default,
    {
        self.or_absent().map(Option::unwrap_or_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_helper_names_the_field() {
        let err = StorageError::missing("bucket");
        assert!(err.is_input_error());
        assert!(err.to_string().contains("bucket"));
    }

    #[test]
    fn not_found_helper_formats_path() {
        let err = StorageError::not_found("photos", "cat.png");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: photos/cat.png");
    }

    #[test]
    fn storage_failures_collapse_to_sentinels() {
        let failed: StorageResult<bool> = Err(StorageError::Transport("reset".to_string()));
        assert!(!failed.or_sentinel().unwrap());

        let missing: StorageResult<String> = Err(StorageError::not_found("b", "k"));
        assert_eq!(missing.or_sentinel().unwrap(), "");

        let cancelled: StorageResult<Vec<u8>> = Err(StorageError::Cancelled);
        assert!(cancelled.or_absent().unwrap().is_none());
    }

    #[test]
    fn input_errors_survive_collapsing() {
        let rejected: StorageResult<bool> = Err(StorageError::missing("key"));
        assert!(matches!(
            rejected.or_sentinel(),
            Err(StorageError::InvalidArgument(_))
        ));
    }

    #[test]
    fn success_passes_through() {
        let ok: StorageResult<u32> = Ok(7);
        assert_eq!(ok.or_absent().unwrap(), Some(7));
    }
}
