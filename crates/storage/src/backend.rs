//! Backend seam between the facade and a concrete object store.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use objstore_core::StorageResult;

/// Object metadata reported by a backend after a put or stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub size: u64,
    pub content_type: Option<String>,
    pub e_tag: Option<String>,
}

/// Low-level object store operations the facade is built on.
///
/// Implementations map their native failures onto `StorageError` so the
/// facade never sees client-specific error types.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    /// Create a bucket. Creating a bucket this backend already owns succeeds.
    async fn create_bucket(&self, bucket: &str) -> StorageResult<()>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<ObjectInfo>;

    async fn stat_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectInfo>;

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Bytes>;

    /// Delete an object. Deleting a missing key in an existing bucket succeeds.
    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Presign a GET request. Object existence is not checked.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Build a sibling backend with the same credentials on another endpoint.
    ///
    /// # Errors
    /// Returns `StorageError::InvalidArgument` if the endpoint is unusable.
    fn with_endpoint(&self, endpoint: &str) -> StorageResult<Self>
    where
        Self: Sized;
}
