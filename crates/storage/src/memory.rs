//! In-memory backend with S3-like semantics.
//!
//! Useful for local runs and tests. Missing buckets and keys fail with
//! `NotFound` the way an S3 server answers `NoSuchBucket`/`NoSuchKey`,
//! deletes are idempotent, and presigned URLs point at the configured
//! endpoint without carrying a real signature.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use objstore_core::{StorageError, StorageResult, require_non_empty};
use tokio::sync::RwLock;

use crate::backend::{ObjectBackend, ObjectInfo};

/// Endpoint used for presigned URLs when none is given.
pub const MEMORY_ENDPOINT: &str = "memory://localhost";

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

type Buckets = HashMap<String, HashMap<String, StoredObject>>;

/// Shared in-memory object store.
///
/// Clones share the same buckets and request counter.
#[derive(Clone)]
pub struct MemoryBackend {
    buckets: Arc<RwLock<Buckets>>,
    requests: Arc<AtomicUsize>,
    endpoint: String,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            requests: Arc::new(AtomicUsize::new(0)),
            endpoint: MEMORY_ENDPOINT.to_string(),
        }
    }

    /// Number of backend calls served so far, across all clones.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Quoted MD5 hex digest, the ETag S3 reports for single-part uploads.
    fn etag(data: &[u8]) -> String {
        format!("\"{:x}\"", md5::compute(data))
    }
}

fn object_info(object: &StoredObject) -> ObjectInfo {
    ObjectInfo {
        size: object.data.len() as u64,
        content_type: Some(object.content_type.clone()),
        e_tag: Some(MemoryBackend::etag(&object.data)),
    }
}

#[async_trait]
impl ObjectBackend for MemoryBackend {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        self.record_request();
        Ok(self.buckets.read().await.contains_key(bucket))
    }

    async fn create_bucket(&self, bucket: &str) -> StorageResult<()> {
        self.record_request();
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default();
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<ObjectInfo> {
        self.record_request();
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::NotFound(format!("bucket {bucket}")))?;

        let object = StoredObject {
            data,
            content_type: content_type.to_string(),
        };
        let info = object_info(&object);
        objects.insert(key.to_string(), object);
        Ok(info)
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectInfo> {
        self.record_request();
        let buckets = self.buckets.read().await;
        buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(object_info)
            .ok_or_else(|| StorageError::not_found(bucket, key))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        self.record_request();
        let buckets = self.buckets.read().await;
        buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::not_found(bucket, key))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.record_request();
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::NotFound(format!("bucket {bucket}")))?;
        objects.remove(key);
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.record_request();
        Ok(format!(
            "{}/{bucket}/{key}?X-Amz-Expires={}",
            self.endpoint,
            expires_in.as_secs()
        ))
    }

    fn with_endpoint(&self, endpoint: &str) -> StorageResult<Self> {
        require_non_empty("endpoint", endpoint)?;
        Ok(Self {
            buckets: Arc::clone(&self.buckets),
            requests: Arc::clone(&self.requests),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_requires_existing_bucket() {
        let backend = MemoryBackend::new();
        let err = backend
            .put_object("missing", "a.txt", Bytes::from_static(b"x"), "text/plain")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn stat_reports_size_and_content_type() {
        let backend = MemoryBackend::new();
        backend.create_bucket("docs").await.unwrap();
        backend
            .put_object("docs", "a.txt", Bytes::from_static(b"hello"), "text/plain")
            .await
            .unwrap();

        let info = backend.stat_object("docs", "a.txt").await.unwrap();
        assert_eq!(info.size, 5);
        assert_eq!(info.content_type.as_deref(), Some("text/plain"));
        assert_eq!(
            info.e_tag.as_deref(),
            Some("\"5d41402abc4b2a76b9719d911017c592\"")
        );
    }

    #[tokio::test]
    async fn create_bucket_is_idempotent() {
        let backend = MemoryBackend::new();
        backend.create_bucket("docs").await.unwrap();
        backend
            .put_object("docs", "a.txt", Bytes::from_static(b"1"), "text/plain")
            .await
            .unwrap();
        backend.create_bucket("docs").await.unwrap();
        assert!(backend.stat_object("docs", "a.txt").await.is_ok());
    }

    #[tokio::test]
    async fn delete_missing_key_succeeds_but_missing_bucket_fails() {
        let backend = MemoryBackend::new();
        backend.create_bucket("docs").await.unwrap();
        assert!(backend.delete_object("docs", "never.txt").await.is_ok());
        assert!(
            backend
                .delete_object("nope", "never.txt")
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn endpoint_sibling_shares_objects_and_counter() {
        let backend = MemoryBackend::new();
        let sibling = backend.with_endpoint("http://cdn.local:9000/").unwrap();
        sibling.create_bucket("docs").await.unwrap();

        assert!(backend.bucket_exists("docs").await.unwrap());
        assert_eq!(backend.request_count(), 2);
        assert_eq!(sibling.endpoint(), "http://cdn.local:9000");
    }

    #[test]
    fn etag_is_quoted_md5_of_content() {
        assert_eq!(
            MemoryBackend::etag(b""),
            "\"d41d8cd98f00b204e9800998ecf8427e\""
        );
        assert_ne!(MemoryBackend::etag(b"a"), MemoryBackend::etag(b"b"));
    }
}
