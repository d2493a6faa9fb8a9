//! Storage facade: the five operations callers use.
//!
//! Every operation validates bucket and key before touching the backend,
//! logs storage failures at error level with the bucket and key, and
//! returns them as tagged `StorageError`s. Callers that want the old
//! "false / empty / absent" contract can apply `SentinelExt`.

use std::future::Future;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;
use objstore_core::{StorageError, StorageResult, StrExt, require_object_path};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backend::ObjectBackend;
use crate::payload::UploadPayload;
use crate::s3::S3Backend;

/// Presigned URL lifetime when the caller does not pick one (10 minutes).
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 600;

/// Run `fut` unless `cancel` fires first.
async fn cancellable<T>(
    cancel: Option<&CancellationToken>,
    fut: impl Future<Output = StorageResult<T>>,
) -> StorageResult<T> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => Err(StorageError::Cancelled),
            result = fut => result,
        },
        None => fut.await,
    }
}

fn log_failure(operation: &'static str, bucket: &str, key: &str, err: &StorageError) {
    match err {
        StorageError::Cancelled => {
            warn!(operation, bucket = %bucket, key = %key, "Object storage operation cancelled");
        }
        _ => {
            error!(operation, bucket = %bucket, key = %key, error = %err, "Object storage operation failed");
        }
    }
}

/// Object storage facade over a single shared backend.
pub struct StorageService<B = S3Backend> {
    backend: B,
}

impl<B: ObjectBackend> StorageService<B> {
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Upload a payload, creating the bucket first if it does not exist.
    ///
    /// The payload is read exactly once and closed before this returns.
    /// Returns `Ok(false)` when the stored object reports a size of zero.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty bucket or key; any backend failure
    /// otherwise (logged).
    pub async fn upload<R>(
        &self,
        payload: UploadPayload<R>,
        key: &str,
        bucket: &str,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<bool>
    where
        R: AsyncRead + Unpin + Send,
    {
        require_object_path(bucket, key)?;
        debug!(bucket = %bucket, key = %key, "Uploading object");

        let upload = async {
            let (content_type, data) = payload.into_bytes().await?;

            if !self.backend.bucket_exists(bucket).await? {
                info!(bucket = %bucket, "Bucket missing, creating it");
                self.backend.create_bucket(bucket).await?;
            }

            self.backend
                .put_object(bucket, key, data, &content_type)
                .await
        };

        let info = cancellable(cancel, upload)
            .await
            .inspect_err(|e| log_failure("upload", bucket, key, e))?;

        if info.size == 0 {
            warn!(bucket = %bucket, key = %key, "Uploaded object reported zero size");
            return Ok(false);
        }

        info!(bucket = %bucket, key = %key, size = info.size, "Object uploaded");
        Ok(true)
    }

    /// Generate a presigned GET URL.
    ///
    /// With a non-empty `endpoint`, the URL is signed by a client built for
    /// that endpoint only for the duration of this call. This covers setups
    /// where the externally reachable address differs from the internal one.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty bucket or key or an unusable
    /// endpoint; any presigning failure otherwise (logged).
    pub async fn get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in_secs: u64,
        endpoint: &str,
    ) -> StorageResult<String> {
        require_object_path(bucket, key)?;
        let expires_in = Duration::from_secs(expires_in_secs);

        let url = match endpoint.non_empty() {
            Some(endpoint) => {
                debug!(bucket = %bucket, key = %key, endpoint = %endpoint, "Presigning on alternate endpoint");
                let scoped = self.backend.with_endpoint(endpoint)?;
                scoped.presign_get(bucket, key, expires_in).await
            }
            None => {
                debug!(bucket = %bucket, key = %key, "Presigning");
                self.backend.presign_get(bucket, key, expires_in).await
            }
        };

        url.inspect_err(|e| log_failure("get_url", bucket, key, e))
    }

    /// Delete an object. Deleting a key that does not exist succeeds.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty bucket or key; any backend failure
    /// otherwise (logged).
    pub async fn delete(
        &self,
        bucket: &str,
        key: &str,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<()> {
        require_object_path(bucket, key)?;
        debug!(bucket = %bucket, key = %key, "Deleting object");

        cancellable(cancel, self.backend.delete_object(bucket, key))
            .await
            .inspect_err(|e| log_failure("delete", bucket, key, e))?;

        info!(bucket = %bucket, key = %key, "Object deleted");
        Ok(())
    }

    /// Read a whole object into memory.
    ///
    /// The object is stat'ed first so a missing key fails with `NotFound`
    /// before any body transfer starts.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty bucket or key; `NotFound` for a
    /// missing object; any other backend failure (all logged).
    pub async fn get_file_as_stream(
        &self,
        bucket: &str,
        key: &str,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Bytes> {
        require_object_path(bucket, key)?;
        debug!(bucket = %bucket, key = %key, "Reading object");

        let read = async {
            self.backend.stat_object(bucket, key).await?;
            self.backend.get_object(bucket, key).await
        };

        cancellable(cancel, read)
            .await
            .inspect_err(|e| log_failure("get_file_as_stream", bucket, key, e))
    }

    /// Read a whole object and encode it as standard base64.
    ///
    /// # Errors
    /// Same as [`StorageService::get_file_as_stream`].
    pub async fn get_file_as_base64(
        &self,
        bucket: &str,
        key: &str,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<String> {
        let data = self.get_file_as_stream(bucket, key, cancel).await?;
        Ok(B64.encode(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    #[tokio::test]
    async fn cancellable_prefers_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let result = cancellable(Some(&token), async { Ok(1) }).await;
        assert!(matches!(result, Err(StorageError::Cancelled)));
    }

    #[tokio::test]
    async fn cancellable_without_token_runs_future() {
        assert_eq!(cancellable(None, async { Ok(1) }).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn base64_encodes_whole_object() {
        let service = StorageService::new(MemoryBackend::new());
        service
            .upload(UploadPayload::from_bytes("text/plain", "hi!"), "k", "b", None)
            .await
            .unwrap();
        assert_eq!(
            service.get_file_as_base64("b", "k", None).await.unwrap(),
            "aGkh"
        );
    }
}
