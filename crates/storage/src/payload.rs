//! Upload payloads: a byte source plus its declared content type.

use std::io::Cursor;

use bytes::Bytes;
use objstore_core::{StorageError, StorageResult};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Content type used when the caller does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Caller-supplied data for an upload.
///
/// The reader is consumed by [`UploadPayload::into_bytes`], which reads it
/// once to the end and drops it before returning.
pub struct UploadPayload<R> {
    content_type: String,
    reader: R,
}

impl<R> UploadPayload<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(content_type: impl Into<String>, reader: R) -> Self {
        Self {
            content_type: content_type.into(),
            reader,
        }
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Read the whole payload, returning its content type and bytes.
    ///
    /// # Errors
    /// Returns `StorageError::Transport` if reading the source fails.
    pub async fn into_bytes(self) -> StorageResult<(String, Bytes)> {
        let Self {
            content_type,
            mut reader,
        } = self;

        let mut buf = Vec::new();
        let read = reader.read_to_end(&mut buf).await;
        drop(reader);
        read.map_err(|e| StorageError::Transport(format!("Failed to read upload payload: {e}")))?;

        Ok((content_type, Bytes::from(buf)))
    }
}

impl UploadPayload<Cursor<Bytes>> {
    /// Payload backed by bytes already in memory.
    pub fn from_bytes(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::new(content_type, Cursor::new(data.into()))
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    use super::*;

    /// Reader that records when it is dropped.
    struct TrackedReader {
        inner: Cursor<Vec<u8>>,
        dropped: Arc<AtomicBool>,
        fail: bool,
    }

    impl AsyncRead for TrackedReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.fail {
                return Poll::Ready(Err(io::Error::other("disk unplugged")));
            }
            Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    impl Drop for TrackedReader {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    fn tracked(data: &[u8], fail: bool) -> (TrackedReader, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        let reader = TrackedReader {
            inner: Cursor::new(data.to_vec()),
            dropped: Arc::clone(&dropped),
            fail,
        };
        (reader, dropped)
    }

    #[tokio::test]
    async fn reads_everything_once() {
        let payload = UploadPayload::from_bytes("text/plain", "hello world");
        let (content_type, bytes) = payload.into_bytes().await.unwrap();
        assert_eq!(content_type, "text/plain");
        assert_eq!(&bytes[..], b"hello world");
    }

    #[tokio::test]
    async fn reader_is_closed_after_success() {
        let (reader, dropped) = tracked(b"abc", false);
        let payload = UploadPayload::new(DEFAULT_CONTENT_TYPE, reader);
        payload.into_bytes().await.unwrap();
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn reader_is_closed_after_failure() {
        let (reader, dropped) = tracked(b"abc", true);
        let err = UploadPayload::new(DEFAULT_CONTENT_TYPE, reader)
            .into_bytes()
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)));
        assert!(dropped.load(Ordering::SeqCst));
    }
}
