//! CLI subcommands, one facade operation each.

use std::path::PathBuf;

use anyhow::{Context, bail};
use bytes::Bytes;
use clap::Subcommand;
use objstore_storage::{
    DEFAULT_CONTENT_TYPE, DEFAULT_URL_EXPIRY_SECS, ObjectBackend, UploadPayload,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::ServiceContext;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Upload a local file, creating the bucket if needed
    Upload {
        /// File to upload
        path: PathBuf,
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
        #[arg(long, default_value = DEFAULT_CONTENT_TYPE)]
        content_type: String,
    },

    /// Print a presigned download URL
    Url {
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
        /// URL lifetime in seconds
        #[arg(long, default_value_t = DEFAULT_URL_EXPIRY_SECS)]
        expires_in: u64,
        /// Sign for this endpoint instead of the configured one
        #[arg(long, default_value = "")]
        endpoint: String,
    },

    /// Delete an object
    Delete {
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
    },

    /// Download an object to a file or stdout
    Get {
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print an object as base64
    Base64 {
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
    },
}

/// What a command produced, for the caller to render.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A line of text for stdout.
    Text(String),
    /// Raw object bytes for stdout.
    Bytes(Bytes),
    /// Nothing to print.
    Done,
}

impl Command {
    /// Run the command against the registered storage service.
    ///
    /// # Errors
    /// Returns any input, storage, or local file error.
    pub async fn run<B: ObjectBackend>(
        self,
        ctx: &ServiceContext<B>,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Outcome> {
        let storage = ctx.storage();

        match self {
            Self::Upload {
                path,
                bucket,
                key,
                content_type,
            } => {
                let file = tokio::fs::File::open(&path)
                    .await
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                let payload = UploadPayload::new(content_type, file);

                if !storage.upload(payload, &key, &bucket, Some(cancel)).await? {
                    bail!("{} was stored with zero size", path.display());
                }
                Ok(Outcome::Text(format!("{bucket}/{key}")))
            }
            Self::Url {
                bucket,
                key,
                expires_in,
                endpoint,
            } => {
                let url = storage.get_url(&bucket, &key, expires_in, &endpoint).await?;
                Ok(Outcome::Text(url))
            }
            Self::Delete { bucket, key } => {
                storage.delete(&bucket, &key, Some(cancel)).await?;
                Ok(Outcome::Done)
            }
            Self::Get {
                bucket,
                key,
                output,
            } => {
                let data = storage
                    .get_file_as_stream(&bucket, &key, Some(cancel))
                    .await?;
                match output {
                    Some(path) => {
                        tokio::fs::write(&path, &data)
                            .await
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        info!(path = %path.display(), size = data.len(), "Object saved");
                        Ok(Outcome::Done)
                    }
                    None => Ok(Outcome::Bytes(data)),
                }
            }
            Self::Base64 { bucket, key } => {
                let encoded = storage
                    .get_file_as_base64(&bucket, &key, Some(cancel))
                    .await?;
                Ok(Outcome::Text(encoded))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use objstore_core::StorageError;
    use objstore_storage::{MemoryBackend, StorageService};

    use super::*;

    fn context() -> ServiceContext<MemoryBackend> {
        ServiceContext::new(Arc::new(StorageService::new(MemoryBackend::new())))
    }

    async fn upload_file(ctx: &ServiceContext<MemoryBackend>, contents: &[u8]) -> Outcome {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), contents).unwrap();

        Command::Upload {
            path: file.path().to_path_buf(),
            bucket: "cli".to_string(),
            key: "file.txt".to_string(),
            content_type: "text/plain".to_string(),
        }
        .run(ctx, &CancellationToken::new())
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn upload_then_get_and_base64() {
        let ctx = context();
        let token = CancellationToken::new();

        assert_eq!(
            upload_file(&ctx, b"hello").await,
            Outcome::Text("cli/file.txt".to_string())
        );

        let got = Command::Get {
            bucket: "cli".to_string(),
            key: "file.txt".to_string(),
            output: None,
        }
        .run(&ctx, &token)
        .await
        .unwrap();
        assert_eq!(got, Outcome::Bytes(Bytes::from_static(b"hello")));

        let encoded = Command::Base64 {
            bucket: "cli".to_string(),
            key: "file.txt".to_string(),
        }
        .run(&ctx, &token)
        .await
        .unwrap();
        assert_eq!(encoded, Outcome::Text("aGVsbG8=".to_string()));
    }

    #[tokio::test]
    async fn get_writes_output_file() {
        let ctx = context();
        upload_file(&ctx, b"saved").await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.bin");

        let outcome = Command::Get {
            bucket: "cli".to_string(),
            key: "file.txt".to_string(),
            output: Some(target.clone()),
        }
        .run(&ctx, &CancellationToken::new())
        .await
        .unwrap();

        assert_eq!(outcome, Outcome::Done);
        assert_eq!(std::fs::read(target).unwrap(), b"saved");
    }

    #[tokio::test]
    async fn empty_file_upload_fails() {
        let ctx = context();
        let file = tempfile::NamedTempFile::new().unwrap();

        let result = Command::Upload {
            path: file.path().to_path_buf(),
            bucket: "cli".to_string(),
            key: "empty".to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
        .run(&ctx, &CancellationToken::new())
        .await;

        assert!(result.unwrap_err().to_string().contains("zero size"));
    }

    #[tokio::test]
    async fn missing_object_surfaces_not_found() {
        let ctx = context();
        let err = Command::Get {
            bucket: "cli".to_string(),
            key: "ghost".to_string(),
            output: None,
        }
        .run(&ctx, &CancellationToken::new())
        .await
        .unwrap_err();

        assert!(
            err.downcast_ref::<StorageError>()
                .is_some_and(StorageError::is_not_found)
        );
    }

    #[tokio::test]
    async fn delete_and_url() {
        let ctx = context();
        let token = CancellationToken::new();
        upload_file(&ctx, b"x").await;

        let url = Command::Url {
            bucket: "cli".to_string(),
            key: "file.txt".to_string(),
            expires_in: 30,
            endpoint: "https://public.example.com".to_string(),
        }
        .run(&ctx, &token)
        .await
        .unwrap();
        assert_eq!(
            url,
            Outcome::Text("https://public.example.com/cli/file.txt?X-Amz-Expires=30".to_string())
        );

        let deleted = Command::Delete {
            bucket: "cli".to_string(),
            key: "file.txt".to_string(),
        }
        .run(&ctx, &token)
        .await
        .unwrap();
        assert_eq!(deleted, Outcome::Done);
    }
}
