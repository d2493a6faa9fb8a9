//! S3 storage client implementation.

use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Region, http::HttpResponse},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};
use bytes::Bytes;
use objstore_core::{StorageError, StorageResult, require_non_empty};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::backend::{ObjectBackend, ObjectInfo};

/// Region sent when none is configured. MinIO ignores it.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Provider name attached to the static credentials.
const CREDENTIALS_PROVIDER: &str = "objstore";

/// S3 storage configuration.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// `host:port` or a full URL with scheme
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub use_tls: bool,
    pub region: String,
}

impl S3Config {
    /// Configuration for a plain-HTTP endpoint in the default region.
    pub fn new(
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            use_tls: false,
            region: DEFAULT_REGION.to_string(),
        }
    }

    #[must_use]
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Endpoint as a URL. A bare `host:port` gets a scheme from the TLS flag.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        normalize_endpoint(&self.endpoint, self.use_tls)
    }

    fn validate(&self) -> StorageResult<()> {
        require_non_empty("endpoint", self.endpoint.trim())?;
        require_non_empty("access key", &self.access_key_id)?;
        require_non_empty("secret key", self.secret_access_key.expose_secret())
    }

    /// Bucket placement for `CreateBucket`. AWS rejects an explicit
    /// `us-east-1` constraint and requires one for every other region.
    fn bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        let region = self.region.trim();
        if region.is_empty() || region == DEFAULT_REGION {
            return None;
        }
        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build(),
        )
    }
}

fn normalize_endpoint(endpoint: &str, use_tls: bool) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.contains("://") {
        endpoint.to_string()
    } else if use_tls {
        format!("https://{endpoint}")
    } else {
        format!("http://{endpoint}")
    }
}

/// S3 storage backend holding one long-lived client.
///
/// The client is cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct S3Backend {
    client: Client,
    config: S3Config,
}

impl S3Backend {
    /// Create a new S3 backend. No request is sent until the first operation.
    ///
    /// # Errors
    /// Returns `StorageError::InvalidArgument` if the endpoint or either
    /// credential is empty.
    pub fn new(config: S3Config) -> StorageResult<Self> {
        let backend = Self::build(config)?;
        info!(
            endpoint = %backend.config.endpoint_url(),
            tls = backend.config.use_tls,
            "S3 storage initialized"
        );
        Ok(backend)
    }

    fn build(config: S3Config) -> StorageResult<Self> {
        config.validate()?;

        let credentials = Credentials::new(
            &config.access_key_id,
            config.secret_access_key.expose_secret(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let endpoint = config.endpoint_url();
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &S3Config {
        &self.config
    }
}

/// Map an SDK failure onto the storage error taxonomy.
fn classify<E>(err: SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let detail = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StorageError::Transport(detail)
        }
        SdkError::ServiceError(service) => {
            classify_service(service.err().code(), service.raw().status().as_u16(), detail)
        }
        _ => StorageError::Unknown(detail),
    }
}

fn classify_service(code: Option<&str>, status: u16, detail: String) -> StorageError {
    match (code, status) {
        (Some("NoSuchKey" | "NoSuchBucket" | "NotFound"), _) | (_, 404) => {
            StorageError::NotFound(detail)
        }
        (Some("AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch"), _)
        | (_, 401 | 403) => StorageError::Unauthorized(detail),
        _ => StorageError::Unknown(detail),
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => match classify(e) {
                StorageError::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn create_bucket(&self, bucket: &str) -> StorageResult<()> {
        let request = self
            .client
            .create_bucket()
            .bucket(bucket)
            .set_create_bucket_configuration(self.config.bucket_configuration());

        match request.send().await {
            Ok(_) => {
                info!(bucket = %bucket, "Bucket created");
                Ok(())
            }
            Err(e) => {
                if e.as_service_error()
                    .is_some_and(|service| service.is_bucket_already_owned_by_you())
                {
                    debug!(bucket = %bucket, "Bucket created concurrently");
                    return Ok(());
                }
                Err(classify(e))
            }
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<ObjectInfo> {
        let size = data.len() as u64;
        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .content_length(i64::try_from(size).unwrap_or(i64::MAX))
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(classify)?;

        Ok(ObjectInfo {
            size,
            content_type: Some(content_type.to_string()),
            e_tag: output.e_tag().map(str::to_string),
        })
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectInfo> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(classify)?;

        Ok(ObjectInfo {
            size: output
                .content_length()
                .and_then(|len| u64::try_from(len).ok())
                .unwrap_or_default(),
            content_type: output.content_type().map(str::to_string),
            e_tag: output.e_tag().map(str::to_string),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(classify)?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Transport(format!("Failed to read object body: {e}")))?;

        Ok(body.into_bytes())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presigning_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Unknown(format!("Invalid presign duration: {e}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(classify)?;

        Ok(presigned.uri().to_string())
    }

    fn with_endpoint(&self, endpoint: &str) -> StorageResult<Self> {
        let mut config = self.config.clone();
        config.endpoint = endpoint.to_string();
        let backend = Self::build(config)?;
        debug!(endpoint = %backend.config.endpoint_url(), "Scoped S3 client created");
        Ok(backend)
    }
}
