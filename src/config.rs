//! Configuration parsed from CLI arguments and environment variables.

use clap::Parser;
use objstore_storage::{DEFAULT_REGION, S3Config};
use objstore_telemetry::{TelemetryConfig, parse_level};
use secrecy::{ExposeSecret, SecretString};

use crate::commands::Command;

/// Object storage CLI configuration.
///
/// Connection values can be set via environment variables or CLI arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "objstore", about = "S3-compatible object storage client", version)]
pub struct Config {
    /// S3 endpoint, `host:port` or a full URL
    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: String,

    /// S3 access key ID
    #[arg(long, env = "S3_ACCESS_KEY_ID")]
    pub s3_access_key_id: String,

    /// S3 secret access key
    #[arg(long, env = "S3_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub s3_secret_access_key: SecretString,

    /// Use HTTPS for endpoints given without a scheme
    #[arg(long, env = "S3_USE_TLS", default_value = "false")]
    pub s3_use_tls: bool,

    /// S3 region (MinIO ignores it)
    #[arg(long, env = "S3_REGION", default_value = DEFAULT_REGION)]
    pub s3_region: String,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO")]
    pub log_level: String,

    /// Use JSON log format
    #[arg(long, env = "JSON_LOGS", default_value = "false")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("S3 endpoint must not be empty")]
    MissingEndpoint,
    #[error("S3 access key ID must not be empty")]
    MissingAccessKey,
    #[error("S3 secret access key must not be empty")]
    MissingSecretKey,
    #[error("Unknown log level: {0}")]
    InvalidLogLevel(String),
}

impl Config {
    /// Parse and validate configuration.
    pub fn init() -> anyhow::Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.s3_endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        if self.s3_access_key_id.is_empty() {
            return Err(ConfigError::MissingAccessKey);
        }
        if self.s3_secret_access_key.expose_secret().is_empty() {
            return Err(ConfigError::MissingSecretKey);
        }
        if parse_level(&self.log_level).is_none() {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        Ok(())
    }

    /// Storage client settings.
    pub fn s3_config(&self) -> S3Config {
        S3Config {
            endpoint: self.s3_endpoint.clone(),
            access_key_id: self.s3_access_key_id.clone(),
            secret_access_key: self.s3_secret_access_key.clone(),
            use_tls: self.s3_use_tls,
            region: self.s3_region.clone(),
        }
    }

    /// Logging settings.
    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            log_level: self.log_level.clone(),
            json_logs: self.json_logs,
        }
    }
}
