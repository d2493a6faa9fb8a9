//! Startup and wiring.

use std::sync::Arc;

use objstore_storage::{S3Backend, StorageService};
use tracing::info;

use crate::config::Config;
use crate::core::ServiceContext;

/// Build the storage client and register the shared facade.
///
/// No request is sent here; a wrong endpoint or credentials surface on
/// the first operation.
pub fn build_context(config: &Config) -> anyhow::Result<ServiceContext> {
    let backend = S3Backend::new(config.s3_config())?;
    let storage = Arc::new(StorageService::new(backend));
    info!("Storage service registered");
    Ok(ServiceContext::new(storage))
}
