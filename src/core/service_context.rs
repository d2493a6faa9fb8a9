//! Shared service context.
//!
//! Owns the process-wide storage facade. Built once at startup and passed
//! by reference to whatever needs storage.

use std::sync::Arc;

use objstore_storage::{ObjectBackend, S3Backend, StorageService};

/// Shared infrastructure context.
///
/// Cloning is cheap; every clone points at the same facade and client.
pub struct ServiceContext<B = S3Backend> {
    storage: Arc<StorageService<B>>,
}

impl<B> Clone for ServiceContext<B> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<B: ObjectBackend> ServiceContext<B> {
    /// Creates a new service context.
    #[must_use]
    pub const fn new(storage: Arc<StorageService<B>>) -> Self {
        Self { storage }
    }

    /// Object storage facade.
    #[inline]
    #[must_use]
    pub const fn storage(&self) -> &Arc<StorageService<B>> {
        &self.storage
    }
}
