//! S3/object storage abstraction.
//!
//! Provides a small facade over S3-compatible storage: upload with lazy
//! bucket creation, presigned download URLs (optionally on another
//! endpoint), delete, and whole-object reads as bytes or base64.
//!
//! The facade is generic over [`ObjectBackend`]. [`S3Backend`] talks to an
//! S3-compatible server through `aws-sdk-s3`; [`MemoryBackend`] keeps
//! everything in process.

mod backend;
mod memory;
mod payload;
mod s3;
mod service;

pub use backend::{ObjectBackend, ObjectInfo};
pub use memory::{MEMORY_ENDPOINT, MemoryBackend};
pub use payload::{DEFAULT_CONTENT_TYPE, UploadPayload};
pub use s3::{DEFAULT_REGION, S3Backend, S3Config};
pub use service::{DEFAULT_URL_EXPIRY_SECS, StorageService};
