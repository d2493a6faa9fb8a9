//! Core library with shared error handling and validation.
//!
//! This crate provides reusable components for the storage crates:
//! - `StorageError` with input errors kept apart from storage failures
//! - Sentinel collapsing for callers that only need success/failure
//! - Argument validation helpers
//! - Empty-as-none string helpers

pub mod error;
pub mod str_ext;
pub mod validation;

pub use error::{SentinelExt, StorageError, StorageResult};
pub use str_ext::StrExt;
pub use validation::{require_non_empty, require_object_path};
