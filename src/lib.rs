//! objstore: a thin facade over S3-compatible object storage.
//!
//! The storage logic lives in the `objstore-storage` crate; this crate adds
//! configuration, startup wiring, and the CLI commands.

pub mod commands;
pub mod config;
pub mod core;
pub mod startup;

pub use crate::commands::{Command, Outcome};
pub use crate::config::Config;
pub use crate::core::ServiceContext;
