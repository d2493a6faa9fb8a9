//! Core module with the shared service context.

pub mod service_context;

pub use service_context::ServiceContext;
