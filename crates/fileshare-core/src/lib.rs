//! Fileshare Core Library
//!
//! This crate provides the domain models, error types, configuration, formatting and
//! validation shared by the API client, the client state machine and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{AuthHeader, ClientConfig};
pub use error::{ClientError, ErrorMetadata, LogLevel};
pub use format::{format_bytes, format_timestamp, usage_percent};
