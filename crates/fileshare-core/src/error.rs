//! Error types module
//!
//! Every failure the client can run into is one of the `ClientError` variants:
//! validation rejections that never reach the network, authentication failures that
//! send the session back to the login page, application errors reported by the server,
//! transport failures and malformed response bodies.

use std::io;

use crate::constants::{
    GENERIC_REQUEST_FAILED, MALFORMED_RESPONSE_MESSAGE, NETWORK_ERROR_MESSAGE,
};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for failures the user can act on
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error is presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "NETWORK_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether trying the same operation again later may succeed
    fn is_recoverable(&self) -> bool;

    /// Message shown in the notification for this error
    fn user_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("File too large: {name} is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unauthorized: login required")]
    Unauthorized,

    #[error(
        "API request failed with status {status}: {}",
        .message.as_deref().unwrap_or("no message")
    )]
    Api {
        status: u16,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    /// Build an API error from a status code and an optional server-supplied message.
    /// Blank messages count as absent.
    pub fn api(status: u16, message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        ClientError::Api { status, message }
    }

    /// Server-supplied message of an application-level failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::MalformedResponse(format!("JSON parsing error: {}", err))
    }
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        ClientError::InvalidInput(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn client_error_static_metadata(err: &ClientError) -> (&'static str, bool, LogLevel) {
    match err {
        ClientError::FileTooLarge { .. } => ("FILE_TOO_LARGE", false, LogLevel::Warn),
        ClientError::InvalidInput(_) => ("INVALID_INPUT", false, LogLevel::Debug),
        ClientError::NotFound(_) => ("NOT_FOUND", false, LogLevel::Debug),
        ClientError::InvalidState(_) => ("INVALID_STATE", false, LogLevel::Debug),
        ClientError::Unauthorized => ("UNAUTHORIZED", false, LogLevel::Warn),
        ClientError::Api { .. } => ("API_ERROR", false, LogLevel::Warn),
        ClientError::Network(_) => ("NETWORK_ERROR", true, LogLevel::Error),
        ClientError::MalformedResponse(_) => ("MALFORMED_RESPONSE", false, LogLevel::Error),
    }
}

impl ErrorMetadata for ClientError {
    fn error_code(&self) -> &'static str {
        client_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        client_error_static_metadata(self).1
    }

    fn user_message(&self) -> String {
        match self {
            ClientError::FileTooLarge { name, limit, .. } => format!(
                "{} is larger than the upload limit of {}.",
                name,
                crate::format::format_bytes(*limit)
            ),
            ClientError::InvalidInput(msg)
            | ClientError::NotFound(msg)
            | ClientError::InvalidState(msg) => msg.clone(),
            ClientError::Unauthorized => "Authentication required.".to_string(),
            ClientError::Api { message, .. } => message
                .clone()
                .unwrap_or_else(|| GENERIC_REQUEST_FAILED.to_string()),
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ClientError::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        client_error_static_metadata(self).2
    }
}
