//! Constants shared by the client crates.

/// Largest file the client will put in the upload queue (500 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Delay before a successful upload is removed from the queue.
pub const SUCCESS_REMOVAL_DELAY_MS: u64 = 4000;

/// Entry point the session navigates to when the backend answers 401.
pub const LOGIN_PATH: &str = "/login";

/// Multipart field name the upload endpoint reads files from.
pub const UPLOAD_FIELD_NAME: &str = "files";

pub const GENERIC_REQUEST_FAILED: &str = "The request could not be completed.";
pub const GENERIC_UPLOAD_FAILED: &str = "Upload failed.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Check your connection and try again.";
pub const MALFORMED_RESPONSE_MESSAGE: &str = "The server returned an unexpected response.";
