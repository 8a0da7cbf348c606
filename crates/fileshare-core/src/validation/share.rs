//! Input validation for file actions
//!
//! Mirrors the server's rules so obviously invalid requests never leave the client:
//! - Custom slugs: letters, digits, `-` and `_`, 4 to 64 characters
//! - New file names: non-empty after trimming

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ClientError;

/// Minimum length of a custom share slug
pub const MIN_SLUG_LENGTH: usize = 4;

/// Maximum length of a custom share slug
pub const MAX_SLUG_LENGTH: usize = 64;

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{4,64}$").expect("slug pattern is valid"));

/// Validate a custom share slug and return it trimmed.
pub fn validate_slug(slug: &str) -> Result<String, ClientError> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(ClientError::InvalidInput(
            "A custom URL is required.".to_string(),
        ));
    }
    if !SLUG_PATTERN.is_match(slug) {
        return Err(ClientError::InvalidInput(format!(
            "The custom URL may only contain letters, digits, '-' and '_' and must be between {} and {} characters long.",
            MIN_SLUG_LENGTH, MAX_SLUG_LENGTH
        )));
    }
    Ok(slug.to_string())
}

/// Validate a new display name and return it trimmed.
pub fn validate_file_name(name: &str) -> Result<String, ClientError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::InvalidInput(
            "A new file name is required.".to_string(),
        ));
    }
    Ok(name.to_string())
}
