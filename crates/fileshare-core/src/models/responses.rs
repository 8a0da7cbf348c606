//! Response bodies of the backend endpoints.

use serde::{Deserialize, Serialize};

use super::file::FileRecord;
use super::preferences::Preferences;

/// GET /api/files: every visible file plus usage and preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileListing {
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub capacity: u64,
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

/// POST /api/upload. The root-level URLs describe the first uploaded file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub view_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub share_url: Option<String>,
    #[serde(default)]
    pub share_raw_url: Option<String>,
}

impl UploadResponse {
    /// Descriptor of the uploaded file, when the server sent one.
    pub fn uploaded_file(&self) -> Option<&FileRecord> {
        self.files.first()
    }
}

/// POST /api/files/{id}/share
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    pub share_url: String,
    #[serde(default)]
    pub share_raw_url: Option<String>,
    #[serde(default)]
    pub share_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Rename and custom-URL responses: the updated descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEnvelope {
    pub file: FileRecord,
    #[serde(default)]
    pub message: Option<String>,
}

/// Bodies that only carry a status message (delete, revoke, errors).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// GET /healthz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
