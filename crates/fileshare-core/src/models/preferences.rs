use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Which link the "copy link" action produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyUrlMode {
    /// Viewer page of the file (requires login)
    #[default]
    View,
    /// Direct download (requires login)
    Download,
    /// Public share page
    Share,
    /// Public link to the raw bytes
    Raw,
}

impl CopyUrlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyUrlMode::View => "view",
            CopyUrlMode::Download => "download",
            CopyUrlMode::Share => "share",
            CopyUrlMode::Raw => "raw",
        }
    }

    /// Whether producing this link needs a public share grant.
    pub fn needs_share_link(&self) -> bool {
        matches!(self, CopyUrlMode::Share | CopyUrlMode::Raw)
    }
}

impl fmt::Display for CopyUrlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CopyUrlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "view" => Ok(CopyUrlMode::View),
            "download" => Ok(CopyUrlMode::Download),
            "share" => Ok(CopyUrlMode::Share),
            "raw" => Ok(CopyUrlMode::Raw),
            other => Err(format!(
                "Invalid copy mode '{}'. Must be: view, download, share, or raw",
                other
            )),
        }
    }
}

// Unknown modes fall back to `view`, the server's own default.
impl<'de> Deserialize<'de> for CopyUrlMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

/// Per-user display preferences, owned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub hide_media_default: bool,
    #[serde(default)]
    pub copy_url_mode: CopyUrlMode,
}
