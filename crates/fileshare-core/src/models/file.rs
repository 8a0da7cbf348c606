use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::responses::ShareLink;

/// How a file can be previewed, derived by the server from its content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewType {
    Image,
    Video,
    Audio,
    Text,
    #[default]
    None,
}

impl PreviewType {
    /// Classify a content type the same way the server does.
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.to_lowercase();
        if content_type.starts_with("image/") {
            PreviewType::Image
        } else if content_type.starts_with("video/") {
            PreviewType::Video
        } else if content_type.starts_with("audio/") {
            PreviewType::Audio
        } else if content_type.starts_with("text/") {
            PreviewType::Text
        } else {
            PreviewType::None
        }
    }

    /// Image, video and audio files get an inline player or viewer.
    pub fn is_media(&self) -> bool {
        matches!(
            self,
            PreviewType::Image | PreviewType::Video | PreviewType::Audio
        )
    }

    fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "image" => PreviewType::Image,
            "video" => PreviewType::Video,
            "audio" => PreviewType::Audio,
            "text" => PreviewType::Text,
            _ => PreviewType::None,
        }
    }
}

// Unknown or null classifications fall back to `None` instead of failing the whole listing.
impl<'de> Deserialize<'de> for PreviewType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(PreviewType::parse).unwrap_or_default())
    }
}

/// Owner of a file; only sent to viewers allowed to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

/// Server-owned file metadata mirrored on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub owner: Option<OwnerRef>,
    #[serde(default)]
    pub can_manage: bool,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub share_url: Option<String>,
    #[serde(default)]
    pub share_raw_url: Option<String>,
    #[serde(default)]
    pub share_token: Option<String>,
    #[serde(default)]
    pub view_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub preview_type: PreviewType,
}

impl FileRecord {
    /// Preview classification, derived from the content type when the server sent none.
    pub fn preview(&self) -> PreviewType {
        match self.preview_type {
            PreviewType::None => PreviewType::from_content_type(&self.content_type),
            other => other,
        }
    }

    /// Whether the record already carries a usable share link. With `require_raw`, the
    /// direct-bytes variant must be present as well.
    pub fn has_share_link(&self, require_raw: bool) -> bool {
        let has_url = self.share_url.as_deref().is_some_and(|u| !u.is_empty());
        if !require_raw {
            return has_url;
        }
        has_url && self.share_raw_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// Merge the fields of a freshly created share link and mark the file public.
    ///
    /// Files without an inline preview have no separate raw route; their raw link is the
    /// share link itself, the same way listings describe them.
    pub fn apply_share(&mut self, link: &ShareLink) {
        self.share_url = Some(link.share_url.clone());
        self.share_raw_url = match &link.share_raw_url {
            Some(raw) => Some(raw.clone()),
            None if !self.preview().is_media() => Some(link.share_url.clone()),
            None => None,
        };
        self.share_token = link.share_token.clone();
        self.is_public = true;
    }

    /// Drop every share field after the link was revoked.
    pub fn clear_share(&mut self) {
        self.share_url = None;
        self.share_raw_url = None;
        self.share_token = None;
        self.is_public = false;
    }

    pub fn owner_username(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.username.as_str())
    }
}
