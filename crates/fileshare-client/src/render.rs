//! Pure projection of [`AppState`] into a view model.
//!
//! `render` reads nothing but the state it is given, so the same state always renders
//! the same view. Front ends call it again whenever [`AppState::generation`] moves, and
//! go through [`crate::FileShareApp::render`] to have expired notifications dismissed first.

use fileshare_core::models::{FileRecord, PreviewType};
use fileshare_core::{format_bytes, format_timestamp, usage_percent};
use serde::Serialize;
use uuid::Uuid;

use crate::notify::NotificationLevel;
use crate::queue::{UploadQueueItem, UploadStatus};
use crate::session::Navigation;
use crate::state::AppState;

/// Actions offered on a file row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    CopyLink,
    Download,
    Share,
    Hide,
    Rename,
    CustomUrl,
    Delete,
}

impl FileAction {
    pub fn label(&self) -> &'static str {
        match self {
            FileAction::CopyLink => "copy",
            FileAction::Download => "download",
            FileAction::Share => "share",
            FileAction::Hide => "hide",
            FileAction::Rename => "rename",
            FileAction::CustomUrl => "custom-url",
            FileAction::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRow {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub size_label: String,
    pub uploaded_label: Option<String>,
    pub owner: Option<String>,
    pub preview: PreviewType,
    pub show_preview: bool,
    pub is_public: bool,
    pub share_url: Option<String>,
    pub actions: Vec<FileAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueRow {
    pub id: Uuid,
    pub file_name: String,
    pub size_label: String,
    pub status: UploadStatus,
    pub progress: f64,
    pub message: String,
    pub file_url: Option<String>,
    pub removable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub file_count: usize,
    pub total_size: u64,
    pub capacity: u64,
    pub total_label: String,
    pub capacity_label: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationView {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub redirect: Option<Navigation>,
    pub usage: UsageSummary,
    pub files: Vec<FileRow>,
    pub queue: Vec<QueueRow>,
    pub notifications: Vec<NotificationView>,
}

pub fn render(state: &AppState) -> View {
    let registry = state.registry();
    let hide_media = registry.preferences().hide_media_default;

    View {
        redirect: state.session().navigation().cloned(),
        usage: UsageSummary {
            file_count: registry.len(),
            total_size: registry.total_size(),
            capacity: registry.capacity(),
            total_label: format_bytes(registry.total_size()),
            capacity_label: format_bytes(registry.capacity()),
            percent: usage_percent(registry.total_size(), registry.capacity()),
        },
        files: registry
            .files()
            .iter()
            .map(|file| file_row(file, hide_media))
            .collect(),
        queue: state.queue().items().iter().map(queue_row).collect(),
        notifications: state
            .notifications()
            .all()
            .map(|n| NotificationView {
                id: n.id,
                level: n.level,
                message: n.message.clone(),
            })
            .collect(),
    }
}

fn file_row(file: &FileRecord, hide_media: bool) -> FileRow {
    let preview = file.preview();
    let show_preview = match preview {
        PreviewType::None => false,
        PreviewType::Text => true,
        _ => !hide_media,
    };

    FileRow {
        id: file.id.clone(),
        name: file.name.clone(),
        size: file.size,
        size_label: format_bytes(file.size),
        uploaded_label: file.uploaded_at.as_ref().map(format_timestamp),
        owner: file.owner_username().map(str::to_string),
        preview,
        show_preview,
        is_public: file.is_public,
        share_url: file.share_url.clone(),
        actions: file_actions(file),
    }
}

/// Everyone may copy and download; managing actions need `can_manage`.
pub fn file_actions(file: &FileRecord) -> Vec<FileAction> {
    let mut actions = vec![FileAction::CopyLink];
    if file.download_url.is_some() {
        actions.push(FileAction::Download);
    }
    if file.can_manage {
        actions.push(if file.is_public {
            FileAction::Hide
        } else {
            FileAction::Share
        });
        actions.extend([FileAction::Rename, FileAction::CustomUrl, FileAction::Delete]);
    }
    actions
}

fn queue_row(item: &UploadQueueItem) -> QueueRow {
    QueueRow {
        id: item.id(),
        file_name: item.file_name().to_string(),
        size_label: format_bytes(item.size()),
        status: item.status(),
        progress: item.progress(),
        message: item.message().to_string(),
        file_url: item.file_url().map(str::to_string),
        removable: item.status() == UploadStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileshare_api_client::UploadSource;
    use fileshare_core::models::{CopyUrlMode, FileListing, Preferences};

    fn record(value: serde_json::Value) -> FileRecord {
        serde_json::from_value(value).unwrap()
    }

    fn state_with_files(hide_media: bool) -> AppState {
        let mut state = AppState::default();
        state.registry.replace_all(FileListing {
            files: vec![
                record(serde_json::json!({
                    "id": "f1", "name": "cat.png", "size": 2048,
                    "content_type": "image/png", "can_manage": true,
                    "download_url": "http://files.test/api/files/f1/download",
                    "uploaded_at": "2024-05-01T10:15:30Z"
                })),
                record(serde_json::json!({
                    "id": "f2", "name": "notes.txt", "size": 1024,
                    "content_type": "text/plain", "can_manage": true, "is_public": true,
                    "share_url": "http://files.test/s/tok"
                })),
                record(serde_json::json!({
                    "id": "f3", "name": "shared.bin", "size": 0,
                    "owner": {"username": "bob"}
                })),
            ],
            total_size: 3072,
            capacity: 4096,
            preferences: Some(Preferences {
                hide_media_default: hide_media,
                copy_url_mode: CopyUrlMode::View,
            }),
        });
        state
    }

    #[test]
    fn renders_usage_and_rows() {
        let view = render(&state_with_files(false));
        assert_eq!(view.usage.file_count, 3);
        assert_eq!(view.usage.total_label, "3.0 KB");
        assert_eq!(view.usage.percent, 75.0);
        assert_eq!(view.files[0].uploaded_label.as_deref(), Some("2024-05-01 10:15"));
        assert_eq!(view.files[2].owner.as_deref(), Some("bob"));
        assert!(view.redirect.is_none());
    }

    #[test]
    fn actions_follow_permissions_and_share_state() {
        let view = render(&state_with_files(false));
        assert_eq!(
            view.files[0].actions,
            vec![
                FileAction::CopyLink,
                FileAction::Download,
                FileAction::Share,
                FileAction::Rename,
                FileAction::CustomUrl,
                FileAction::Delete
            ]
        );
        assert!(view.files[1].actions.contains(&FileAction::Hide));
        assert!(!view.files[1].actions.contains(&FileAction::Share));
        assert_eq!(view.files[2].actions, vec![FileAction::CopyLink]);
    }

    #[test]
    fn hide_media_default_hides_media_previews_only() {
        let shown = render(&state_with_files(false));
        assert!(shown.files[0].show_preview);

        let hidden = render(&state_with_files(true));
        assert!(!hidden.files[0].show_preview);
        assert!(hidden.files[1].show_preview);
        assert!(!hidden.files[2].show_preview);
    }

    #[test]
    fn queue_rows_mark_only_pending_as_removable() {
        let mut state = AppState::default();
        let ids = state
            .queue
            .add(vec![
                UploadSource::new("a.bin", vec![0u8; 10]),
                UploadSource::new("b.bin", vec![0u8; 10]),
            ])
            .accepted;
        state.queue.get_mut(ids[1]).unwrap().begin().unwrap();

        let view = render(&state);
        assert!(view.queue[0].removable);
        assert!(!view.queue[1].removable);
        assert_eq!(view.queue[1].status, UploadStatus::Uploading);
    }

    #[test]
    fn redirect_and_notifications_are_projected() {
        let mut state = AppState::default();
        state.notifications.error("Upload failed.");
        state.session.redirect_to_login();

        let view = render(&state);
        assert_eq!(
            view.redirect,
            Some(Navigation::Login {
                path: "/login".into()
            })
        );
        assert_eq!(view.notifications[0].level, NotificationLevel::Error);
        assert_eq!(view.notifications[0].message, "Upload failed.");
    }

    #[test]
    fn render_is_deterministic() {
        let state = state_with_files(true);
        assert_eq!(render(&state), render(&state));
    }
}
