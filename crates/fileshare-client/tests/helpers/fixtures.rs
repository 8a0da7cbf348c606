use fileshare_api_client::UploadSource;
use fileshare_core::models::{FileRecord, UploadResponse};

pub const MB: usize = 1024 * 1024;

/// Descriptor of a file the current user owns.
pub fn descriptor(id: &str, name: &str, size: u64) -> FileRecord {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "size": size,
        "content_type": "application/octet-stream",
        "uploaded_at": "2024-05-01T10:15:30+00:00",
        "owner": {"id": "u1", "username": "alice"},
        "can_manage": true,
        "is_public": false,
        "view_url": format!("http://files.test/files/{}", id),
        "download_url": format!("http://files.test/api/files/{}/download", id),
        "preview_type": "none"
    }))
    .expect("valid descriptor")
}

pub fn image(id: &str, name: &str, size: u64) -> FileRecord {
    let mut record = descriptor(id, name, size);
    record.content_type = "image/png".into();
    record.preview_type = fileshare_core::models::PreviewType::Image;
    record
}

/// Descriptor of a file shared by someone else.
pub fn foreign(id: &str, name: &str, size: u64) -> FileRecord {
    let mut record = descriptor(id, name, size);
    record.can_manage = false;
    record.owner = None;
    record
}

pub fn upload_response(file: FileRecord) -> UploadResponse {
    UploadResponse {
        message: Some("Upload abgeschlossen.".into()),
        view_url: file.view_url.clone(),
        download_url: file.download_url.clone(),
        files: vec![file],
        ..UploadResponse::default()
    }
}

pub fn payload(name: &str, size: usize) -> UploadSource {
    UploadSource::new(name, vec![0u8; size])
}
