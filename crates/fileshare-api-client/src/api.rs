//! Domain methods for the fileshare API client.
//!
//! [`FileShareApi`] is the backend contract the client state machine is written against;
//! [`ApiClient`] implements it over HTTP. Payload types live in `fileshare_core::models`.

use async_trait::async_trait;
use fileshare_core::models::{
    FileEnvelope, FileListing, HealthStatus, MessageResponse, ShareLink, UploadResponse,
};
use fileshare_core::ClientError;

use crate::upload::{ProgressCallback, UploadSource};
use crate::ApiClient;

fn file_path(file_id: &str) -> String {
    format!("/api/files/{}", urlencoding::encode(file_id))
}

/// Backend calls used by the client.
///
/// Every method maps HTTP 401 to [`ClientError::Unauthorized`], other non-2xx statuses to
/// [`ClientError::Api`] (carrying the server's `message` when present), transport failures
/// to [`ClientError::Network`] and unparsable bodies to [`ClientError::MalformedResponse`].
#[async_trait]
pub trait FileShareApi: Send + Sync {
    /// GET /api/files
    async fn list_files(&self) -> Result<FileListing, ClientError>;

    /// POST /api/upload with one file, reporting body progress through `progress`.
    async fn upload_file(
        &self,
        source: UploadSource,
        progress: ProgressCallback,
    ) -> Result<UploadResponse, ClientError>;

    /// POST /api/files/{id}/share (idempotent on the server)
    async fn create_share(&self, file_id: &str) -> Result<ShareLink, ClientError>;

    /// DELETE /api/files/{id}/share
    async fn revoke_share(&self, file_id: &str) -> Result<MessageResponse, ClientError>;

    /// POST /api/files/{id}/rename
    async fn rename_file(&self, file_id: &str, name: &str) -> Result<FileEnvelope, ClientError>;

    /// POST /api/files/{id}/custom-url
    async fn set_custom_url(&self, file_id: &str, slug: &str)
        -> Result<FileEnvelope, ClientError>;

    /// DELETE /api/files/{id}
    async fn delete_file(&self, file_id: &str) -> Result<MessageResponse, ClientError>;
}

#[async_trait]
impl FileShareApi for ApiClient {
    async fn list_files(&self) -> Result<FileListing, ClientError> {
        self.get("/api/files").await
    }

    async fn upload_file(
        &self,
        source: UploadSource,
        progress: ProgressCallback,
    ) -> Result<UploadResponse, ClientError> {
        tracing::debug!(
            file_name = %source.file_name,
            size = source.size(),
            "Uploading file"
        );
        let form = source.into_form(progress)?;
        self.post_multipart("/api/upload", form).await
    }

    async fn create_share(&self, file_id: &str) -> Result<ShareLink, ClientError> {
        self.post_empty(&format!("{}/share", file_path(file_id)))
            .await
    }

    async fn revoke_share(&self, file_id: &str) -> Result<MessageResponse, ClientError> {
        self.delete(&format!("{}/share", file_path(file_id))).await
    }

    async fn rename_file(&self, file_id: &str, name: &str) -> Result<FileEnvelope, ClientError> {
        let body = serde_json::json!({ "name": name });
        self.post_json(&format!("{}/rename", file_path(file_id)), &body)
            .await
    }

    async fn set_custom_url(
        &self,
        file_id: &str,
        slug: &str,
    ) -> Result<FileEnvelope, ClientError> {
        let body = serde_json::json!({ "slug": slug });
        self.post_json(&format!("{}/custom-url", file_path(file_id)), &body)
            .await
    }

    async fn delete_file(&self, file_id: &str) -> Result<MessageResponse, ClientError> {
        self.delete(&file_path(file_id)).await
    }
}

impl ApiClient {
    /// Service health (GET /healthz, no auth needed).
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get("/healthz").await
    }
}
