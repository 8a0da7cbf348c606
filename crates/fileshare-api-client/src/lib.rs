//! HTTP client for the fileshare backend.
//!
//! Provides a minimal client with configurable auth (Bearer token or X-API-Token),
//! generic GET/POST/DELETE helpers that map every failure onto [`ClientError`], and the
//! domain methods of [`FileShareApi`] (listing, upload with progress, sharing, rename,
//! custom URL, delete). The client state machine and the CLI use this client directly.

pub mod api;
pub mod upload;

use std::time::Duration;

use anyhow::{Context, Result};
use fileshare_core::{AuthHeader, ClientConfig, ClientError};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Only connection setup is bounded by default; request bodies may take as long as they need.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Token: {token}`
    XApiToken(String),
    /// No credentials; every protected call answers 401.
    Anonymous,
}

impl Auth {
    pub fn from_config(config: &ClientConfig) -> Self {
        match (&config.api_token, config.auth_header) {
            (Some(token), AuthHeader::Bearer) => Auth::Bearer(token.clone()),
            (Some(token), AuthHeader::XApiToken) => Auth::XApiToken(token.clone()),
            (None, _) => Auth::Anonymous,
        }
    }
}

/// HTTP client for the fileshare API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        Self::with_timeout(base_url, auth, None)
    }

    /// Client with an optional total deadline per request.
    pub fn with_timeout(base_url: String, auth: Auth, timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            Client::builder().connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_timeout(
            config.base_url.clone(),
            Auth::from_config(config),
            config.timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiToken(token) => request.header("X-API-Token", token.as_str()),
            Auth::Anonymous => request,
        }
    }

    /// Send a request and turn transport failures and non-2xx statuses into `ClientError`.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %response.url(), "API request rejected: authentication required");
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = serde_json::from_slice::<MessageResponse>(&body)
                .ok()
                .and_then(|r| r.message);
            tracing::debug!(status = status.as_u16(), message = ?message, "API request failed");
            return Err(ClientError::api(status.as_u16(), message));
        }

        Ok(response)
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(self.client.get(self.build_url(path))).await?;
        read_json(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = self.client.post(self.build_url(path)).json(body);
        let response = self.send(request).await?;
        read_json(response).await
    }

    /// POST without a body and deserialize response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(self.client.post(self.build_url(path))).await?;
        read_json(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ClientError> {
        let request = self.client.post(self.build_url(path)).multipart(form);
        let response = self.send(request).await?;
        read_json(response).await
    }

    /// DELETE request. An empty or non-JSON success body yields an empty message.
    pub async fn delete(&self, path: &str) -> Result<MessageResponse, ClientError> {
        let response = self.send(self.client.delete(self.build_url(path))).await?;
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(serde_json::from_slice(&body).unwrap_or_default())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&body).map_err(ClientError::from)
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Network("request timed out".to_string())
    } else {
        ClientError::Network(err.to_string())
    }
}

// Re-export the seam and payload types for convenience.
pub use api::FileShareApi;
pub use fileshare_core::models::{
    FileEnvelope, FileListing, FileRecord, HealthStatus, MessageResponse, ShareLink,
    UploadResponse,
};
pub use upload::{ProgressCallback, UploadProgress, UploadSource};
