#![allow(dead_code)]

pub mod fixtures;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fileshare_api_client::{FileShareApi, ProgressCallback, UploadProgress, UploadSource};
use fileshare_client::FileShareApp;
use fileshare_core::models::{
    FileEnvelope, FileListing, FileRecord, MessageResponse, Preferences, ShareLink,
    UploadResponse,
};
use fileshare_core::{ClientConfig, ClientError};
use tokio::sync::oneshot;

/// Backend calls recorded by [`FakeBackend`], in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Upload(String),
    CreateShare(String),
    RevokeShare(String),
    Rename(String, String),
    CustomUrl(String, String),
    Delete(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    List,
    CreateShare,
    RevokeShare,
    Rename,
    CustomUrl,
    Delete,
}

type UploadResult = Result<UploadResponse, ClientError>;

/// In-memory backend behaving like the real server, with scriptable failures and
/// uploads that only complete when the test releases them.
pub struct FakeBackend {
    files: Mutex<Vec<FileRecord>>,
    capacity: u64,
    preferences: Mutex<Preferences>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<CallKind, VecDeque<ClientError>>>,
    upload_gates: Mutex<HashMap<String, oneshot::Receiver<UploadResult>>>,
    custom_url_response: Mutex<Option<FileEnvelope>>,
    next_id: Mutex<u32>,
}

impl FakeBackend {
    pub fn new(files: Vec<FileRecord>) -> Self {
        Self {
            files: Mutex::new(files),
            capacity: 10 * 1024 * 1024 * 1024,
            preferences: Mutex::new(Preferences::default()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            upload_gates: Mutex::new(HashMap::new()),
            custom_url_response: Mutex::new(None),
            next_id: Mutex::new(100),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn set_preferences(&self, preferences: Preferences) {
        *self.preferences.lock().unwrap() = preferences;
    }

    pub fn server_files(&self) -> Vec<FileRecord> {
        self.files.lock().unwrap().clone()
    }

    /// Make the next call of `kind` fail with `err`.
    pub fn fail_next(&self, kind: CallKind, err: ClientError) {
        self.failures
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(err);
    }

    /// Hold the upload of `file_name` until the returned sender resolves it.
    /// Dropping the sender fails the upload with a network error.
    pub fn gate_upload(&self, file_name: &str) -> oneshot::Sender<UploadResult> {
        let (tx, rx) = oneshot::channel();
        self.upload_gates
            .lock()
            .unwrap()
            .insert(file_name.to_string(), rx);
        tx
    }

    pub fn respond_to_custom_url(&self, envelope: FileEnvelope) {
        *self.custom_url_response.lock().unwrap() = Some(envelope);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_failure(&self, kind: CallKind) -> Result<(), ClientError> {
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(&kind)
            .and_then(VecDeque::pop_front)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find(&self, file_id: &str) -> Result<FileRecord, ClientError> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == file_id)
            .cloned()
            .ok_or_else(|| ClientError::api(404, Some("Datei nicht gefunden.".into())))
    }

    fn store(&self, record: FileRecord) {
        let mut files = self.files.lock().unwrap();
        match files.iter_mut().find(|f| f.id == record.id) {
            Some(existing) => *existing = record,
            None => files.insert(0, record),
        }
    }
}

#[async_trait]
impl FileShareApi for FakeBackend {
    async fn list_files(&self) -> Result<FileListing, ClientError> {
        self.record(Call::List);
        self.take_failure(CallKind::List)?;
        let files = self.server_files();
        Ok(FileListing {
            total_size: files.iter().map(|f| f.size).sum(),
            files,
            capacity: self.capacity,
            preferences: Some(*self.preferences.lock().unwrap()),
        })
    }

    async fn upload_file(
        &self,
        source: UploadSource,
        progress: ProgressCallback,
    ) -> Result<UploadResponse, ClientError> {
        self.record(Call::Upload(source.file_name.clone()));
        let total = source.size();
        progress(UploadProgress {
            sent: total / 2,
            total,
        });

        let gate = self.upload_gates.lock().unwrap().remove(&source.file_name);
        let result = match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ClientError::Network("connection reset".into()))),
            None => {
                let id = {
                    let mut next = self.next_id.lock().unwrap();
                    *next += 1;
                    format!("f{}", *next)
                };
                Ok(fixtures::upload_response(fixtures::descriptor(
                    &id,
                    &source.file_name,
                    total,
                )))
            }
        };

        if let Ok(response) = &result {
            progress(UploadProgress { sent: total, total });
            for file in &response.files {
                self.store(file.clone());
            }
        }
        result
    }

    async fn create_share(&self, file_id: &str) -> Result<ShareLink, ClientError> {
        self.record(Call::CreateShare(file_id.to_string()));
        self.take_failure(CallKind::CreateShare)?;
        let mut record = self.find(file_id)?;
        let token = format!("tok-{}", file_id);
        let link = ShareLink {
            share_url: format!("http://files.test/s/{}", token),
            share_raw_url: record
                .preview()
                .is_media()
                .then(|| format!("http://files.test/s/{}/raw", token)),
            share_token: Some(token),
            message: Some("Freigabelink erstellt.".into()),
        };
        record.apply_share(&link);
        self.store(record);
        Ok(link)
    }

    async fn revoke_share(&self, file_id: &str) -> Result<MessageResponse, ClientError> {
        self.record(Call::RevokeShare(file_id.to_string()));
        self.take_failure(CallKind::RevokeShare)?;
        let mut record = self.find(file_id)?;
        record.clear_share();
        self.store(record);
        Ok(MessageResponse {
            message: Some("Freigabe wurde aufgehoben.".into()),
        })
    }

    async fn rename_file(&self, file_id: &str, name: &str) -> Result<FileEnvelope, ClientError> {
        self.record(Call::Rename(file_id.to_string(), name.to_string()));
        self.take_failure(CallKind::Rename)?;
        let mut record = self.find(file_id)?;
        record.name = name.to_string();
        self.store(record.clone());
        Ok(FileEnvelope {
            file: record,
            message: Some("Datei wurde umbenannt.".into()),
        })
    }

    async fn set_custom_url(&self, file_id: &str, slug: &str) -> Result<FileEnvelope, ClientError> {
        self.record(Call::CustomUrl(file_id.to_string(), slug.to_string()));
        self.take_failure(CallKind::CustomUrl)?;
        let scripted = self.custom_url_response.lock().unwrap().take();
        let envelope = match scripted {
            Some(envelope) => envelope,
            None => {
                let mut record = self.find(file_id)?;
                record.share_token = Some(slug.to_string());
                record.share_url = Some(format!("http://files.test/s/{}", slug));
                record.is_public = true;
                FileEnvelope {
                    file: record,
                    message: Some("Benutzerdefinierter Link gespeichert.".into()),
                }
            }
        };
        self.store(envelope.file.clone());
        Ok(envelope)
    }

    async fn delete_file(&self, file_id: &str) -> Result<MessageResponse, ClientError> {
        self.record(Call::Delete(file_id.to_string()));
        self.take_failure(CallKind::Delete)?;
        self.find(file_id)?;
        self.files.lock().unwrap().retain(|f| f.id != file_id);
        Ok(MessageResponse {
            message: Some("Datei wurde gelöscht.".into()),
        })
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::default()
}

/// App over `backend` with the registry loaded by an initial refresh.
/// The initial listing call is cleared from the call log.
pub async fn setup_app(backend: Arc<FakeBackend>) -> FileShareApp<FakeBackend> {
    setup_app_with_config(backend, &test_config()).await
}

pub async fn setup_app_with_config(
    backend: Arc<FakeBackend>,
    config: &ClientConfig,
) -> FileShareApp<FakeBackend> {
    let mut app = FileShareApp::from_shared(backend.clone(), config);
    app.refresh(false)
        .await
        .expect("initial refresh against the fake backend");
    backend.clear_calls();
    app
}
