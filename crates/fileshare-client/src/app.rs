//! Upload driver and action dispatcher.
//!
//! [`FileShareApp`] is the single owner of [`AppState`]. Upload attempts and auto-removal
//! timers run as tokio tasks that only hold their payload and a sender; they report back
//! through an unbounded channel and the app applies the events one at a time, so the
//! queue and the registry are never touched from anywhere else.

use std::sync::Arc;
use std::time::Duration;

use fileshare_api_client::{
    ApiClient, FileShareApi, ProgressCallback, UploadProgress, UploadResponse, UploadSource,
};
use fileshare_core::constants::{GENERIC_UPLOAD_FAILED, NETWORK_ERROR_MESSAGE};
use fileshare_core::models::{CopyUrlMode, FileRecord};
use fileshare_core::validation::{validate_file_name, validate_slug};
use fileshare_core::{ClientConfig, ClientError, ErrorMetadata};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

use crate::queue::AddOutcome;
use crate::render::{render, View};
use crate::state::AppState;

/// Messages sent by upload attempts and removal timers to the owning app.
#[derive(Debug)]
pub enum UploadEvent {
    Progress {
        item_id: Uuid,
        progress: UploadProgress,
    },
    Finished {
        item_id: Uuid,
        result: Result<UploadResponse, ClientError>,
    },
    ExpireSuccess {
        item_id: Uuid,
    },
}

pub struct FileShareApp<A> {
    api: Arc<A>,
    state: AppState,
    events_tx: mpsc::UnboundedSender<UploadEvent>,
    events_rx: mpsc::UnboundedReceiver<UploadEvent>,
    success_removal_delay: Duration,
    outstanding_attempts: usize,
    pending_expiries: usize,
}

impl FileShareApp<ApiClient> {
    /// App talking HTTP to the configured backend.
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let api = ApiClient::from_config(config)?;
        Ok(Self::new(api, config))
    }
}

impl<A: FileShareApi + 'static> FileShareApp<A> {
    pub fn new(api: A, config: &ClientConfig) -> Self {
        Self::from_shared(Arc::new(api), config)
    }

    pub fn from_shared(api: Arc<A>, config: &ClientConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            api,
            state: AppState::new(config),
            events_tx,
            events_rx,
            success_removal_delay: config.success_removal_delay,
            outstanding_attempts: 0,
            pending_expiries: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Dismiss expired notifications, then project the state.
    pub fn render(&mut self) -> View {
        self.state.dismiss_expired();
        render(&self.state)
    }

    /// Upload attempts that have not reported completion yet.
    pub fn outstanding_uploads(&self) -> usize {
        self.outstanding_attempts
    }

    /// Surface a failure: 401 becomes the login redirect, anything else one notification.
    fn fail(&mut self, err: ClientError) -> ClientError {
        if err.is_unauthorized() {
            self.state.session.redirect_to_login();
        } else {
            self.state.notifications.report(&err);
        }
        self.state.touch();
        err
    }

    // ---- Registry synchronization ----

    /// Replace the registry with the server's listing.
    pub async fn refresh(&mut self, notify: bool) -> Result<(), ClientError> {
        match self.api.list_files().await {
            Ok(listing) => {
                self.state.registry.replace_all(listing);
                tracing::debug!(
                    files = self.state.registry.len(),
                    total_size = self.state.registry.total_size(),
                    "File list refreshed"
                );
                if notify {
                    self.state.notifications.success("File list updated.");
                }
                self.state.touch();
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    // ---- Upload queue ----

    /// Queue files for upload. Oversized files are rejected with one notification each.
    pub fn add_files(&mut self, candidates: Vec<UploadSource>) -> AddOutcome {
        let outcome = self.state.queue.add(candidates);
        for rejected in &outcome.rejected {
            self.state.notifications.report(rejected);
        }
        match outcome.accepted.len() {
            0 => {}
            1 => {
                self.state.notifications.success("1 file added to the queue.");
            }
            n => {
                self.state
                    .notifications
                    .success(format!("{} files added to the queue.", n));
            }
        }
        self.state.touch();
        outcome
    }

    /// Remove a queued upload that has not started yet.
    pub fn remove_upload(&mut self, item_id: Uuid) -> Result<(), ClientError> {
        match self.state.queue.remove(item_id) {
            Ok(item) => {
                tracing::debug!(item_id = %item_id, file_name = %item.file_name(), "Removed queued upload");
                self.state.touch();
                Ok(())
            }
            Err(err) => {
                self.state.notifications.info(err.user_message());
                self.state.touch();
                Err(err)
            }
        }
    }

    /// Start every pending upload concurrently. Returns how many attempts were started.
    pub fn start_upload(&mut self) -> usize {
        let pending = self.state.queue.pending_ids();
        if pending.is_empty() {
            self.state.notifications.info("No files waiting for upload.");
            self.state.touch();
            return 0;
        }

        let mut started = 0;
        for item_id in pending {
            let source = match self.state.queue.get_mut(item_id).map(|item| item.begin()) {
                Some(Ok(source)) => source,
                Some(Err(err)) => {
                    tracing::warn!(item_id = %item_id, error = %err, "Skipping upload");
                    continue;
                }
                None => continue,
            };
            tracing::info!(
                item_id = %item_id,
                file_name = %source.file_name,
                size = source.size(),
                "Starting upload"
            );
            self.spawn_attempt(item_id, source);
            started += 1;
        }
        self.state.touch();
        started
    }

    fn spawn_attempt(&mut self, item_id: Uuid, source: UploadSource) {
        let api = Arc::clone(&self.api);
        let finished_tx = self.events_tx.clone();
        let progress_tx = self.events_tx.clone();
        let progress: ProgressCallback = Arc::new(move |progress| {
            let _ = progress_tx.send(UploadEvent::Progress { item_id, progress });
        });

        self.outstanding_attempts += 1;
        tokio::spawn(async move {
            let result = api.upload_file(source, progress).await;
            if finished_tx
                .send(UploadEvent::Finished { item_id, result })
                .is_err()
            {
                tracing::debug!(item_id = %item_id, "Upload finished after the app was dropped");
            }
        });
    }

    fn schedule_expiry(&mut self, item_id: Uuid) {
        let deadline = Instant::now() + self.success_removal_delay;
        let tx = self.events_tx.clone();
        self.pending_expiries += 1;
        tokio::spawn(async move {
            sleep_until(deadline).await;
            let _ = tx.send(UploadEvent::ExpireSuccess { item_id });
        });
    }

    /// Wait for the next event and apply it. Returns `false` when nothing is in flight.
    pub async fn process_next_event(&mut self) -> bool {
        if self.outstanding_attempts == 0 && self.pending_expiries == 0 {
            return false;
        }
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply_event(event).await;
                true
            }
            None => false,
        }
    }

    /// Apply every event that has already arrived without waiting. Returns the count.
    pub async fn process_ready_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event).await;
            applied += 1;
        }
        applied
    }

    /// Apply events until every started upload has finished.
    pub async fn wait_for_uploads(&mut self) {
        while self.outstanding_attempts > 0 {
            if !self.process_next_event().await {
                break;
            }
        }
    }

    /// Apply events until uploads have finished and finished items have been removed.
    pub async fn run_until_idle(&mut self) {
        while self.process_next_event().await {}
    }

    async fn apply_event(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::Progress { item_id, progress } => {
                let changed = self
                    .state
                    .queue
                    .get_mut(item_id)
                    .is_some_and(|item| item.record_progress(progress.percent()));
                if changed {
                    self.state.touch();
                }
            }
            UploadEvent::Finished { item_id, result } => {
                self.outstanding_attempts = self.outstanding_attempts.saturating_sub(1);
                match result {
                    Ok(response) => self.complete_upload(item_id, response).await,
                    Err(ClientError::Unauthorized) => {
                        tracing::warn!(item_id = %item_id, "Upload rejected: authentication required");
                        self.state.session.redirect_to_login();
                        self.state.touch();
                    }
                    Err(err) => self.fail_upload(item_id, err),
                }
            }
            UploadEvent::ExpireSuccess { item_id } => {
                self.pending_expiries = self.pending_expiries.saturating_sub(1);
                if self.state.queue.expire_success(item_id) {
                    tracing::debug!(item_id = %item_id, "Removed finished upload");
                    self.state.touch();
                }
            }
        }
    }

    async fn complete_upload(&mut self, item_id: Uuid, response: UploadResponse) {
        let Some(item) = self.state.queue.get_mut(item_id) else {
            tracing::warn!(item_id = %item_id, "Upload finished for an unknown item");
            return;
        };
        let message = response
            .message
            .clone()
            .unwrap_or_else(|| "Upload complete.".to_string());
        if let Err(err) = item.succeed(message) {
            tracing::warn!(item_id = %item_id, error = %err, "Ignoring upload result");
            return;
        }
        item.set_file_url(
            response
                .url
                .clone()
                .or_else(|| response.view_url.clone())
                .or_else(|| response.files.first().and_then(|f| f.view_url.clone())),
        );
        tracing::info!(item_id = %item_id, file_name = %item.file_name(), "Upload succeeded");
        self.schedule_expiry(item_id);
        self.state.touch();

        match response.files.into_iter().next() {
            Some(record) => {
                let file_id = record.id.clone();
                let outcome = self.state.registry.upsert(record);
                tracing::debug!(file_id = %file_id, outcome = ?outcome, "Merged uploaded file");
                self.state.touch();
            }
            None => {
                tracing::debug!(item_id = %item_id, "Upload response without descriptor, refreshing");
                let _ = self.refresh(false).await;
            }
        }
    }

    fn fail_upload(&mut self, item_id: Uuid, err: ClientError) {
        let message = match &err {
            ClientError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            _ => GENERIC_UPLOAD_FAILED.to_string(),
        };

        let Some(item) = self.state.queue.get_mut(item_id) else {
            tracing::warn!(item_id = %item_id, error = %err, "Upload failed for an unknown item");
            return;
        };
        if let Err(transition) = item.fail(message.clone()) {
            tracing::warn!(item_id = %item_id, error = %transition, "Ignoring upload failure");
            return;
        }
        tracing::warn!(
            item_id = %item_id,
            file_name = %item.file_name(),
            error = %err,
            "Upload failed"
        );
        let notice = format!("{}: {}", item.file_name(), message);
        self.state.notifications.error(notice);
        self.state.touch();
    }

    // ---- File actions ----

    fn check_manageable(&self, file_id: &str) -> Result<(), ClientError> {
        let record = self
            .state
            .registry
            .get(file_id)
            .ok_or_else(|| ClientError::NotFound(format!("File {} not found", file_id)))?;
        if !record.can_manage {
            return Err(ClientError::InvalidState(format!(
                "You cannot manage {}",
                record.name
            )));
        }
        Ok(())
    }

    fn local_record(&self, file_id: &str) -> Result<FileRecord, ClientError> {
        self.state
            .registry
            .get(file_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("File {} not found", file_id)))
    }

    #[tracing::instrument(skip(self))]
    pub async fn rename(&mut self, file_id: &str, name: &str) -> Result<FileRecord, ClientError> {
        let name = validate_file_name(name).map_err(|e| self.fail(e))?;
        self.check_manageable(file_id).map_err(|e| self.fail(e))?;

        let envelope = match self.api.rename_file(file_id, &name).await {
            Ok(envelope) => envelope,
            Err(err) => return Err(self.fail(err)),
        };
        let record = envelope.file;
        self.state.registry.upsert(record.clone());
        self.state
            .notifications
            .success(envelope.message.unwrap_or_else(|| "File renamed.".to_string()));
        self.state.touch();
        Ok(record)
    }

    /// Return the record with a share link, creating the link only if it is missing.
    /// With `require_raw` the direct link must be present too.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_share_link(
        &mut self,
        file_id: &str,
        require_raw: bool,
    ) -> Result<FileRecord, ClientError> {
        let record = self.local_record(file_id).map_err(|e| self.fail(e))?;
        if record.has_share_link(require_raw) {
            return Ok(record);
        }
        self.check_manageable(file_id).map_err(|e| self.fail(e))?;

        let link = match self.api.create_share(file_id).await {
            Ok(link) => link,
            Err(err) => return Err(self.fail(err)),
        };
        let updated = self
            .state
            .registry
            .update(file_id, |file| file.apply_share(&link))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("File {} not found", file_id)))
            .map_err(|e| self.fail(e))?;

        tracing::info!(file_id = %file_id, share_url = %link.share_url, "Share link created");
        self.state.notifications.success(
            link.message
                .clone()
                .unwrap_or_else(|| "Share link created.".to_string()),
        );
        self.state.touch();
        Ok(updated)
    }

    /// Make a file public.
    pub async fn share(&mut self, file_id: &str) -> Result<FileRecord, ClientError> {
        self.ensure_share_link(file_id, false).await
    }

    /// Revoke the share link, hiding the file from the public again.
    #[tracing::instrument(skip(self))]
    pub async fn hide(&mut self, file_id: &str) -> Result<FileRecord, ClientError> {
        self.check_manageable(file_id).map_err(|e| self.fail(e))?;

        let response = match self.api.revoke_share(file_id).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(err)),
        };
        let updated = self
            .state
            .registry
            .update(file_id, FileRecord::clear_share)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("File {} not found", file_id)))
            .map_err(|e| self.fail(e))?;

        self.state.notifications.success(
            response
                .message
                .unwrap_or_else(|| "Share link removed.".to_string()),
        );
        self.state.touch();
        Ok(updated)
    }

    /// Replace the share token with a custom slug. The record is replaced by the server's.
    #[tracing::instrument(skip(self))]
    pub async fn set_custom_url(
        &mut self,
        file_id: &str,
        slug: &str,
    ) -> Result<FileRecord, ClientError> {
        let slug = validate_slug(slug).map_err(|e| self.fail(e))?;
        self.check_manageable(file_id).map_err(|e| self.fail(e))?;

        let envelope = match self.api.set_custom_url(file_id, &slug).await {
            Ok(envelope) => envelope,
            Err(err) => return Err(self.fail(err)),
        };
        let record = envelope.file;
        self.state.registry.upsert(record.clone());
        if let Some(message) = envelope.message {
            self.state.notifications.success(message);
        }
        self.state.touch();
        Ok(record)
    }

    /// Delete a file, drop it locally, then resynchronize with a full refresh.
    /// A failing refresh reports itself and does not fail the delete.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&mut self, file_id: &str) -> Result<(), ClientError> {
        self.check_manageable(file_id).map_err(|e| self.fail(e))?;

        let response = match self.api.delete_file(file_id).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(err)),
        };
        self.state.registry.remove(file_id);
        self.state.notifications.success(
            response
                .message
                .unwrap_or_else(|| "File deleted.".to_string()),
        );
        self.state.touch();

        if let Err(err) = self.refresh(false).await {
            tracing::warn!(file_id = %file_id, error = %err, "Refresh after delete failed");
        }
        Ok(())
    }

    /// The link the "copy link" action produces, following the user's copy mode.
    #[tracing::instrument(skip(self))]
    pub async fn copy_link(&mut self, file_id: &str) -> Result<String, ClientError> {
        let mode = self.state.registry.preferences().copy_url_mode;
        let record = match mode {
            CopyUrlMode::View | CopyUrlMode::Download => {
                self.local_record(file_id).map_err(|e| self.fail(e))?
            }
            CopyUrlMode::Share => self.ensure_share_link(file_id, false).await?,
            CopyUrlMode::Raw => self.ensure_share_link(file_id, true).await?,
        };

        let link = match mode {
            CopyUrlMode::View => record.view_url,
            CopyUrlMode::Download => record.download_url,
            CopyUrlMode::Share => record.share_url,
            CopyUrlMode::Raw => record.share_raw_url.or(record.share_url),
        };
        link.filter(|l| !l.is_empty()).ok_or_else(|| {
            self.fail(ClientError::InvalidState(format!(
                "No {} link available for {}",
                mode, record.name
            )))
        })
    }
}
