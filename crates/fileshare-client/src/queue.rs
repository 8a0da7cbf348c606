//! Upload queue: per-item lifecycle and admission.
//!
//! Each item moves `pending -> uploading -> {success, error}` and never goes back.
//! Transitions are checked here; the network side lives in [`crate::app`].

use std::fmt;

use fileshare_api_client::UploadSource;
use fileshare_core::constants::MAX_UPLOAD_BYTES;
use fileshare_core::ClientError;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Success => "success",
            UploadStatus::Error => "error",
        }
    }

    pub fn can_transition_to(&self, next: UploadStatus) -> bool {
        matches!(
            (self, next),
            (UploadStatus::Pending, UploadStatus::Uploading)
                | (UploadStatus::Uploading, UploadStatus::Success)
                | (UploadStatus::Uploading, UploadStatus::Error)
        )
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One file selected for upload and the state of its attempt.
#[derive(Debug, Clone)]
pub struct UploadQueueItem {
    id: Uuid,
    source: UploadSource,
    status: UploadStatus,
    progress: f64,
    message: String,
    file_url: Option<String>,
}

impl UploadQueueItem {
    pub fn new(source: UploadSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            status: UploadStatus::Pending,
            progress: 0.0,
            message: "Waiting".to_string(),
            file_url: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.source.file_name
    }

    pub fn size(&self) -> u64 {
        self.source.size()
    }

    pub fn source(&self) -> &UploadSource {
        &self.source
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Percentage in `[0, 100]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Link to the uploaded file, once the server confirmed the upload.
    pub fn file_url(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    fn transition(&mut self, next: UploadStatus) -> Result<(), ClientError> {
        if !self.status.can_transition_to(next) {
            return Err(ClientError::InvalidState(format!(
                "Upload {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    /// `pending -> uploading`; hands out the payload for the attempt.
    pub fn begin(&mut self) -> Result<UploadSource, ClientError> {
        self.transition(UploadStatus::Uploading)?;
        self.message = "Uploading".to_string();
        Ok(self.source.clone())
    }

    /// Record upload progress. Ignored unless uploading; never decreases.
    /// Returns whether the visible progress changed.
    pub fn record_progress(&mut self, percent: f64) -> bool {
        if self.status != UploadStatus::Uploading || percent.is_nan() {
            return false;
        }
        let percent = percent.clamp(0.0, 100.0);
        if percent <= self.progress {
            return false;
        }
        self.progress = percent;
        true
    }

    pub fn succeed(&mut self, message: impl Into<String>) -> Result<(), ClientError> {
        self.transition(UploadStatus::Success)?;
        self.progress = 100.0;
        self.message = message.into();
        Ok(())
    }

    pub(crate) fn set_file_url(&mut self, url: Option<String>) {
        self.file_url = url;
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), ClientError> {
        self.transition(UploadStatus::Error)?;
        self.message = message.into();
        Ok(())
    }
}

/// Result of [`UploadQueue::add`].
#[derive(Debug, Default)]
pub struct AddOutcome {
    pub accepted: Vec<Uuid>,
    pub rejected: Vec<ClientError>,
}

/// Reject files above `limit` bytes before they reach the queue.
pub fn check_upload_size(file_name: &str, size: u64, limit: u64) -> Result<(), ClientError> {
    if size > limit {
        return Err(ClientError::FileTooLarge {
            name: file_name.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

#[derive(Debug)]
pub struct UploadQueue {
    items: Vec<UploadQueueItem>,
    max_upload_bytes: u64,
}

impl Default for UploadQueue {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_BYTES)
    }
}

impl UploadQueue {
    pub fn new(max_upload_bytes: u64) -> Self {
        Self {
            items: Vec::new(),
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Append every candidate within the size limit as `pending`, in order. Names are
    /// not deduplicated.
    pub fn add(&mut self, candidates: Vec<UploadSource>) -> AddOutcome {
        let mut outcome = AddOutcome::default();
        for source in candidates {
            if let Err(err) =
                check_upload_size(&source.file_name, source.size(), self.max_upload_bytes)
            {
                outcome.rejected.push(err);
                continue;
            }
            let item = UploadQueueItem::new(source);
            tracing::debug!(
                item_id = %item.id,
                file_name = %item.file_name(),
                size = item.size(),
                "Queued upload"
            );
            outcome.accepted.push(item.id);
            self.items.push(item);
        }
        outcome
    }

    /// Remove a pending item. Items that already started stay.
    pub fn remove(&mut self, id: Uuid) -> Result<UploadQueueItem, ClientError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("Upload {} is not queued", id)))?;

        let status = self.items[index].status;
        if status != UploadStatus::Pending {
            return Err(ClientError::InvalidState(format!(
                "{} can no longer be removed ({})",
                self.items[index].file_name(),
                status
            )));
        }
        Ok(self.items.remove(index))
    }

    pub fn pending_ids(&self) -> Vec<Uuid> {
        self.items
            .iter()
            .filter(|item| item.status == UploadStatus::Pending)
            .map(|item| item.id)
            .collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&UploadQueueItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut UploadQueueItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[UploadQueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, status: UploadStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }

    /// Drop a finished item, but only if it is still in `success`.
    pub fn expire_success(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items
            .retain(|item| !(item.id == id && item.status == UploadStatus::Success));
        self.items.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, size: usize) -> UploadSource {
        UploadSource::new(name, vec![0u8; size])
    }

    #[test]
    fn only_forward_transitions_are_allowed() {
        use UploadStatus::*;
        let all = [Pending, Uploading, Success, Error];
        for from in all {
            for to in all {
                let expected = matches!(
                    (from, to),
                    (Pending, Uploading) | (Uploading, Success) | (Uploading, Error)
                );
                assert_eq!(from.can_transition_to(to), expected, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn item_lifecycle_success() {
        let mut item = UploadQueueItem::new(source("a.txt", 4));
        assert_eq!(item.status(), UploadStatus::Pending);
        assert!(item.succeed("done").is_err());

        let payload = item.begin().unwrap();
        assert_eq!(payload.file_name, "a.txt");
        assert!(item.begin().is_err());

        item.succeed("Upload complete").unwrap();
        assert_eq!(item.status(), UploadStatus::Success);
        assert_eq!(item.progress(), 100.0);
        assert!(item.fail("late").is_err());
        assert_eq!(item.status(), UploadStatus::Success);
    }

    #[test]
    fn progress_is_monotone_and_only_while_uploading() {
        let mut item = UploadQueueItem::new(source("a.txt", 4));
        assert!(!item.record_progress(50.0));
        assert_eq!(item.progress(), 0.0);

        item.begin().unwrap();
        assert!(item.record_progress(40.0));
        assert!(!item.record_progress(30.0));
        assert_eq!(item.progress(), 40.0);
        assert!(item.record_progress(250.0));
        assert_eq!(item.progress(), 100.0);
        assert!(!item.record_progress(f64::NAN));

        item.fail("Upload failed.").unwrap();
        assert!(!item.record_progress(100.0));
        assert_eq!(item.message(), "Upload failed.");
    }

    #[test]
    fn size_limit_is_500_mib_inclusive() {
        assert!(check_upload_size("ok.bin", MAX_UPLOAD_BYTES, MAX_UPLOAD_BYTES).is_ok());
        let err = check_upload_size("big.bin", MAX_UPLOAD_BYTES + 1, MAX_UPLOAD_BYTES)
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::FileTooLarge {
                name: "big.bin".into(),
                size: 524_288_001,
                limit: 524_288_000,
            }
        );
    }

    #[test]
    fn add_rejects_oversized_and_keeps_order() {
        let mut queue = UploadQueue::new(10);
        let outcome = queue.add(vec![
            source("a.txt", 5),
            source("huge.iso", 11),
            source("a.txt", 10),
        ]);
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert!(matches!(
            &outcome.rejected[0],
            ClientError::FileTooLarge { name, .. } if name == "huge.iso"
        ));

        let names: Vec<&str> = queue.items().iter().map(|i| i.file_name()).collect();
        assert_eq!(names, vec!["a.txt", "a.txt"]);
        assert!(queue
            .items()
            .iter()
            .all(|i| i.status() == UploadStatus::Pending && i.progress() == 0.0));
    }

    #[test]
    fn remove_only_while_pending() {
        let mut queue = UploadQueue::default();
        let ids = queue.add(vec![source("a", 1), source("b", 1)]).accepted;

        queue.get_mut(ids[1]).unwrap().begin().unwrap();
        assert!(matches!(
            queue.remove(ids[1]),
            Err(ClientError::InvalidState(_))
        ));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.remove(ids[0]).unwrap().file_name(), "a");
        assert!(matches!(queue.remove(ids[0]), Err(ClientError::NotFound(_))));
        assert_eq!(queue.pending_ids(), Vec::<Uuid>::new());
    }

    #[test]
    fn expire_success_skips_other_statuses() {
        let mut queue = UploadQueue::default();
        let ids = queue.add(vec![source("a", 1), source("b", 1)]).accepted;
        for id in &ids {
            queue.get_mut(*id).unwrap().begin().unwrap();
        }
        queue.get_mut(ids[0]).unwrap().succeed("ok").unwrap();
        queue.get_mut(ids[1]).unwrap().fail("no").unwrap();

        assert!(!queue.expire_success(ids[1]));
        assert!(queue.expire_success(ids[0]));
        assert!(!queue.expire_success(ids[0]));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.count(UploadStatus::Error), 1);
    }
}
