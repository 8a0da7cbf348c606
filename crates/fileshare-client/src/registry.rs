//! Client-side mirror of the server's file list.
//!
//! Records are kept in display order (newest first as delivered by the server) and are
//! unique by id. The total size is recomputed from scratch after every mutation; it is
//! only displayed, never used to admit uploads.

use fileshare_core::models::{FileListing, FileRecord, Preferences};

/// Result of [`FileRegistry::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    files: Vec<FileRecord>,
    total_size: u64,
    capacity: u64,
    preferences: Preferences,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a fresh listing. Preferences are only replaced when the
    /// listing carries them.
    pub fn replace_all(&mut self, listing: FileListing) {
        let FileListing {
            files,
            total_size,
            capacity,
            preferences,
        } = listing;

        self.files = dedup_by_id(files);
        self.capacity = capacity;
        if let Some(preferences) = preferences {
            self.preferences = preferences;
        }
        self.recompute_total();

        if self.total_size != total_size {
            tracing::debug!(
                reported = total_size,
                computed = self.total_size,
                "Server-reported total size differs from the sum of file sizes"
            );
        }
    }

    /// Replace the record with the same id in place, or prepend it.
    pub fn upsert(&mut self, record: FileRecord) -> UpsertOutcome {
        let outcome = match self.files.iter_mut().find(|f| f.id == record.id) {
            Some(existing) => {
                *existing = record;
                UpsertOutcome::Updated
            }
            None => {
                self.files.insert(0, record);
                UpsertOutcome::Inserted
            }
        };
        self.recompute_total();
        outcome
    }

    pub fn remove(&mut self, id: &str) -> Option<FileRecord> {
        let index = self.files.iter().position(|f| f.id == id)?;
        let removed = self.files.remove(index);
        self.recompute_total();
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Mutate one record in place. The total is recomputed afterwards.
    pub fn update<F>(&mut self, id: &str, apply: F) -> Option<&FileRecord>
    where
        F: FnOnce(&mut FileRecord),
    {
        let index = self.files.iter().position(|f| f.id == id)?;
        apply(&mut self.files[index]);
        self.recompute_total();
        self.files.get(index)
    }

    pub fn recompute_total(&mut self) -> u64 {
        self.total_size = self.files.iter().map(|f| f.size).sum();
        self.total_size
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }
}

// A listing with repeated ids keeps the first occurrence.
fn dedup_by_id(files: Vec<FileRecord>) -> Vec<FileRecord> {
    let mut unique: Vec<FileRecord> = Vec::with_capacity(files.len());
    for file in files {
        if unique.iter().any(|f| f.id == file.id) {
            tracing::warn!(file_id = %file.id, "Dropping duplicate file id from listing");
            continue;
        }
        unique.push(file);
    }
    unique
}
