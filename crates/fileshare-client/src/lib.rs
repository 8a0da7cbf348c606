//! Fileshare client state machine
//!
//! Owns the upload queue, the client-side mirror of the server's file list, transient
//! notifications and the login redirect. [`FileShareApp`] drives uploads as tokio tasks
//! and dispatches file actions against any [`fileshare_api_client::FileShareApi`]
//! backend; [`render`] projects the state into a [`View`] for front ends.

pub mod app;
pub mod notify;
pub mod queue;
pub mod registry;
pub mod render;
pub mod session;
pub mod state;

pub use app::{FileShareApp, UploadEvent};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use queue::{AddOutcome, UploadQueue, UploadQueueItem, UploadStatus};
pub use registry::{FileRegistry, UpsertOutcome};
pub use render::{render, FileAction, FileRow, QueueRow, UsageSummary, View};
pub use session::{Navigation, Session};
pub use state::AppState;
