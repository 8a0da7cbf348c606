//! Everything the client knows, owned by one [`crate::FileShareApp`].

use fileshare_core::ClientConfig;
use tokio::time::Instant;

use crate::notify::Notifier;
use crate::queue::UploadQueue;
use crate::registry::FileRegistry;
use crate::session::Session;

#[derive(Debug, Default)]
pub struct AppState {
    pub(crate) registry: FileRegistry,
    pub(crate) queue: UploadQueue,
    pub(crate) notifications: Notifier,
    pub(crate) session: Session,
    generation: u64,
}

impl AppState {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            registry: FileRegistry::new(),
            queue: UploadQueue::new(config.max_upload_bytes),
            notifications: Notifier::default(),
            session: Session::new(config.login_path.clone()),
            generation: 0,
        }
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn queue(&self) -> &UploadQueue {
        &self.queue
    }

    pub fn notifications(&self) -> &Notifier {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifier {
        &mut self.notifications
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Bumped on every state change; front ends re-render when it moves.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn touch(&mut self) {
        self.notifications.prune_expired(Instant::now());
        self.generation = self.generation.wrapping_add(1);
    }

    /// Dismiss notifications that outlived their time-to-live. Bumps the generation only
    /// when something was dropped.
    pub fn dismiss_expired(&mut self) -> usize {
        let dropped = self.notifications.prune_expired(Instant::now());
        if dropped > 0 {
            self.generation = self.generation.wrapping_add(1);
        }
        dropped
    }
}
