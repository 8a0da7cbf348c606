//! Transient user notifications (info, success, error).
//!
//! Notifications expire after a fixed time-to-live and are dropped the next time the
//! owning state is touched or rendered. Every notification is also emitted as a tracing
//! event so headless runs keep a record of what the user was told.

use std::collections::VecDeque;
use std::time::Duration;

use fileshare_core::{ClientError, ErrorMetadata, LogLevel};
use serde::Serialize;
use tokio::time::Instant;

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Oldest notifications are dropped beyond this many.
pub const MAX_NOTIFICATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}

#[derive(Debug)]
pub struct Notifier {
    entries: VecDeque<Notification>,
    next_id: u64,
    ttl: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 1,
            ttl,
        }
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Info, message.into())
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Success, message.into())
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Error, message.into())
    }

    /// Show the user-facing message of `err`, logged at the error's own level.
    pub fn report(&mut self, err: &ClientError) -> u64 {
        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, code = err.error_code(), "Operation failed"),
            LogLevel::Warn => tracing::warn!(error = %err, code = err.error_code(), "Operation failed"),
            LogLevel::Error => tracing::error!(error = %err, code = err.error_code(), "Operation failed"),
        }
        self.push(NotificationLevel::Error, err.user_message())
    }

    fn push(&mut self, level: NotificationLevel, message: String) -> u64 {
        match level {
            NotificationLevel::Info => tracing::info!(notification = %message, "Notify"),
            NotificationLevel::Success => tracing::info!(notification = %message, "Notify success"),
            NotificationLevel::Error => tracing::warn!(notification = %message, "Notify error"),
        }

        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(Notification {
            id,
            level,
            message,
            created_at: Instant::now(),
        });
        while self.entries.len() > MAX_NOTIFICATIONS {
            self.entries.pop_front();
        }
        id
    }

    /// Retained notifications, oldest first.
    pub fn all(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Drop notifications whose time-to-live has passed. Returns how many were dropped.
    pub fn prune_expired(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|n| !n.is_expired(now, ttl));
        before - self.entries.len()
    }

    /// Take every retained notification, e.g. to print them once.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.entries.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.entries.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_increasing_ids() {
        let mut notifier = Notifier::default();
        let a = notifier.info("a");
        let b = notifier.success("b");
        assert!(b > a);
        assert_eq!(notifier.len(), 2);
        assert_eq!(notifier.last().unwrap().level, NotificationLevel::Success);
    }

    #[test]
    fn report_uses_user_message() {
        let mut notifier = Notifier::default();
        notifier.report(&ClientError::Network("reset by peer".into()));
        let last = notifier.last().unwrap();
        assert_eq!(last.level, NotificationLevel::Error);
        assert_eq!(last.message, fileshare_core::constants::NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn expired_notifications_are_pruned() {
        let mut notifier = Notifier::new(Duration::from_millis(100));
        notifier.info("soon gone");
        assert_eq!(notifier.prune_expired(Instant::now()), 0);

        let later = Instant::now() + Duration::from_millis(150);
        assert_eq!(notifier.prune_expired(later), 1);
        assert!(notifier.is_empty());
    }

    #[test]
    fn keeps_at_most_the_newest_entries() {
        let mut notifier = Notifier::default();
        for i in 0..(MAX_NOTIFICATIONS + 5) {
            notifier.info(format!("n{}", i));
        }
        assert_eq!(notifier.len(), MAX_NOTIFICATIONS);
        assert_eq!(notifier.all().next().unwrap().message, "n5");
    }

    #[test]
    fn drain_empties_the_notifier() {
        let mut notifier = Notifier::default();
        notifier.error("boom");
        notifier.info("hello");
        let drained = notifier.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "boom");
        assert!(notifier.is_empty());
    }
}
