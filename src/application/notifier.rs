use std::time::Duration;

use crate::domain::{Notification, NotificationKind};
use crate::utils::get_timestamp;

/// How long a notification stays visible unless superseded first
pub const NOTIFICATION_TTL: Duration = Duration::from_millis(5000);

/// Holds the single visible notification. Latest wins: each `notify` bumps a
/// generation counter, and an expiry timer only clears the message it was
/// armed for. A timer for a superseded message finds a newer generation and
/// does nothing.
#[derive(Debug, Default)]
pub struct NotificationBroadcaster {
    current: Option<Notification>,
    generation: u64,
}

impl NotificationBroadcaster {
    /// Replace the visible notification. Returns the generation the caller
    /// should hand to its expiry timer.
    pub fn notify(&mut self, kind: NotificationKind, text: impl Into<String>) -> u64 {
        self.generation += 1;
        self.current = Some(Notification {
            kind,
            text: text.into(),
            created_at: get_timestamp(),
        });
        self.generation
    }

    /// Clear the notification the given timer was armed for. Returns whether
    /// anything was actually cleared.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation == self.generation && self.current.is_some() {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }
}
