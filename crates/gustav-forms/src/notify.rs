//! Transient notification banner.
//!
//! Only one notification is visible at a time; showing a new one replaces it.

use chrono::{DateTime, Duration, Utc};
use gustav_core::constants::NOTIFICATION_DEFAULT_MS;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub shown_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl Notification {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.shown_at + Duration::milliseconds(self.duration_ms as i64)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

#[derive(Debug, Default)]
pub struct NotificationCenter {
    current: Option<Notification>,
    next_id: u64,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a notification with the default lifetime.
    pub fn show(&mut self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        self.show_for(level, message, NOTIFICATION_DEFAULT_MS)
    }

    pub fn show_for(
        &mut self,
        level: NotificationLevel,
        message: impl Into<String>,
        duration_ms: u64,
    ) -> u64 {
        self.show_at(level, message, duration_ms, Utc::now())
    }

    pub fn show_at(
        &mut self,
        level: NotificationLevel,
        message: impl Into<String>,
        duration_ms: u64,
        now: DateTime<Utc>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let message = message.into();
        tracing::debug!(id, level = ?level, message = %message, "Notification shown");

        self.current = Some(Notification {
            id,
            level,
            message,
            shown_at: now,
            duration_ms,
        });
        id
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.show(NotificationLevel::Error, message)
    }

    /// Visible notification at `now`, if it has not expired.
    pub fn visible(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.current.as_ref().filter(|n| !n.is_expired(now))
    }

    /// Most recent notification regardless of expiry.
    pub fn last(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        if self.current.as_ref().is_some_and(|n| n.id == id) {
            self.current = None;
            true
        } else {
            false
        }
    }
}
