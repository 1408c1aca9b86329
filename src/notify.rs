//! Outcome notices and the toast queue that displays them
//!
//! Controllers report user-facing outcomes (booking confirmed, message
//! failed to send) through a [`NotificationSink`]. The sink is a side
//! channel: fire-and-forget, never part of controller state.
//!
//! [`ToastQueue`] is the in-memory sink the page renders from. Each toast
//! disappears on its own after a display duration, and the queue is bounded
//! so a burst of notices can't grow it without limit.

use crate::util::lock;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default number of toasts kept at once
pub const DEFAULT_TOAST_CAPACITY: usize = 5;

/// Default time a toast stays on screen
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

/// Severity of a notice, drives its styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
            NoticeLevel::Info => "info",
        }
    }
}

/// A user-facing message about something that just happened
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub level: NoticeLevel,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level,
            created_at: Utc::now(),
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, description)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, description)
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, description)
    }
}

/// Where controllers send notices
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// A notice on screen, with its own expiry clock
#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    shown_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(notice: Notice, duration: Duration) -> Self {
        Self {
            notice,
            shown_at: Instant::now(),
            duration,
        }
    }

    /// Check if the toast has expired and should be removed
    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= self.duration
    }
}

/// Bounded queue of live toasts (oldest dropped first when full)
#[derive(Debug, Clone)]
pub struct ToastQueue {
    toasts: Arc<Mutex<VecDeque<Toast>>>,
    capacity: usize,
    duration: Duration,
}

impl ToastQueue {
    pub fn new(capacity: usize, duration: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            toasts: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
            duration,
        }
    }

    /// Unexpired notices, oldest first. Expired toasts are pruned.
    pub fn active(&self) -> Vec<Notice> {
        let mut toasts = lock(&self.toasts);
        toasts.retain(|toast| !toast.is_expired());
        toasts.iter().map(|toast| toast.notice.clone()).collect()
    }

    /// Remove and return every queued notice, expired or not
    pub fn drain(&self) -> Vec<Notice> {
        lock(&self.toasts)
            .drain(..)
            .map(|toast| toast.notice)
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.toasts).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_CAPACITY, DEFAULT_TOAST_DURATION)
    }
}

impl NotificationSink for ToastQueue {
    fn notify(&self, notice: Notice) {
        tracing::debug!(
            level = notice.level.as_str(),
            title = %notice.title,
            "Toast queued"
        );
        let mut toasts = lock(&self.toasts);
        if toasts.len() >= self.capacity {
            toasts.pop_front();
        }
        toasts.push_back(Toast::new(notice, self.duration));
    }
}
