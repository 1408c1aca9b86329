//! Controller configuration: reveal, carousel, submissions, count-up, toasts

use crate::controllers::carousel::{TimerPolicy, DEFAULT_INTERVAL};
use crate::controllers::countup::CountUpSettings;
use crate::controllers::reveal::DEFAULT_REVEAL_THRESHOLD;
use crate::notify::{DEFAULT_TOAST_CAPACITY, DEFAULT_TOAST_DURATION};
use crate::submit::{BOOKING_DELAY, CONTACT_DELAY};
use serde::Deserialize;
use std::time::Duration;

/// Default give-up time for a submission
const DEFAULT_SUBMIT_TIMEOUT_MS: u64 = 10_000;

/// Shortest carousel interval accepted from config
pub const MIN_CAROUSEL_INTERVAL_MS: u64 = 500;

// ─────────────────────────────────────────────────────────────────────────────
// Reveal
// ─────────────────────────────────────────────────────────────────────────────

/// Reveal-on-scroll settings
#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    /// Share of a section (0.0 to 1.0) that must be visible to reveal it
    pub threshold: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_REVEAL_THRESHOLD,
        }
    }
}

/// Reveal settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileRevealConfig {
    pub threshold: Option<f64>,
}

impl RevealConfig {
    pub fn from_file(file: Option<FileRevealConfig>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            threshold: file
                .threshold
                .and_then(Self::accept_threshold)
                .unwrap_or(DEFAULT_REVEAL_THRESHOLD),
        }
    }

    /// Clamp into 0.0..=1.0; NaN and infinities are dropped
    pub(crate) fn accept_threshold(raw: f64) -> Option<f64> {
        raw.is_finite().then(|| raw.clamp(0.0, 1.0))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Carousel
// ─────────────────────────────────────────────────────────────────────────────

/// Testimonial carousel settings
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselConfig {
    /// Time each testimonial stays up
    pub interval_ms: u64,
    /// What manual navigation does to the timer
    pub on_manual: TimerPolicy,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            on_manual: TimerPolicy::Keep,
        }
    }
}

/// Carousel settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileCarouselConfig {
    pub interval_ms: Option<u64>,
    pub on_manual: Option<TimerPolicy>,
}

impl CarouselConfig {
    pub fn from_file(file: Option<FileCarouselConfig>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();
        Self {
            interval_ms: file
                .interval_ms
                .map(Self::accept_interval)
                .unwrap_or(defaults.interval_ms),
            on_manual: file.on_manual.unwrap_or(defaults.on_manual),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub(crate) fn accept_interval(ms: u64) -> u64 {
        ms.max(MIN_CAROUSEL_INTERVAL_MS)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Submissions
// ─────────────────────────────────────────────────────────────────────────────

/// Submission settings for one form
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitConfig {
    /// Latency of the simulated endpoint
    pub submit_delay_ms: u64,
    /// Give up after this long (0 = wait forever)
    pub submit_timeout_ms: u64,
}

impl SubmitConfig {
    pub fn booking() -> Self {
        Self {
            submit_delay_ms: BOOKING_DELAY.as_millis() as u64,
            submit_timeout_ms: DEFAULT_SUBMIT_TIMEOUT_MS,
        }
    }

    pub fn contact() -> Self {
        Self {
            submit_delay_ms: CONTACT_DELAY.as_millis() as u64,
            submit_timeout_ms: DEFAULT_SUBMIT_TIMEOUT_MS,
        }
    }

    pub fn from_file(file: Option<FileSubmitConfig>, defaults: Self) -> Self {
        let file = file.unwrap_or_default();
        Self {
            submit_delay_ms: file.submit_delay_ms.unwrap_or(defaults.submit_delay_ms),
            submit_timeout_ms: file.submit_timeout_ms.unwrap_or(defaults.submit_timeout_ms),
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.submit_timeout_ms > 0).then(|| Duration::from_millis(self.submit_timeout_ms))
    }
}

/// Submission settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileSubmitConfig {
    pub submit_delay_ms: Option<u64>,
    pub submit_timeout_ms: Option<u64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Count-up
// ─────────────────────────────────────────────────────────────────────────────

/// About-section count-up settings
#[derive(Debug, Clone, PartialEq)]
pub struct StatsConfig {
    pub start_delay_ms: u64,
    pub duration_ms: u64,
    pub steps: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        let settings = CountUpSettings::default();
        Self {
            start_delay_ms: settings.start_delay.as_millis() as u64,
            duration_ms: settings.duration.as_millis() as u64,
            steps: settings.steps,
        }
    }
}

/// Count-up settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileStatsConfig {
    pub start_delay_ms: Option<u64>,
    pub duration_ms: Option<u64>,
    pub steps: Option<u32>,
}

impl StatsConfig {
    pub fn from_file(file: Option<FileStatsConfig>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();
        Self {
            start_delay_ms: file.start_delay_ms.unwrap_or(defaults.start_delay_ms),
            duration_ms: file.duration_ms.unwrap_or(defaults.duration_ms),
            steps: file.steps.unwrap_or(defaults.steps).max(1),
        }
    }

    pub fn settings(&self) -> CountUpSettings {
        CountUpSettings {
            start_delay: Duration::from_millis(self.start_delay_ms),
            duration: Duration::from_millis(self.duration_ms),
            steps: self.steps,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Notifications
// ─────────────────────────────────────────────────────────────────────────────

/// Toast queue settings
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationConfig {
    /// Seconds a toast stays on screen
    pub toast_secs: u64,
    /// Toasts kept at once
    pub capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            toast_secs: DEFAULT_TOAST_DURATION.as_secs(),
            capacity: DEFAULT_TOAST_CAPACITY,
        }
    }
}

/// Toast settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileNotificationConfig {
    pub toast_secs: Option<u64>,
    pub capacity: Option<usize>,
}

impl NotificationConfig {
    pub fn from_file(file: Option<FileNotificationConfig>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();
        Self {
            toast_secs: file.toast_secs.unwrap_or(defaults.toast_secs),
            capacity: file.capacity.unwrap_or(defaults.capacity).max(1),
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_secs)
    }
}
