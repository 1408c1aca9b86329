//! Configuration for the controllers and the demo runner
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/frontdesk/config.toml)
//! 3. Built-in defaults (lowest priority)

use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod controllers;
mod observability;
mod serialization;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (maintain public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use controllers::{
    CarouselConfig, FileCarouselConfig, FileNotificationConfig, FileRevealConfig, FileStatsConfig,
    FileSubmitConfig, NotificationConfig, RevealConfig, StatsConfig, SubmitConfig,
};
pub use observability::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment overrides
pub mod env {
    pub const CAROUSEL_INTERVAL_MS: &str = "FRONTDESK_CAROUSEL_INTERVAL_MS";
    pub const REVEAL_THRESHOLD: &str = "FRONTDESK_REVEAL_THRESHOLD";
    pub const SUBMIT_DELAY_MS: &str = "FRONTDESK_SUBMIT_DELAY_MS";
    pub const LOG_LEVEL: &str = "FRONTDESK_LOG_LEVEL";
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Reveal-on-scroll trigger
    pub reveal: RevealConfig,

    /// Testimonial carousel timing
    pub carousel: CarouselConfig,

    /// Booking wizard submission
    pub booking: SubmitConfig,

    /// Contact form submission
    pub contact: SubmitConfig,

    /// About-section count-up animation
    pub stats: StatsConfig,

    /// Toast queue
    pub notifications: NotificationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reveal: RevealConfig::default(),
            carousel: CarouselConfig::default(),
            booking: SubmitConfig::booking(),
            contact: SubmitConfig::contact(),
            stats: StatsConfig::default(),
            notifications: NotificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure, every key optional
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    /// Optional [reveal] section
    pub reveal: Option<FileRevealConfig>,

    /// Optional [carousel] section
    pub carousel: Option<FileCarouselConfig>,

    /// Optional [booking] section
    pub booking: Option<FileSubmitConfig>,

    /// Optional [contact] section
    pub contact: Option<FileSubmitConfig>,

    /// Optional [stats] section
    pub stats: Option<FileStatsConfig>,

    /// Optional [notifications] section
    pub notifications: Option<FileNotificationConfig>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/frontdesk/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("frontdesk").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        // Don't overwrite existing config
        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Silently fail - config is optional
            }
        }

        // Use Config::default().to_toml() as single source of truth
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Parse config file contents
    pub(crate) fn parse_file(contents: &str) -> anyhow::Result<FileConfig> {
        toml::from_str(contents).context("Invalid configuration file")
    }

    /// Load file config if it exists
    ///
    /// A missing file means defaults. A file that exists but can't be read
    /// or parsed is an error: a broken config should fail loudly, not fall
    /// back to defaults while the user debugs the wrong thing.
    fn load_file_config() -> anyhow::Result<FileConfig> {
        let Some(path) = Self::config_path() else {
            return Ok(FileConfig::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse_file(&contents)
                .with_context(|| format!("Failed to load {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(e).with_context(|| format!("Cannot read {}", path.display())),
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let file = Self::load_file_config()?;
        Ok(Self::from_sources(file, |key| std::env::var(key).ok()))
    }

    /// Resolve a parsed file against an environment lookup
    pub(crate) fn from_sources(file: FileConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut reveal = RevealConfig::from_file(file.reveal);
        let mut carousel = CarouselConfig::from_file(file.carousel);
        let mut booking = SubmitConfig::from_file(file.booking, SubmitConfig::booking());
        let mut contact = SubmitConfig::from_file(file.contact, SubmitConfig::contact());
        let stats = StatsConfig::from_file(file.stats);
        let notifications = NotificationConfig::from_file(file.notifications);
        let mut logging = LoggingConfig::from_file(file.logging);

        // Reveal threshold: env > file > default
        if let Some(threshold) = lookup(env::REVEAL_THRESHOLD)
            .and_then(|v| v.parse::<f64>().ok())
            .and_then(RevealConfig::accept_threshold)
        {
            reveal.threshold = threshold;
        }

        // Carousel interval: env > file > default
        if let Some(ms) = lookup(env::CAROUSEL_INTERVAL_MS).and_then(|v| v.parse().ok()) {
            carousel.interval_ms = CarouselConfig::accept_interval(ms);
        }

        // Simulated submit latency: env applies to both forms
        if let Some(ms) = lookup(env::SUBMIT_DELAY_MS).and_then(|v| v.parse().ok()) {
            booking.submit_delay_ms = ms;
            contact.submit_delay_ms = ms;
        }

        // Log level: env > file > default (RUST_LOG still wins at subscriber setup)
        if let Some(level) = lookup(env::LOG_LEVEL) {
            logging.level = level;
        }

        Self {
            reveal,
            carousel,
            booking,
            contact,
            stats,
            notifications,
            logging,
        }
    }
}
