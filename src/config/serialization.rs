//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the full config as a commented TOML file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# frontdesk configuration
#
# Environment overrides: FRONTDESK_REVEAL_THRESHOLD, FRONTDESK_CAROUSEL_INTERVAL_MS,
# FRONTDESK_SUBMIT_DELAY_MS, FRONTDESK_LOG_LEVEL (and RUST_LOG for filters)

# Reveal-on-scroll: share of a section (0.0 - 1.0) that must be on screen
[reveal]
threshold = {threshold:?}

# Testimonial carousel
[carousel]
interval_ms = {interval_ms}
on_manual = "{on_manual}"  # keep (timer untouched) or restart (manual moves reset the countdown)

# Booking wizard submission (simulated endpoint)
[booking]
submit_delay_ms = {booking_delay}
submit_timeout_ms = {booking_timeout}  # 0 = wait forever

# Contact form submission (simulated endpoint)
[contact]
submit_delay_ms = {contact_delay}
submit_timeout_ms = {contact_timeout}

# About-section count-up animation
[stats]
start_delay_ms = {stats_delay}
duration_ms = {stats_duration}
steps = {stats_steps}

# Toast notifications
[notifications]
toast_secs = {toast_secs}
capacity = {toast_capacity}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# JSON file logging (in addition to stdout)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            threshold = self.reveal.threshold,
            interval_ms = self.carousel.interval_ms,
            on_manual = self.carousel.on_manual.as_str(),
            booking_delay = self.booking.submit_delay_ms,
            booking_timeout = self.booking.submit_timeout_ms,
            contact_delay = self.contact.submit_delay_ms,
            contact_timeout = self.contact.submit_timeout_ms,
            stats_delay = self.stats.start_delay_ms,
            stats_duration = self.stats.duration_ms,
            stats_steps = self.stats.steps,
            toast_secs = self.notifications.toast_secs,
            toast_capacity = self.notifications.capacity,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display().to_string().replace('\\', "/"),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
