// Logging setup
//
// Console output always goes through a fmt layer. When file logging is
// enabled a JSON layer is added on top, written by a non-blocking rolling
// appender. The returned guard must stay alive until exit or buffered lines
// are lost.
//
// Precedence: RUST_LOG env var > config file / FRONTDESK_LOG_LEVEL > "info"

use frontdesk::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when RUST_LOG is unset
pub fn default_directive(level: &str) -> String {
    format!("frontdesk={}", level)
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)));

    // Fall back to console-only if the log directory can't be used
    let appender = config.file_appender().unwrap_or_else(|e| {
        eprintln!(
            "Warning: File logging disabled for {}: {:#}",
            config.file_dir.display(),
            e
        );
        None
    });

    let Some(appender) = appender else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;
        return Ok(None);
    };

    // Writes happen on a background thread
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .try_init()?;

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        let directive = default_directive("debug");
        assert_eq!(directive, "frontdesk=debug");
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}
