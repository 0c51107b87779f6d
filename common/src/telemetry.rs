// Telemetry module for structured logging

use crate::config::LogFormat;
use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Build the level filter; `RUST_LOG` takes precedence over the configured level
pub fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()))
}

/// Initialize the process-wide log sink
///
/// Text output is meant for terminals, JSON output for log shippers. Call
/// once at startup; a second call fails because a global subscriber is
/// already installed.
pub fn init_logging(level: Level, format: LogFormat) -> Result<()> {
    let filter = env_filter(level);

    let layer = match format {
        LogFormat::Text => fmt::layer().with_target(false).with_filter(filter).boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::debug!(
        log_level = %level,
        log_format = ?format,
        "Structured logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_only_once() {
        let first = init_logging(Level::INFO, LogFormat::Text);
        let second = init_logging(Level::DEBUG, LogFormat::Json);
        // Another test in this process may have installed the subscriber first
        assert!(first.is_err() || second.is_err());
    }

    #[test]
    fn test_env_filter_uses_configured_level() {
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(
                env_filter(Level::WARN).max_level_hint(),
                Some(tracing::level_filters::LevelFilter::WARN)
            );
        }
    }
}
