// Error handling framework
// Fatal configuration errors, per-registration schedule errors, per-probe errors

use thiserror::Error;

/// Configuration errors; always fatal, raised before the runner starts
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: ::config::ConfigError,
    },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Schedule-related errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCronExpression { expression: String, reason: String },

    #[error("Cron expression '{expression}' has no upcoming fire time")]
    NoUpcomingFire { expression: String },

    #[error("Scheduler already started, cannot register job '{0}'")]
    AlreadyStarted(String),
}

/// Probe errors; each one ends a single probe invocation and nothing else
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to create request: {0}")]
    InvalidRequest(String),

    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl ProbeError {
    /// Classify a transport error, separating timeouts from other failures
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout(err)
        } else {
            ProbeError::Transport(err)
        }
    }

    /// Short machine-friendly reason used as a log field
    pub fn reason(&self) -> &'static str {
        match self {
            ProbeError::InvalidRequest(_) => "invalid_request",
            ProbeError::Timeout(_) => "timeout",
            ProbeError::Transport(_) => "transport",
        }
    }
}
