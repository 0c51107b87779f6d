// Configuration management with layered configuration (YAML file, env overrides)

use crate::errors::ConfigError;
use crate::expansion::expand;
use crate::models::{Endpoint, EndpointTemplate, ProbeHeaders};
use chrono_tz::Tz;
use config::{Case, Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::Level;

/// Prefix of environment variables overriding file settings, e.g. `PINGER_SCHEDULE`
pub const ENV_PREFIX: &str = "PINGER";

/// Settings mirrors the configuration file one-to-one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    #[serde(default)]
    pub api_key_header_name: String,
    #[serde(default, rename = "api-key-value")]
    pub api_key: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub schedule: String,
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default)]
    pub endpoints: Vec<EndpointTemplate>,
    #[serde(default)]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub enable_http_logging: bool,
}

/// Output format of the log sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_timezone() -> Tz {
    Tz::UTC
}

impl Settings {
    /// Load configuration: YAML file first, then `PINGER_*` environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Load configuration with an explicit environment
    ///
    /// `None` reads the process environment. `Some(vars)` uses `vars` instead,
    /// keyed by full variable name (`PINGER_TIMEOUT_SECONDS`).
    pub fn load_with_env<P: AsRef<Path>>(
        path: P,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let load_error = |source| ConfigError::Load {
            path: path.display().to_string(),
            source,
        };

        let environment = Environment::with_prefix(ENV_PREFIX)
            .convert_case(Case::Kebab)
            .ignore_empty(true)
            .try_parsing(true)
            .source(env.map(|vars| vars.into_iter().collect()));

        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml).required(true))
            .add_source(environment)
            .build()
            .map_err(load_error)?;

        config.try_deserialize().map_err(load_error)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_key.is_empty() && self.api_key_header_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api-key-header-name must be set when api-key-value is provided".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the configured log level
    ///
    /// Returns the level and whether the configured value was recognised.
    /// An empty value resolves to INFO and counts as unrecognised; callers
    /// only warn when the value is non-empty.
    pub fn parsed_log_level(&self) -> (Level, bool) {
        parse_log_level(&self.log_level)
    }
}

/// Map a config string to a tracing level, defaulting to INFO
pub fn parse_log_level(value: &str) -> (Level, bool) {
    match value.trim().to_lowercase().as_str() {
        "debug" => (Level::DEBUG, true),
        "info" => (Level::INFO, true),
        "" => (Level::INFO, false),
        "warn" | "warning" => (Level::WARN, true),
        "error" => (Level::ERROR, true),
        _ => (Level::INFO, false),
    }
}

/// RunConfig is the frozen, expanded configuration the runner owns
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub headers: ProbeHeaders,
    pub timeout_seconds: u64,
    pub schedule: String,
    pub timezone: Tz,
    pub endpoints: Vec<Endpoint>,
    pub http_logging_enabled: bool,
}

impl RunConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            headers: ProbeHeaders {
                api_key_header_name: settings.api_key_header_name.clone(),
                api_key: settings.api_key.clone(),
                user_agent: settings.user_agent.clone(),
            },
            timeout_seconds: settings.timeout_seconds,
            schedule: settings.schedule.clone(),
            timezone: settings.timezone,
            endpoints: expand(&settings.endpoints),
            http_logging_enabled: settings.enable_http_logging,
        }
    }
}
