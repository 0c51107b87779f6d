// Pinger binary entry point

use anyhow::Context;
use clap::Parser;
use common::bootstrap::{build_runner, shutdown_signal};
use common::config::{RunConfig, Settings};
use common::telemetry::init_logging;
use std::path::PathBuf;
use tracing::{info, warn};

/// Periodically ping HTTP endpoints on a cron schedule
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "PINGER_CONFIG", default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let settings = Settings::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config.display()))?;
    settings.validate()?;

    let (log_level, recognised) = settings.parsed_log_level();
    init_logging(log_level, settings.log_format)?;

    if !recognised && !settings.log_level.trim().is_empty() {
        warn!(log_level = %settings.log_level, "Invalid log level, defaulting to info");
    }

    let run_config = RunConfig::from_settings(&settings);
    info!(
        config = %args.config.display(),
        endpoints = run_config.endpoints.len(),
        "Configuration loaded"
    );

    let mut runner = build_runner(run_config)?;
    info!("Pinger starting. Press Ctrl+C to exit.");

    runner.run_until(shutdown_signal()).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_flag_overrides_default() {
        let args = Args::try_parse_from(["pinger", "--config", "/etc/pinger.yaml"]).unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/pinger.yaml"));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["pinger", "--bogus"]).is_err());
    }
}
