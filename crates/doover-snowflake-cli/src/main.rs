#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use clap::Parser;
use config::{CliArgs, CliConfig};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry(config.log_format)?;

    if cfg!(debug_assertions) {
        tracing::debug!("Running with full config: {:#?}", config);
    } else {
        tracing::debug!(
            region_id = config.origin.region_id(),
            instance_id = config.origin.instance_id(),
            "Running command"
        );
    }

    let mut stdout = std::io::stdout().lock();
    commands::run(&config, &mut stdout)
}
