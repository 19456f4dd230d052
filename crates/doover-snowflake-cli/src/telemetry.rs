//! Log setup for the CLI.
//!
//! Events go to stderr so stdout only ever carries command output. The
//! filter comes from `RUST_LOG` and defaults to `warn`; use
//! `RUST_LOG=doover_snowflake=trace` to see the library's generation spans.

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

pub fn init_telemetry(format: LogFormat) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()));

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_line_number(true)
                    .with_file(true)
                    .with_timer(ChronoLocal::rfc_3339())
                    .pretty(),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_timer(ChronoLocal::rfc_3339())
                    .json(),
            )
            .try_init()?,
    }

    Ok(())
}
