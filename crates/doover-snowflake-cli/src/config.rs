use anyhow::{Context, bail};
use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand, ValueEnum};
use doover_snowflake::{CYCLE_LEN, DooverSnowflakeId, Origin, SnowflakeType};

/// Most IDs a single `mint` invocation will produce.
pub const MAX_MINT_COUNT: u32 = 1 << 16;

/// Runtime configuration for the `doover-snowflake` binary.
///
/// Global options are read from CLI arguments or environment variables (a
/// `.env` file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "doover-snowflake",
    version,
    about = "Mint, decode and bound Doover snowflake IDs"
)]
pub struct CliArgs {
    /// Region ID stamped into minted IDs (0..=15).
    ///
    /// Environment variable: `DOOVER_REGION_ID`
    #[arg(long, global = true, env = "DOOVER_REGION_ID", default_value_t = 0)]
    pub region_id: u8,

    /// Instance ID stamped into minted IDs (0..=1023).
    ///
    /// Every process minting IDs concurrently must use a distinct
    /// region/instance pair.
    ///
    /// Environment variable: `DOOVER_INSTANCE_ID`
    #[arg(long, global = true, env = "DOOVER_INSTANCE_ID", default_value_t = 0)]
    pub instance_id: u16,

    /// Print results as JSON lines instead of text.
    ///
    /// Environment variable: `DOOVER_OUTPUT_JSON`
    #[arg(long, global = true, env = "DOOVER_OUTPUT_JSON", default_value_t = false)]
    pub json: bool,

    /// Format of the log lines written to stderr. Verbosity follows
    /// `RUST_LOG`.
    ///
    /// Environment variable: `DOOVER_LOG_FORMAT`
    #[arg(
        long,
        global = true,
        env = "DOOVER_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mint new IDs for the configured origin.
    Mint {
        /// Entity kind, by name (`message`, `wss-session`, ...) or number.
        #[arg(long = "type", value_name = "KIND", default_value_t = SnowflakeType::Unknown)]
        kind: SnowflakeType,

        /// How many IDs to mint.
        #[arg(long, default_value_t = 1)]
        count: u32,

        /// Mint for this RFC 3339 instant instead of now.
        #[arg(long, value_name = "RFC3339")]
        at: Option<DateTime<FixedOffset>>,

        /// With `--at`, draw the random field instead of leaving it zero.
        #[arg(long, requires = "at", default_value_t = false)]
        random: bool,
    },
    /// Print the lowest ID of the millisecond containing an instant.
    Cursor {
        #[arg(value_name = "RFC3339")]
        at: DateTime<FixedOffset>,
    },
    /// Print the `after`/`before` cursors bounding `[START, END)`.
    Window {
        #[arg(value_name = "START")]
        start: DateTime<FixedOffset>,
        #[arg(value_name = "END")]
        end: DateTime<FixedOffset>,
    },
    /// Print the fields packed into one or more IDs.
    Decode {
        #[arg(value_name = "ID", required = true)]
        ids: Vec<DooverSnowflakeId>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human readable events.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub origin: Origin,
    pub output: OutputFormat,
    pub log_format: LogFormat,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let origin = Origin::new(args.region_id, args.instance_id).with_context(|| {
            format!(
                "invalid origin (DOOVER_REGION_ID = {}, DOOVER_INSTANCE_ID = {})",
                args.region_id, args.instance_id
            )
        })?;

        if let Command::Mint {
            count, at, random, ..
        } = args.command
        {
            if count == 0 {
                bail!("--count must be greater than 0");
            }
            if count > MAX_MINT_COUNT {
                bail!("--count ({count}) exceeds the per-invocation limit of {MAX_MINT_COUNT}");
            }
            // A fixed instant has one millisecond to spread the IDs over.
            match (at, random) {
                (Some(_), false) if count > 1 => {
                    bail!("--count > 1 with --at repeats the same ID; add --random")
                }
                (Some(_), true) if count as usize > CYCLE_LEN => {
                    bail!("--count with --at --random is limited to {CYCLE_LEN} distinct IDs")
                }
                _ => {}
            }
        }

        if let Command::Window { start, end } = args.command {
            if end < start {
                bail!("window end ({end}) is earlier than its start ({start})");
            }
        }

        Ok(Self {
            origin,
            output: if args.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            log_format: args.log_format,
            command: args.command,
        })
    }
}
