use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use doover_snowflake::{
    CYCLE_LEN, DooverSnowflakeId, MessageQuery, MessageWindow, Origin, SnowflakeGenerator,
    SnowflakeType, cursor_at,
};
use serde::Serialize;

use crate::config::{CliConfig, Command, OutputFormat};

/// The fields of one ID, as printed by `decode --json`.
#[derive(Debug, Serialize)]
struct DecodedId {
    id: DooverSnowflakeId,
    timestamp: u64,
    created_at: String,
    region_id: u64,
    instance_id: u64,
    type_id: u64,
    kind: Option<SnowflakeType>,
    random: u64,
}

impl From<DooverSnowflakeId> for DecodedId {
    fn from(id: DooverSnowflakeId) -> Self {
        Self {
            id,
            timestamp: id.timestamp(),
            created_at: id.datetime().to_rfc3339_opts(SecondsFormat::Millis, true),
            region_id: id.region_id(),
            instance_id: id.instance_id(),
            type_id: id.type_id(),
            kind: id.kind().ok(),
            random: id.random(),
        }
    }
}

#[derive(Serialize)]
struct IdLine {
    id: DooverSnowflakeId,
}

/// Runs the configured subcommand, writing its results to `out`.
pub fn run(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        Command::Mint {
            kind,
            count,
            at,
            random,
        } => {
            let generator = SnowflakeGenerator::new(config.origin);
            match at {
                Some(at) => mint_at(&generator, *at, *kind, *count, *random, config.output, out),
                None => mint_now(&generator, *kind, *count, config.output, out),
            }
        }
        Command::Cursor { at } => {
            let cursor = cursor_at(at).with_context(|| format!("no cursor exists for {at}"))?;
            tracing::debug!(%at, %cursor, "derived cursor");
            write_id(out, config.output, cursor)
        }
        Command::Window { start, end } => {
            let window = MessageWindow::new(start, end)
                .with_context(|| format!("cannot build a window from {start} to {end}"))?;
            match config.output {
                OutputFormat::Json => write_json(out, &MessageQuery::from(window)),
                OutputFormat::Text => {
                    writeln!(out, "after  {}", window.after())?;
                    writeln!(out, "before {}", window.before())?;
                    Ok(())
                }
            }
        }
        Command::Decode { ids } => {
            for &id in ids {
                match config.output {
                    OutputFormat::Json => write_json(out, &DecodedId::from(id))?,
                    OutputFormat::Text => {
                        writeln!(out, "{id:#?}")?;
                        writeln!(
                            out,
                            "    created at : {}",
                            id.datetime().to_rfc3339_opts(SecondsFormat::Millis, true)
                        )?;
                    }
                }
            }
            Ok(())
        }
    }
}

/// Mints `count` IDs on the wall clock.
///
/// Only [`CYCLE_LEN`] draws are distinct within one millisecond, so once a
/// millisecond is used up the loop waits for the clock to move on.
fn mint_now(
    generator: &SnowflakeGenerator,
    kind: SnowflakeType,
    count: u32,
    output: OutputFormat,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut minted = 0;
    let mut current: Option<(u64, usize)> = None;

    while minted < count {
        let id = generator.generate_id(kind).with_context(|| {
            format!(
                "failed to mint {kind} ID for {}",
                describe(generator.origin())
            )
        })?;
        let drawn = match current {
            Some((timestamp, drawn)) if timestamp == id.timestamp() => drawn + 1,
            _ => 1,
        };
        current = Some((id.timestamp(), drawn));

        if drawn > CYCLE_LEN {
            tracing::trace!(timestamp = id.timestamp(), "millisecond exhausted, waiting");
            std::thread::sleep(Duration::from_micros(100));
            continue;
        }

        write_id(out, output, id)?;
        minted += 1;
    }

    tracing::debug!(count, %kind, "minted IDs");
    Ok(())
}

fn mint_at(
    generator: &SnowflakeGenerator,
    at: DateTime<FixedOffset>,
    kind: SnowflakeType,
    count: u32,
    use_random: bool,
    output: OutputFormat,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for _ in 0..count {
        let id = generator
            .generate_id_at(at, kind, use_random)
            .with_context(|| format!("failed to mint {kind} ID at {at}"))?;
        write_id(out, output, id)?;
    }
    Ok(())
}

fn describe(origin: Origin) -> String {
    format!(
        "region {} instance {}",
        origin.region_id(),
        origin.instance_id()
    )
}

fn write_id(
    out: &mut impl Write,
    output: OutputFormat,
    id: DooverSnowflakeId,
) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => write_json(out, &IdLine { id }),
        OutputFormat::Text => Ok(writeln!(out, "{id}")?),
    }
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use std::collections::HashSet;

    fn config(command: Command, output: OutputFormat) -> CliConfig {
        CliConfig {
            origin: Origin::new(3, 5).unwrap(),
            output,
            log_format: LogFormat::Pretty,
            command,
        }
    }

    fn instant(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn run_to_string(config: &CliConfig) -> String {
        let mut out = Vec::new();
        run(config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn mint_now_stays_unique_past_one_millisecond() {
        let output = run_to_string(&config(
            Command::Mint {
                kind: SnowflakeType::Message,
                count: 40,
                at: None,
                random: false,
            },
            OutputFormat::Text,
        ));

        let ids: Vec<DooverSnowflakeId> = output.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(ids.len(), 40);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 40);
        assert!(ids.iter().all(|id| id.region_id() == 3 && id.instance_id() == 5));
        assert!(ids.iter().all(|id| id.kind() == Ok(SnowflakeType::Message)));
    }

    #[test]
    fn mint_at_the_epoch_without_random() {
        let mut config = config(
            Command::Mint {
                kind: SnowflakeType::Message,
                count: 1,
                at: Some(instant("2025-01-01T00:00:00Z")),
                random: false,
            },
            OutputFormat::Json,
        );
        config.origin = Origin::default();
        assert_eq!(run_to_string(&config), "{\"id\":32}\n");
    }

    #[test]
    fn mint_before_the_epoch_fails_with_context() {
        let config = config(
            Command::Mint {
                kind: SnowflakeType::Agent,
                count: 1,
                at: Some(instant("2024-12-31T23:59:59Z")),
                random: false,
            },
            OutputFormat::Text,
        );
        let err = run(&config, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("failed to mint agent ID"));
        assert!(err.chain().any(|e| e.to_string().contains("before")));
    }

    #[test]
    fn cursor_and_window_output() {
        let cursor = run_to_string(&config(
            Command::Cursor {
                at: instant("2025-01-01T00:00:00.001Z"),
            },
            OutputFormat::Text,
        ));
        assert_eq!(cursor, "4194304\n");

        let window = Command::Window {
            start: instant("2025-01-01T10:00:00.001+10:00"),
            end: instant("2025-01-01T00:00:00.002Z"),
        };
        assert_eq!(
            run_to_string(&config(window.clone(), OutputFormat::Text)),
            "after  4194304\nbefore 8388608\n"
        );
        assert_eq!(
            run_to_string(&config(window, OutputFormat::Json)),
            "{\"before\":8388608,\"after\":4194304}\n"
        );
    }

    #[test]
    fn decode_reports_every_field() {
        let id = DooverSnowflakeId::from(1000, 3, 5, 1, 9);
        let output = run_to_string(&config(Command::Decode { ids: vec![id] }, OutputFormat::Json));
        let value: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": id.to_raw(),
                "timestamp": 1000,
                "created_at": "2025-01-01T00:00:01.000Z",
                "region_id": 3,
                "instance_id": 5,
                "type_id": 1,
                "kind": 1,
                "random": 9,
            })
        );

        let unassigned = DooverSnowflakeId::from(0, 0, 0, 12, 0);
        let text = run_to_string(&config(
            Command::Decode {
                ids: vec![unassigned],
            },
            OutputFormat::Text,
        ));
        assert!(text.contains("unassigned (12)"));
        assert!(text.contains("created at : 2025-01-01T00:00:00.000Z"));
    }
}
