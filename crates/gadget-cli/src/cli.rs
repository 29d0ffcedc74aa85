//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gadget_types::{ActivityKind, KindFilter};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Parser)]
#[command(name = "gadget")]
#[command(author, version, about = "Query and maintain stored activity samples", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Store configuration file (TOML)
    #[arg(short, long, global = true, env = "GADGET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path, overrides the configuration file
    #[arg(long, global = true, env = "GADGET_DB")]
    pub db: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List samples in a time range
    Query {
        #[command(flatten)]
        range: RangeArgs,

        /// Kinds to include, e.g. `all`, `sleep` or `activity,not-worn`
        #[arg(short, long, default_value = "all", value_parser = parse_filter)]
        kind: KindFilter,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the most recent stored timestamp (-1 when empty)
    Latest {
        /// Sample table
        #[arg(short, long, value_enum)]
        table: TableName,
    },

    /// Insert or replace samples from a JSON array
    Import {
        /// Sample table
        #[arg(short, long, value_enum)]
        table: TableName,

        /// JSON file containing the samples
        file: PathBuf,
    },

    /// Change the stored kind of samples in a time range
    Reclassify {
        #[command(flatten)]
        range: RangeArgs,

        /// Only change samples of these kinds (default: every sample)
        #[arg(short, long, value_parser = parse_filter)]
        source: Option<KindFilter>,

        /// New kind
        #[arg(long, value_parser = parse_kind)]
        target: ActivityKind,
    },

    /// Manage known devices
    Devices {
        #[command(subcommand)]
        action: Option<DeviceAction>,
    },

    /// Show or create the store configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Table and inclusive time range shared by range commands.
#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// Sample table
    #[arg(short, long, value_enum)]
    pub table: TableName,

    /// Start of range (Unix seconds or RFC 3339), inclusive
    #[arg(long, default_value = "0", value_parser = parse_timestamp)]
    pub from: i32,

    /// End of range (Unix seconds or RFC 3339), inclusive
    #[arg(long, default_value_t = i32::MAX, value_parser = parse_timestamp)]
    pub to: i32,
}

#[derive(Debug, Subcommand)]
pub enum DeviceAction {
    /// List known devices (default)
    List,
    /// Register a device or update its name and type
    Add {
        /// Hardware identifier, e.g. the Bluetooth address
        identifier: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Device family
        #[arg(short = 'T', long = "type")]
        device_type: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Built-in sample tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableName {
    /// Mi Band activity samples
    MiBand,
    /// Pebble Health samples
    PebbleHealth,
}

/// Output format for sample listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Parse Unix seconds or an RFC 3339 date-time.
pub fn parse_timestamp(s: &str) -> Result<i32, String> {
    if let Ok(secs) = s.parse::<i32>() {
        return Ok(secs);
    }

    let time = OffsetDateTime::parse(s, &Rfc3339)
        .map_err(|e| format!("'{}' is neither Unix seconds nor RFC 3339: {}", s, e))?;
    i32::try_from(time.unix_timestamp())
        .map_err(|_| format!("'{}' is outside the supported timestamp range", s))
}

fn parse_filter(s: &str) -> Result<KindFilter, String> {
    s.parse().map_err(|e: gadget_types::ParseError| e.to_string())
}

fn parse_kind(s: &str) -> Result<ActivityKind, String> {
    s.parse().map_err(|e: gadget_types::ParseError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_timestamp_seconds() {
        assert_eq!(parse_timestamp("1700000000"), Ok(1_700_000_000));
        assert_eq!(parse_timestamp("-1"), Ok(-1));
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        assert_eq!(parse_timestamp("2023-11-14T22:13:20Z"), Ok(1_700_000_000));
        assert_eq!(parse_timestamp("2023-11-14T23:13:20+01:00"), Ok(1_700_000_000));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("2100-01-01T00:00:00Z").is_err());
    }

    #[test]
    fn test_query_args() {
        let cli = Cli::try_parse_from([
            "gadget", "query", "--table", "mi-band", "--from", "10", "--to", "20", "--kind",
            "sleep", "--format", "csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Query {
                range,
                kind,
                format,
            } => {
                assert_eq!(range.table, TableName::MiBand);
                assert_eq!(range.from, 10);
                assert_eq!(range.to, 20);
                assert_eq!(kind, KindFilter::SLEEP);
                assert_eq!(format, OutputFormat::Csv);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_query_defaults_cover_everything() {
        let cli = Cli::try_parse_from(["gadget", "query", "-t", "pebble-health"]).unwrap();
        match cli.command {
            Commands::Query { range, kind, .. } => {
                assert_eq!(range.from, 0);
                assert_eq!(range.to, i32::MAX);
                assert!(kind.is_all());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_store_location_flags() {
        let cli = Cli::try_parse_from([
            "gadget", "latest", "-t", "mi-band", "--db", "/tmp/a.db", "--config", "/tmp/s.toml",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/a.db")));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.toml")));

        let db = Cli::command()
            .get_arguments()
            .find(|arg| arg.get_id() == "db")
            .and_then(|arg| arg.get_env().map(|env| env.to_os_string()));
        assert_eq!(db, Some("GADGET_DB".into()));
    }

    #[test]
    fn test_reclassify_args() {
        let cli = Cli::try_parse_from([
            "gadget",
            "reclassify",
            "-t",
            "mi-band",
            "--source",
            "activity",
            "--target",
            "deep-sleep",
        ])
        .unwrap();

        match cli.command {
            Commands::Reclassify { source, target, .. } => {
                assert_eq!(source, Some(KindFilter::ACTIVITY));
                assert_eq!(target, ActivityKind::DeepSleep);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_reclassify_rejects_unknown_kind() {
        let result = Cli::try_parse_from([
            "gadget", "reclassify", "-t", "mi-band", "--target", "swimming",
        ]);
        assert!(result.is_err());
    }
}
