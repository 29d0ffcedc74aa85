use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use gadget_store::{MiBandTable, PebbleHealthTable, Store, StoreConfig};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigAction, DeviceAction, TableName};
use commands::*;

/// Call a generic command with the table selected on the command line.
macro_rules! with_table {
    ($table:expr, $cmd:ident($($arg:expr),* $(,)?)) => {
        match $table {
            TableName::MiBand => $cmd(MiBandTable, $($arg),*),
            TableName::PebbleHealth => $cmd(PebbleHealthTable, $($arg),*),
        }
    };
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => {
            tracing::debug!("Writing output to {}", path.display());
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    match &cli.command {
        Commands::Query {
            range,
            kind,
            format,
        } => {
            let store = open_store(&cli)?;
            with_table!(range.table, cmd_query(&store, range, *kind, *format, &mut out))?;
        }
        Commands::Latest { table } => {
            let store = open_store(&cli)?;
            with_table!(*table, cmd_latest(&store, &mut out))?;
        }
        Commands::Import { table, file } => {
            let store = open_store(&cli)?;
            with_table!(*table, cmd_import(&store, file, &mut out))?;
        }
        Commands::Reclassify {
            range,
            source,
            target,
        } => {
            let store = open_store(&cli)?;
            with_table!(
                range.table,
                cmd_reclassify(&store, range, *source, *target, &mut out)
            )?;
        }
        Commands::Devices { action } => {
            let store = open_store(&cli)?;
            match action {
                None | Some(DeviceAction::List) => cmd_devices(&store, &mut out)?,
                Some(DeviceAction::Add {
                    identifier,
                    name,
                    device_type,
                }) => cmd_device_add(
                    &store,
                    identifier,
                    name.as_deref(),
                    device_type.as_deref(),
                    &mut out,
                )?,
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cmd_config_show(&load_config(&cli)?, &mut out)?,
            ConfigAction::Init { force } => {
                cmd_config_init(cli.config.as_deref(), *force, &mut out)?;
            }
        },
    }

    out.flush()?;
    Ok(())
}

fn open_store(cli: &Cli) -> Result<Store> {
    let config = load_config(cli)?;
    Store::open_with_config(&config)
        .with_context(|| format!("Failed to open {}", config.path.display()))
}

/// Effective store configuration: `--config` file (or the default file),
/// with `--db` overriding the database path.
fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load_validated(path)?,
        None => StoreConfig::load_default()?,
    };

    if let Some(db) = &cli.db {
        config.path = db.clone();
    }
    config.validate()?;
    Ok(config)
}
