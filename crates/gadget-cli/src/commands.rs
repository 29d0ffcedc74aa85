//! Command implementations.
//!
//! Every command writes its result to the supplied writer so the same code
//! serves stdout, `--output` files and tests.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use gadget_store::{SampleTable, Store, StoreConfig, default_config_path};
use gadget_types::{ActivityKind, KindFilter};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::cli::{OutputFormat, RangeArgs};

pub fn cmd_query<T: SampleTable>(
    table: T,
    store: &Store,
    range: &RangeArgs,
    filter: KindFilter,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<usize> {
    let provider = store.provider(table);

    let written = match format {
        OutputFormat::Json => {
            let n = provider.export_json(range.from, range.to, filter, &mut *out)?;
            writeln!(out)?;
            n
        }
        OutputFormat::Csv => provider.export_csv(range.from, range.to, filter, &mut *out)?,
        OutputFormat::Text => {
            let rows = provider.export_rows(range.from, range.to, filter)?;
            for row in &rows {
                writeln!(
                    out,
                    "{}  {:<12} {:>5.2}  steps {:>4}  hr {:>4}",
                    row.time, row.kind, row.intensity, row.steps, row.heart_rate
                )?;
            }
            rows.len()
        }
    };

    info!("{} samples matched '{}'", written, filter);
    Ok(written)
}

pub fn cmd_latest<T: SampleTable>(table: T, store: &Store, out: &mut dyn Write) -> Result<()> {
    let latest = store.provider(table).fetch_latest_timestamp()?;
    writeln!(out, "{}", latest)?;
    Ok(())
}

pub fn cmd_import<T>(table: T, store: &Store, file: &Path, out: &mut dyn Write) -> Result<usize>
where
    T: SampleTable,
    T::Sample: DeserializeOwned,
{
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let samples: Vec<T::Sample> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid sample file {}", file.display()))?;

    let written = store.provider(table).add_samples(&samples)?;
    writeln!(out, "Imported {} samples into {}", written, T::TABLE)?;
    Ok(written)
}

pub fn cmd_reclassify<T: SampleTable>(
    table: T,
    store: &Store,
    range: &RangeArgs,
    source: Option<KindFilter>,
    target: ActivityKind,
    out: &mut dyn Write,
) -> Result<usize> {
    let provider = store.provider(table);
    let changed = match source {
        Some(source) => provider.change_stored_samples_kind(range.from, range.to, source, target)?,
        None => provider.change_stored_samples_type(range.from, range.to, target)?,
    };

    writeln!(out, "Reclassified {} samples as {}", changed, target)?;
    Ok(changed)
}

pub fn cmd_devices(store: &Store, out: &mut dyn Write) -> Result<()> {
    let devices = store.list_devices()?;
    if devices.is_empty() {
        writeln!(out, "No devices")?;
        return Ok(());
    }

    for device in devices {
        writeln!(
            out,
            "{:>4}  {:<20} {:<16} {}",
            device.id,
            device.identifier,
            device.device_type.as_deref().unwrap_or("-"),
            device.name.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

pub fn cmd_device_add(
    store: &Store,
    identifier: &str,
    name: Option<&str>,
    device_type: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let device = store.upsert_device(identifier, name, device_type)?;
    writeln!(out, "Device {} has id {}", device.identifier, device.id)?;
    Ok(())
}

pub fn cmd_config_show(config: &StoreConfig, out: &mut dyn Write) -> Result<()> {
    let text = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    write!(out, "{}", text)?;
    Ok(())
}

pub fn cmd_config_init(path: Option<&Path>, force: bool, out: &mut dyn Write) -> Result<PathBuf> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    StoreConfig::default().save(&path)?;
    writeln!(out, "Wrote {}", path.display())?;
    Ok(path)
}
