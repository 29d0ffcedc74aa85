//! Local SQLite persistence for fitness tracker activity samples.
//!
//! Each device family stores its samples in its own table. This crate
//! provides one generic [`SampleProvider`] that queries and updates any of
//! those tables through the [`SampleTable`] trait, so device support only
//! has to describe its columns and kind codes.
//!
//! # Features
//!
//! - Range queries filtered by semantic activity kind
//! - Latest stored timestamp per table
//! - Insert-or-replace, single and bulk (transactional)
//! - In-place kind reclassification of stored samples
//! - CSV and JSON export of normalized samples
//!
//! # Example
//!
//! ```no_run
//! use gadget_store::{MiBandTable, Store};
//!
//! let store = Store::open_default()?;
//! let provider = store.provider(MiBandTable);
//!
//! let last_sync = provider.fetch_latest_timestamp()?;
//! let sleep = provider.sleep_samples(last_sync - 86_400, last_sync)?;
//! # Ok::<(), gadget_store::Error>(())
//! ```

mod config;
mod error;
mod export;
mod models;
mod provider;
mod queries;
mod schema;
mod store;
mod tables;

pub use config::{
    ConfigError, JournalMode, StoreConfig, Synchronous, ValidationError, default_config_path,
};
pub use error::{Error, Result};
pub use models::{ExportRow, MiBandSample, PebbleHealthSample, StoredDevice};
pub use provider::{NO_TIMESTAMP, ProvidedSample, SampleProvider};
pub use queries::{Predicate, SampleQuery, render_where};
pub use store::Store;
pub use tables::{MiBandTable, PebbleHealthTable, SampleTable};

// Needed to implement `SampleTable` outside this crate.
pub use rusqlite;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/gadget/samples.db`
/// - macOS: `~/Library/Application Support/gadget/samples.db`
/// - Windows: `C:\Users\<user>\AppData\Local\gadget\samples.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("gadget")
        .join("samples.db")
}
