//! Main store implementation.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::models::StoredDevice;
use crate::provider::SampleProvider;
use crate::schema;
use crate::tables::SampleTable;

/// SQLite-based store for activity samples.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(&StoreConfig::at(path))
    }

    /// Open or create the database described by `config`.
    pub fn open_with_config(config: &StoreConfig) -> Result<Self> {
        let path = config.path.as_path();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(&format!(
            "PRAGMA journal_mode = {};
             PRAGMA synchronous = {};",
            config.journal_mode.as_pragma(),
            config.synchronous.as_pragma()
        ))?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Sample access for one device table.
    pub fn provider<T: SampleTable>(&self, table: T) -> SampleProvider<'_, T> {
        SampleProvider::new(self, table)
    }

    /// Create the table for `T` if it does not exist yet.
    ///
    /// Built-in tables are created with the schema; this is for tables
    /// defined outside this crate.
    pub fn ensure_table<T: SampleTable>(&self) -> Result<()> {
        debug!("Ensuring table {}", T::TABLE);
        self.conn.execute_batch(T::DDL)?;
        Ok(())
    }
}

// Device operations
impl Store {
    /// Get or create a device entry by its hardware identifier.
    pub fn upsert_device(
        &self,
        identifier: &str,
        name: Option<&str>,
        device_type: Option<&str>,
    ) -> Result<StoredDevice> {
        let now = OffsetDateTime::now_utc().unix_timestamp();

        self.conn.execute(
            "INSERT INTO devices (identifier, name, device_type, first_seen, last_seen)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(identifier) DO UPDATE SET
                name = COALESCE(?2, name),
                device_type = COALESCE(?3, device_type),
                last_seen = ?4",
            rusqlite::params![identifier, name, device_type, now],
        )?;

        self.find_device(identifier)?
            .ok_or_else(|| Error::DeviceNotFound(identifier.to_string()))
    }

    /// Get a device by row ID.
    pub fn get_device(&self, id: i64) -> Result<Option<StoredDevice>> {
        let device = self
            .conn
            .query_row(
                "SELECT id, identifier, name, device_type, first_seen, last_seen
                 FROM devices WHERE id = ?",
                [id],
                device_from_row,
            )
            .optional()?;

        Ok(device)
    }

    /// Get a device by hardware identifier.
    pub fn find_device(&self, identifier: &str) -> Result<Option<StoredDevice>> {
        let device = self
            .conn
            .query_row(
                "SELECT id, identifier, name, device_type, first_seen, last_seen
                 FROM devices WHERE identifier = ?",
                [identifier],
                device_from_row,
            )
            .optional()?;

        Ok(device)
    }

    /// List all devices, most recently seen first.
    pub fn list_devices(&self) -> Result<Vec<StoredDevice>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, identifier, name, device_type, first_seen, last_seen
             FROM devices ORDER BY last_seen DESC, id ASC",
        )?;

        let devices = stmt
            .query_map([], device_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(devices)
    }
}

fn device_from_row(row: &Row<'_>) -> rusqlite::Result<StoredDevice> {
    Ok(StoredDevice {
        id: row.get(0)?,
        identifier: row.get(1)?,
        name: row.get(2)?,
        device_type: row.get(3)?,
        first_seen: datetime_column(row, 4)?,
        last_seen: datetime_column(row, 5)?,
    })
}

fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<OffsetDateTime> {
    let secs: i64 = row.get(idx)?;
    OffsetDateTime::from_unix_timestamp(secs).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Integer, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JournalMode;
    use crate::models::MiBandSample;
    use crate::tables::MiBandTable;

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        let devices = store.list_devices().unwrap();
        assert!(devices.is_empty());
    }

    #[test]
    fn test_upsert_device() {
        let store = Store::open_in_memory().unwrap();

        let device = store
            .upsert_device("C8:0F:10:00:00:01", Some("Band"), Some("mi-band"))
            .unwrap();
        assert_eq!(device.identifier, "C8:0F:10:00:00:01");
        assert_eq!(device.name, Some("Band".to_string()));
        assert_eq!(device.device_type, Some("mi-band".to_string()));

        // Update name, keep type, keep row id
        let updated = store
            .upsert_device("C8:0F:10:00:00:01", Some("New Name"), None)
            .unwrap();
        assert_eq!(updated.id, device.id);
        assert_eq!(updated.name, Some("New Name".to_string()));
        assert_eq!(updated.device_type, Some("mi-band".to_string()));
    }

    #[test]
    fn test_get_and_list_devices() {
        let store = Store::open_in_memory().unwrap();
        let a = store.upsert_device("AA", None, None).unwrap();
        store.upsert_device("BB", None, Some("pebble")).unwrap();

        assert_eq!(store.get_device(a.id).unwrap().unwrap().identifier, "AA");
        assert!(store.get_device(999).unwrap().is_none());
        assert!(store.find_device("CC").unwrap().is_none());
        assert_eq!(store.list_devices().unwrap().len(), 2);
    }

    #[test]
    fn test_open_file_persists_samples() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("samples.db");

        {
            let store = Store::open(&path).unwrap();
            store
                .provider(MiBandTable)
                .add_sample(&MiBandSample {
                    timestamp: 42,
                    device_id: 1,
                    user_id: 1,
                    raw_intensity: 0,
                    steps: 0,
                    raw_kind: MiBandTable::KIND_ACTIVITY,
                    heart_rate: -1,
                })
                .unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.provider(MiBandTable).fetch_latest_timestamp().unwrap(), 42);
    }

    #[test]
    fn test_open_rejects_newer_schema() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("samples.db");

        {
            let store = Store::open(&path).unwrap();
            store
                .conn()
                .execute("UPDATE schema_version SET version = 99", [])
                .unwrap();
        }

        let err = Store::open(&path).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedSchemaVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_open_with_config_journal_mode() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = StoreConfig::at(temp_dir.path().join("samples.db"));
        config.journal_mode = JournalMode::Delete;

        let store = Store::open_with_config(&config).unwrap();
        let mode: String = store
            .conn()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "delete");
    }

    #[test]
    fn test_ensure_table_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        store.ensure_table::<MiBandTable>().unwrap();
        assert_eq!(store.provider(MiBandTable).count().unwrap(), 0);
    }
}
