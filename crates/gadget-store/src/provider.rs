//! Generic per-table sample access.
//!
//! A [`SampleProvider`] wraps one [`SampleTable`] and implements the common
//! read and write operations against it: range queries filtered by
//! semantic kind, the latest stored timestamp, insert-or-replace, and
//! in-place kind reclassification.
//!
//! # Example
//!
//! ```
//! use gadget_store::{MiBandSample, MiBandTable, Store};
//! use gadget_types::KindFilter;
//!
//! let store = Store::open_in_memory()?;
//! let provider = store.provider(MiBandTable);
//!
//! provider.add_sample(&MiBandSample {
//!     timestamp: 1_700_000_000,
//!     device_id: 1,
//!     user_id: 1,
//!     raw_intensity: 40,
//!     steps: 12,
//!     raw_kind: MiBandTable::KIND_ACTIVITY,
//!     heart_rate: 72,
//! })?;
//!
//! let samples = provider.samples(1_699_999_000, 1_700_001_000, KindFilter::ACTIVITY)?;
//! assert_eq!(samples.len(), 1);
//! assert_eq!(provider.fetch_latest_timestamp()?, 1_700_000_000);
//! # Ok::<(), gadget_store::Error>(())
//! ```

use std::ops::Deref;

use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info, warn};

use gadget_types::{ActivityKind, ActivitySample, KindFilter, map_to_db_kinds};

use crate::error::{Error, Result};
use crate::queries::{self, SampleQuery};
use crate::store::Store;
use crate::tables::SampleTable;

/// Returned by [`SampleProvider::fetch_latest_timestamp`] for an empty table.
pub const NO_TIMESTAMP: i32 = -1;

/// Read and write access to the samples of one device table.
#[derive(Debug)]
pub struct SampleProvider<'s, T: SampleTable> {
    store: &'s Store,
    table: T,
}

/// A sample together with the table that resolves its device-specific fields.
#[derive(Debug, Clone)]
pub struct ProvidedSample<'p, T: SampleTable> {
    sample: T::Sample,
    table: &'p T,
}

impl<'p, T: SampleTable> ProvidedSample<'p, T> {
    /// The stored record.
    pub fn sample(&self) -> &T::Sample {
        &self.sample
    }

    /// The table this sample was read from.
    pub fn table(&self) -> &'p T {
        self.table
    }

    /// Normalized kind of this sample.
    pub fn kind(&self) -> ActivityKind {
        self.table.normalize_kind(self.sample.raw_kind())
    }

    /// Normalized intensity in `0.0..=1.0`.
    pub fn intensity(&self) -> f32 {
        self.table.normalize_intensity(self.sample.raw_intensity())
    }

    /// Consume the wrapper, returning the bare record.
    pub fn into_sample(self) -> T::Sample {
        self.sample
    }
}

impl<T: SampleTable> Deref for ProvidedSample<'_, T> {
    type Target = T::Sample;

    fn deref(&self) -> &Self::Target {
        &self.sample
    }
}

impl<'s, T: SampleTable> SampleProvider<'s, T> {
    /// Create a provider for `table` backed by `store`.
    pub fn new(store: &'s Store, table: T) -> Self {
        Self { store, table }
    }

    /// The device table this provider reads and writes.
    pub fn table(&self) -> &T {
        &self.table
    }

    // === Queries ===

    /// All samples in `[from, to]`, regardless of kind.
    pub fn all_samples(&self, from: i32, to: i32) -> Result<Vec<ProvidedSample<'_, T>>> {
        self.samples(from, to, KindFilter::ALL)
    }

    /// Activity samples in `[from, to]`.
    pub fn activity_samples(&self, from: i32, to: i32) -> Result<Vec<ProvidedSample<'_, T>>> {
        self.samples(from, to, KindFilter::ACTIVITY)
    }

    /// Sleep samples in `[from, to]`.
    pub fn sleep_samples(&self, from: i32, to: i32) -> Result<Vec<ProvidedSample<'_, T>>> {
        self.samples(from, to, KindFilter::SLEEP)
    }

    /// Samples in the inclusive range `[from, to]` matching `filter`.
    pub fn samples(
        &self,
        from: i32,
        to: i32,
        filter: KindFilter,
    ) -> Result<Vec<ProvidedSample<'_, T>>> {
        let query = self.range_query(from, to, filter);
        let samples = query_on::<T>(self.store.conn(), &query)?;
        Ok(samples
            .into_iter()
            .map(|sample| ProvidedSample {
                sample,
                table: &self.table,
            })
            .collect())
    }

    /// Run an arbitrary query against this table.
    pub fn query(&self, query: &SampleQuery) -> Result<Vec<T::Sample>> {
        query_on::<T>(self.store.conn(), query)
    }

    /// Query for `[from, to]` restricted to the raw codes `filter` maps to.
    pub fn range_query(&self, from: i32, to: i32, filter: KindFilter) -> SampleQuery {
        let query = SampleQuery::new().between(from, to);
        if filter.is_all() {
            return query;
        }

        let raw_kinds = map_to_db_kinds(filter, &self.table);
        if raw_kinds.is_empty() {
            warn!("{} stores no kind selected by filter '{}'", T::TABLE, filter);
        }
        query.kinds(raw_kinds)
    }

    /// The most recent stored timestamp, if any.
    pub fn latest_timestamp(&self) -> Result<Option<i32>> {
        let query = SampleQuery::new().newest_first().limit(1);
        let mut samples = self.query(&query)?;
        Ok(samples.pop().map(|s| s.timestamp()))
    }

    /// The most recent stored timestamp, or [`NO_TIMESTAMP`] for an empty table.
    pub fn fetch_latest_timestamp(&self) -> Result<i32> {
        Ok(self.latest_timestamp()?.unwrap_or(NO_TIMESTAMP))
    }

    /// Number of stored samples.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self.store.conn().query_row(
            &format!("SELECT COUNT(*) FROM {}", T::TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // === Writes ===

    /// Insert `sample`, replacing any stored sample with the same key.
    pub fn add_sample(&self, sample: &T::Sample) -> Result<()> {
        insert_or_replace_on::<T>(self.store.conn(), std::slice::from_ref(sample))?;
        Ok(())
    }

    /// Insert or replace `samples` in a single transaction.
    pub fn add_samples(&self, samples: &[T::Sample]) -> Result<usize> {
        let tx = self.store.conn().unchecked_transaction()?;
        let written = insert_or_replace_on::<T>(&tx, samples)?;
        tx.commit()?;

        info!("Stored {} samples in {}", written, T::TABLE);
        Ok(written)
    }

    /// Update already stored `samples` in a single transaction.
    ///
    /// Samples without a stored counterpart are skipped. Returns the number
    /// of rows changed.
    pub fn update_samples(&self, samples: &[T::Sample]) -> Result<usize> {
        let tx = self.store.conn().unchecked_transaction()?;
        let updated = update_on::<T>(&tx, samples)?;
        tx.commit()?;
        Ok(updated)
    }

    /// Reassign every sample in `[from, to]` to `kind`.
    pub fn change_stored_samples_type(
        &self,
        from: i32,
        to: i32,
        kind: ActivityKind,
    ) -> Result<usize> {
        self.reclassify(from, to, KindFilter::ALL, kind)
    }

    /// Reassign the samples in `[from, to]` matching `source` to `target`.
    pub fn change_stored_samples_kind(
        &self,
        from: i32,
        to: i32,
        source: KindFilter,
        target: ActivityKind,
    ) -> Result<usize> {
        self.reclassify(from, to, source, target)
    }

    fn reclassify(
        &self,
        from: i32,
        to: i32,
        source: KindFilter,
        target: ActivityKind,
    ) -> Result<usize> {
        let raw_kind = self
            .table
            .to_raw_kind(target)
            .ok_or(Error::UnsupportedKind {
                table: T::TABLE,
                kind: target,
            })?;

        let query = self.range_query(from, to, source);

        // read and write under one transaction
        let tx = self.store.conn().unchecked_transaction()?;
        let mut samples = query_on::<T>(&tx, &query)?;
        for sample in &mut samples {
            sample.set_raw_kind(raw_kind);
        }
        let updated = update_on::<T>(&tx, &samples)?;
        tx.commit()?;

        info!(
            "Reclassified {} samples in {} [{}, {}] from '{}' to {}",
            updated,
            T::TABLE,
            from,
            to,
            source,
            target
        );
        Ok(updated)
    }
}

fn query_on<T: SampleTable>(conn: &Connection, query: &SampleQuery) -> Result<Vec<T::Sample>> {
    let sql = query.build_sql::<T>();
    let (_, params) = query.build_where::<T>();

    debug!("Executing query: {}", sql);

    let mut stmt = conn.prepare(&sql)?;
    let samples = stmt
        .query_map(params_from_iter(params), T::decode)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(samples)
}

fn insert_or_replace_on<T: SampleTable>(conn: &Connection, samples: &[T::Sample]) -> Result<usize> {
    let mut stmt = conn.prepare(&queries::insert_or_replace_sql::<T>())?;
    let mut written = 0;
    for sample in samples {
        written += stmt.execute(params_from_iter(T::encode(sample)))?;
    }
    Ok(written)
}

fn update_on<T: SampleTable>(conn: &Connection, samples: &[T::Sample]) -> Result<usize> {
    let mut stmt = conn.prepare(&queries::update_sql::<T>())?;
    let key_count = T::KEY_COLUMNS.len();
    let mut updated = 0;
    for sample in samples {
        let values = T::encode(sample);
        let (keys, rest) = values.split_at(key_count);
        updated += stmt.execute(params_from_iter(rest.iter().chain(keys)))?;
    }
    debug!("Updated {} rows in {}", updated, T::TABLE);
    Ok(updated)
}
