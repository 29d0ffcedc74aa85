//! CSV and JSON export of normalized samples.

use std::io::Write;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use gadget_types::{ActivitySample, KindFilter};

use crate::error::{Error, Result};
use crate::models::ExportRow;
use crate::provider::{ProvidedSample, SampleProvider};
use crate::tables::SampleTable;

impl<T: SampleTable> ProvidedSample<'_, T> {
    /// Normalize this sample into an export row.
    pub fn to_export_row(&self) -> Result<ExportRow> {
        let time = OffsetDateTime::from_unix_timestamp(i64::from(self.timestamp()))
            .map_err(|e| Error::InvalidTimestamp(e.to_string()))?
            .format(&Rfc3339)
            .map_err(|e| Error::InvalidTimestamp(e.to_string()))?;

        Ok(ExportRow {
            timestamp: self.timestamp(),
            time,
            device_id: self.device_id(),
            kind: self.kind(),
            raw_kind: self.raw_kind(),
            intensity: self.intensity(),
            steps: self.steps(),
            heart_rate: self.heart_rate(),
        })
    }
}

impl<T: SampleTable> SampleProvider<'_, T> {
    /// Normalized rows for the samples in `[from, to]` matching `filter`.
    pub fn export_rows(&self, from: i32, to: i32, filter: KindFilter) -> Result<Vec<ExportRow>> {
        self.samples(from, to, filter)?
            .iter()
            .map(ProvidedSample::to_export_row)
            .collect()
    }

    /// Write matching samples as CSV with a header row.
    ///
    /// The header is written even when no sample matches. Returns the
    /// number of data rows written.
    pub fn export_csv<W: Write>(
        &self,
        from: i32,
        to: i32,
        filter: KindFilter,
        writer: W,
    ) -> Result<usize> {
        let rows = self.export_rows(from, to, filter)?;
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        // header even when nothing matched
        csv.write_record(ExportRow::COLUMNS)?;
        for row in &rows {
            csv.serialize(row)?;
        }
        csv.flush()?;

        info!("Exported {} samples from {} as CSV", rows.len(), T::TABLE);
        Ok(rows.len())
    }

    /// Write matching samples as a pretty-printed JSON array.
    ///
    /// Returns the number of samples written.
    pub fn export_json<W: Write>(
        &self,
        from: i32,
        to: i32,
        filter: KindFilter,
        writer: W,
    ) -> Result<usize> {
        let rows = self.export_rows(from, to, filter)?;
        serde_json::to_writer_pretty(writer, &rows)?;

        info!("Exported {} samples from {} as JSON", rows.len(), T::TABLE);
        Ok(rows.len())
    }
}
