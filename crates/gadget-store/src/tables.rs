//! Device sample tables.
//!
//! Every device family keeps its samples in its own table, but all tables
//! share the same logical shape: a timestamp column, a raw kind column and
//! a primary key. [`SampleTable`] describes one such table so that
//! [`SampleProvider`](crate::SampleProvider) can query and update any of
//! them with the same code.

use std::fmt;

use rusqlite::Row;
use rusqlite::types::Value;

use gadget_types::{ActivityKind, ActivitySample, KindMapping, NOT_MEASURED};

use crate::models::{MiBandSample, PebbleHealthSample};

/// A device-specific sample table.
///
/// Column lists are ordered: rows are selected as `KEY_COLUMNS` followed by
/// `VALUE_COLUMNS`, and [`encode`](Self::encode) / [`decode`](Self::decode)
/// use the same order.
pub trait SampleTable: KindMapping {
    /// Record type stored in this table.
    type Sample: ActivitySample + Clone + fmt::Debug;

    /// Table name.
    const TABLE: &'static str;

    /// Primary key columns; insert-or-replace is keyed on these.
    const KEY_COLUMNS: &'static [&'static str];

    /// Non-key columns.
    const VALUE_COLUMNS: &'static [&'static str];

    /// Column holding seconds since the Unix epoch.
    const TIMESTAMP_COLUMN: &'static str = "timestamp";

    /// Column holding the device-specific kind code.
    const RAW_KIND_COLUMN: &'static str = "raw_kind";

    /// Idempotent DDL creating the table and its indexes.
    const DDL: &'static str;

    /// Build a sample from a row selected in column order.
    fn decode(row: &Row<'_>) -> rusqlite::Result<Self::Sample>;

    /// Column values of `sample`, in column order.
    fn encode(sample: &Self::Sample) -> Vec<Value>;
}

/// Mi Band activity samples (`mi_band_activity_sample`).
#[derive(Debug, Clone, Copy, Default)]
pub struct MiBandTable;

impl MiBandTable {
    pub const KIND_ACTIVITY: i32 = 1;
    pub const KIND_NOT_WORN: i32 = 3;
    pub const KIND_DEEP_SLEEP: i32 = 4;
    pub const KIND_LIGHT_SLEEP: i32 = 5;
    pub const KIND_CHARGING: i32 = 6;
}

impl KindMapping for MiBandTable {
    fn to_raw_kind(&self, kind: ActivityKind) -> Option<i32> {
        match kind {
            ActivityKind::Activity => Some(Self::KIND_ACTIVITY),
            ActivityKind::NotWorn => Some(Self::KIND_NOT_WORN),
            ActivityKind::DeepSleep => Some(Self::KIND_DEEP_SLEEP),
            ActivityKind::LightSleep => Some(Self::KIND_LIGHT_SLEEP),
            _ => None,
        }
    }

    fn normalize_kind(&self, raw_kind: i32) -> ActivityKind {
        match raw_kind {
            NOT_MEASURED => ActivityKind::NotMeasured,
            Self::KIND_ACTIVITY => ActivityKind::Activity,
            // a charging band is off the wrist
            Self::KIND_NOT_WORN | Self::KIND_CHARGING => ActivityKind::NotWorn,
            Self::KIND_DEEP_SLEEP => ActivityKind::DeepSleep,
            Self::KIND_LIGHT_SLEEP => ActivityKind::LightSleep,
            _ => ActivityKind::Unknown,
        }
    }

    fn normalize_intensity(&self, raw_intensity: i32) -> f32 {
        normalize(raw_intensity, 255.0)
    }
}

impl SampleTable for MiBandTable {
    type Sample = MiBandSample;

    const TABLE: &'static str = "mi_band_activity_sample";
    const KEY_COLUMNS: &'static [&'static str] = &["timestamp", "device_id"];
    const VALUE_COLUMNS: &'static [&'static str] =
        &["user_id", "raw_intensity", "steps", "raw_kind", "heart_rate"];
    const DDL: &'static str = r#"
        CREATE TABLE IF NOT EXISTS mi_band_activity_sample (
            timestamp INTEGER NOT NULL,
            device_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            raw_intensity INTEGER NOT NULL,
            steps INTEGER NOT NULL,
            raw_kind INTEGER NOT NULL,
            heart_rate INTEGER NOT NULL,
            PRIMARY KEY (timestamp, device_id)
        );
        CREATE INDEX IF NOT EXISTS idx_mi_band_activity_sample_kind
            ON mi_band_activity_sample(raw_kind, timestamp);
    "#;

    fn decode(row: &Row<'_>) -> rusqlite::Result<MiBandSample> {
        Ok(MiBandSample {
            timestamp: row.get(0)?,
            device_id: row.get(1)?,
            user_id: row.get(2)?,
            raw_intensity: row.get(3)?,
            steps: row.get(4)?,
            raw_kind: row.get(5)?,
            heart_rate: row.get(6)?,
        })
    }

    fn encode(sample: &MiBandSample) -> Vec<Value> {
        vec![
            Value::Integer(i64::from(sample.timestamp)),
            Value::Integer(sample.device_id),
            Value::Integer(sample.user_id),
            Value::Integer(i64::from(sample.raw_intensity)),
            Value::Integer(i64::from(sample.steps)),
            Value::Integer(i64::from(sample.raw_kind)),
            Value::Integer(i64::from(sample.heart_rate)),
        ]
    }
}

/// Pebble Health samples (`pebble_health_activity_sample`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PebbleHealthTable;

impl PebbleHealthTable {
    pub const KIND_ACTIVITY: i32 = 0;
    pub const KIND_LIGHT_SLEEP: i32 = 1;
    pub const KIND_DEEP_SLEEP: i32 = 2;
    pub const KIND_NOT_WORN: i32 = 3;
}

impl KindMapping for PebbleHealthTable {
    fn to_raw_kind(&self, kind: ActivityKind) -> Option<i32> {
        match kind {
            ActivityKind::Activity => Some(Self::KIND_ACTIVITY),
            ActivityKind::LightSleep => Some(Self::KIND_LIGHT_SLEEP),
            ActivityKind::DeepSleep => Some(Self::KIND_DEEP_SLEEP),
            ActivityKind::NotWorn => Some(Self::KIND_NOT_WORN),
            _ => None,
        }
    }

    fn normalize_kind(&self, raw_kind: i32) -> ActivityKind {
        match raw_kind {
            NOT_MEASURED => ActivityKind::NotMeasured,
            Self::KIND_ACTIVITY => ActivityKind::Activity,
            Self::KIND_LIGHT_SLEEP => ActivityKind::LightSleep,
            Self::KIND_DEEP_SLEEP => ActivityKind::DeepSleep,
            Self::KIND_NOT_WORN => ActivityKind::NotWorn,
            _ => ActivityKind::Unknown,
        }
    }

    fn normalize_intensity(&self, raw_intensity: i32) -> f32 {
        normalize(raw_intensity, 4000.0)
    }
}

impl SampleTable for PebbleHealthTable {
    type Sample = PebbleHealthSample;

    const TABLE: &'static str = "pebble_health_activity_sample";
    const KEY_COLUMNS: &'static [&'static str] = &["timestamp", "device_id"];
    const VALUE_COLUMNS: &'static [&'static str] =
        &["user_id", "raw_intensity", "steps", "raw_kind", "orientation"];
    const DDL: &'static str = r#"
        CREATE TABLE IF NOT EXISTS pebble_health_activity_sample (
            timestamp INTEGER NOT NULL,
            device_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            raw_intensity INTEGER NOT NULL,
            steps INTEGER NOT NULL,
            raw_kind INTEGER NOT NULL,
            orientation INTEGER NOT NULL,
            PRIMARY KEY (timestamp, device_id)
        );
        CREATE INDEX IF NOT EXISTS idx_pebble_health_activity_sample_kind
            ON pebble_health_activity_sample(raw_kind, timestamp);
    "#;

    fn decode(row: &Row<'_>) -> rusqlite::Result<PebbleHealthSample> {
        Ok(PebbleHealthSample {
            timestamp: row.get(0)?,
            device_id: row.get(1)?,
            user_id: row.get(2)?,
            raw_intensity: row.get(3)?,
            steps: row.get(4)?,
            raw_kind: row.get(5)?,
            orientation: row.get(6)?,
        })
    }

    fn encode(sample: &PebbleHealthSample) -> Vec<Value> {
        vec![
            Value::Integer(i64::from(sample.timestamp)),
            Value::Integer(sample.device_id),
            Value::Integer(sample.user_id),
            Value::Integer(i64::from(sample.raw_intensity)),
            Value::Integer(i64::from(sample.steps)),
            Value::Integer(i64::from(sample.raw_kind)),
            Value::Integer(i64::from(sample.orientation)),
        ]
    }
}

/// Scale a raw intensity into `0.0..=1.0`; unmeasured values become 0.
fn normalize(raw_intensity: i32, max: f32) -> f32 {
    if raw_intensity <= 0 {
        return 0.0;
    }
    (raw_intensity as f32 / max).min(1.0)
}
