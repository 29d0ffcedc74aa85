//! Data models for stored data.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use gadget_types::{ActivityKind, ActivitySample};

/// A device stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDevice {
    /// Database row ID, referenced by `device_id` in sample tables.
    pub id: i64,
    /// Hardware identifier (usually the Bluetooth address).
    pub identifier: String,
    /// Device name.
    pub name: Option<String>,
    /// Device family, e.g. `mi-band` or `pebble`.
    pub device_type: Option<String>,
    /// First time this device was seen.
    #[serde(with = "time::serde::rfc3339")]
    pub first_seen: OffsetDateTime,
    /// Last time this device was seen.
    #[serde(with = "time::serde::rfc3339")]
    pub last_seen: OffsetDateTime,
}

/// One minute of activity recorded by a Mi Band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiBandSample {
    /// Seconds since the Unix epoch.
    pub timestamp: i32,
    /// Owning device row.
    pub device_id: i64,
    /// Owning user row.
    pub user_id: i64,
    /// Movement intensity, 0-255.
    pub raw_intensity: i32,
    /// Steps in this minute.
    pub steps: i32,
    /// Mi Band kind code.
    pub raw_kind: i32,
    /// Heart rate, or 255 / -1 when not measured.
    pub heart_rate: i32,
}

impl ActivitySample for MiBandSample {
    fn timestamp(&self) -> i32 {
        self.timestamp
    }

    fn raw_kind(&self) -> i32 {
        self.raw_kind
    }

    fn set_raw_kind(&mut self, raw_kind: i32) {
        self.raw_kind = raw_kind;
    }

    fn device_id(&self) -> i64 {
        self.device_id
    }

    fn raw_intensity(&self) -> i32 {
        self.raw_intensity
    }

    fn steps(&self) -> i32 {
        self.steps
    }

    fn heart_rate(&self) -> i32 {
        self.heart_rate
    }
}

/// One minute of Pebble Health data.
///
/// Pebble Health has no heart rate sensor; it reports wrist orientation
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PebbleHealthSample {
    /// Seconds since the Unix epoch.
    pub timestamp: i32,
    /// Owning device row.
    pub device_id: i64,
    /// Owning user row.
    pub user_id: i64,
    /// Vector magnitude of movement.
    pub raw_intensity: i32,
    /// Steps in this minute.
    pub steps: i32,
    /// Pebble Health kind code.
    pub raw_kind: i32,
    /// Dominant wrist orientation bucket.
    pub orientation: i32,
}

impl ActivitySample for PebbleHealthSample {
    fn timestamp(&self) -> i32 {
        self.timestamp
    }

    fn raw_kind(&self) -> i32 {
        self.raw_kind
    }

    fn set_raw_kind(&mut self, raw_kind: i32) {
        self.raw_kind = raw_kind;
    }

    fn device_id(&self) -> i64 {
        self.device_id
    }

    fn raw_intensity(&self) -> i32 {
        self.raw_intensity
    }

    fn steps(&self) -> i32 {
        self.steps
    }
}

/// A normalized sample, as written by the CSV and JSON exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    /// Seconds since the Unix epoch.
    pub timestamp: i32,
    /// The timestamp in RFC 3339.
    pub time: String,
    /// Owning device row.
    pub device_id: i64,
    /// Normalized kind.
    pub kind: ActivityKind,
    /// Stored kind code.
    pub raw_kind: i32,
    /// Normalized intensity in `0.0..=1.0`.
    pub intensity: f32,
    /// Steps, or -1 when not measured.
    pub steps: i32,
    /// Heart rate, or -1 when not measured.
    pub heart_rate: i32,
}

impl ExportRow {
    /// Column names, in serialization order.
    pub const COLUMNS: [&'static str; 8] = [
        "timestamp",
        "time",
        "device_id",
        "kind",
        "raw_kind",
        "intensity",
        "steps",
        "heart_rate",
    ];
}
