//! The common shape of activity samples and device kind mappings.

use crate::types::{ActivityKind, KindFilter};

/// Value stored for fields a device did not measure.
pub const NOT_MEASURED: i32 = -1;

/// Accessors shared by every device-specific activity sample.
///
/// A sample is a timestamped record with a device-specific raw kind code.
/// Only the timestamp and raw kind are required; the remaining accessors
/// default to [`NOT_MEASURED`] for devices that lack them.
pub trait ActivitySample {
    /// Seconds since the Unix epoch.
    fn timestamp(&self) -> i32;

    /// Device-specific kind code.
    fn raw_kind(&self) -> i32;

    /// Overwrite the device-specific kind code.
    fn set_raw_kind(&mut self, raw_kind: i32);

    /// Device identifier this sample belongs to.
    fn device_id(&self) -> i64;

    /// Device-specific movement intensity.
    fn raw_intensity(&self) -> i32 {
        NOT_MEASURED
    }

    /// Steps counted during this sample.
    fn steps(&self) -> i32 {
        NOT_MEASURED
    }

    /// Heart rate in beats per minute.
    fn heart_rate(&self) -> i32 {
        NOT_MEASURED
    }
}

/// Translation between semantic kinds and a device table's raw codes.
///
/// This is the device context consulted when building kind predicates and
/// when normalizing stored samples.
pub trait KindMapping {
    /// Raw code a device stores for `kind`, if the device records it at all.
    fn to_raw_kind(&self, kind: ActivityKind) -> Option<i32>;

    /// Normalized kind for a stored raw code.
    fn normalize_kind(&self, raw_kind: i32) -> ActivityKind;

    /// Normalized intensity in `0.0..=1.0`.
    fn normalize_intensity(&self, raw_intensity: i32) -> f32;
}

/// Map a semantic filter onto the raw codes a device stores.
///
/// Kinds the device does not record are skipped and duplicate codes are
/// collapsed, so the result may be shorter than the number of selected
/// kinds, or empty.
///
/// ```
/// use gadget_types::{map_to_db_kinds, ActivityKind, KindFilter, KindMapping};
///
/// struct Band;
///
/// impl KindMapping for Band {
///     fn to_raw_kind(&self, kind: ActivityKind) -> Option<i32> {
///         match kind {
///             ActivityKind::Activity => Some(1),
///             ActivityKind::LightSleep => Some(5),
///             ActivityKind::DeepSleep => Some(4),
///             _ => None,
///         }
///     }
///     fn normalize_kind(&self, _raw: i32) -> ActivityKind {
///         ActivityKind::Unknown
///     }
///     fn normalize_intensity(&self, _raw: i32) -> f32 {
///         0.0
///     }
/// }
///
/// assert_eq!(map_to_db_kinds(KindFilter::SLEEP, &Band), vec![4, 5]);
/// assert!(map_to_db_kinds(KindFilter::NOT_WORN, &Band).is_empty());
/// ```
pub fn map_to_db_kinds<M>(filter: KindFilter, device: &M) -> Vec<i32>
where
    M: KindMapping + ?Sized,
{
    let mut codes = Vec::new();
    for code in filter.kinds().filter_map(|kind| device.to_raw_kind(kind)) {
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}
