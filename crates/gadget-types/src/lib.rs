//! Platform-agnostic types for fitness tracker activity samples.
//!
//! This crate provides the shared vocabulary used by the storage layer
//! (gadget-store) and its callers.
//!
//! # Features
//!
//! - Normalized activity kinds and the semantic [`KindFilter`]
//! - The [`ActivitySample`] accessor trait implemented by device samples
//! - The [`KindMapping`] device context and [`map_to_db_kinds`]
//! - Error types for kind name parsing
//!
//! # Example
//!
//! ```
//! use gadget_types::{ActivityKind, KindFilter};
//!
//! let filter: KindFilter = "sleep".parse()?;
//! assert!(filter.contains(ActivityKind::LightSleep));
//! # Ok::<(), gadget_types::ParseError>(())
//! ```

pub mod error;
pub mod sample;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use sample::{ActivitySample, KindMapping, NOT_MEASURED, map_to_db_kinds};
pub use types::{ActivityKind, KindFilter};

#[cfg(test)]
mod tests {
    use super::*;

    /// Mapping with a shared code for both sleep phases.
    struct CoarseDevice;

    impl KindMapping for CoarseDevice {
        fn to_raw_kind(&self, kind: ActivityKind) -> Option<i32> {
            match kind {
                ActivityKind::Activity => Some(10),
                ActivityKind::LightSleep | ActivityKind::DeepSleep => Some(20),
                _ => None,
            }
        }

        fn normalize_kind(&self, raw_kind: i32) -> ActivityKind {
            match raw_kind {
                10 => ActivityKind::Activity,
                20 => ActivityKind::LightSleep,
                _ => ActivityKind::Unknown,
            }
        }

        fn normalize_intensity(&self, raw_intensity: i32) -> f32 {
            raw_intensity as f32 / 100.0
        }
    }

    // --- KindFilter tests ---

    #[test]
    fn test_filter_all_contains_every_filterable_kind() {
        for kind in ActivityKind::FILTERABLE {
            assert!(KindFilter::ALL.contains(kind));
        }
        assert!(!KindFilter::ALL.contains(ActivityKind::Unknown));
        assert!(!KindFilter::ALL.contains(ActivityKind::NotMeasured));
    }

    #[test]
    fn test_filter_sleep_is_light_and_deep() {
        assert_eq!(
            KindFilter::LIGHT_SLEEP | KindFilter::DEEP_SLEEP,
            KindFilter::SLEEP
        );
        let kinds: Vec<_> = KindFilter::SLEEP.kinds().collect();
        assert_eq!(kinds, vec![ActivityKind::DeepSleep, ActivityKind::LightSleep]);
    }

    #[test]
    fn test_filter_is_all_only_for_full_set() {
        assert!(KindFilter::ALL.is_all());
        assert!(!KindFilter::SLEEP.is_all());
        assert!((KindFilter::ACTIVITY | KindFilter::SLEEP | KindFilter::NOT_WORN).is_all());
    }

    #[test]
    fn test_filter_from_bits_truncate() {
        assert_eq!(KindFilter::from_bits_truncate(0xFF), KindFilter::ALL);
        assert_eq!(KindFilter::from_bits_truncate(0x10), KindFilter::NONE);
    }

    #[test]
    fn test_filter_default_is_empty() {
        assert!(KindFilter::default().is_empty());
        assert_eq!(KindFilter::default().kinds().count(), 0);
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("ALL".parse(), Ok(KindFilter::ALL));
        assert_eq!("sleep".parse(), Ok(KindFilter::SLEEP));
        assert_eq!(
            "activity, not_worn".parse(),
            Ok(KindFilter::ACTIVITY | KindFilter::NOT_WORN)
        );
        assert_eq!("none".parse(), Ok(KindFilter::NONE));
        assert_eq!("".parse::<KindFilter>(), Err(ParseError::EmptyKindList));
        assert_eq!(" , ".parse::<KindFilter>(), Err(ParseError::EmptyKindList));
        assert_eq!(
            "unknown".parse::<KindFilter>(),
            Err(ParseError::UnknownKind("unknown".to_string()))
        );
        assert!("swimming".parse::<KindFilter>().is_err());
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(KindFilter::ALL.to_string(), "all");
        assert_eq!(KindFilter::SLEEP.to_string(), "sleep");
        assert_eq!(
            (KindFilter::ACTIVITY | KindFilter::DEEP_SLEEP).to_string(),
            "activity,deep-sleep"
        );
    }

    #[test]
    fn test_filter_display_parses_back() {
        for bits in 0..=KindFilter::ALL.bits() {
            let filter = KindFilter::from_bits_truncate(bits);
            assert_eq!(filter.to_string().parse(), Ok(filter));
        }
    }

    // --- ActivityKind tests ---

    #[test]
    fn test_kind_parse_and_display() {
        for kind in [
            ActivityKind::NotMeasured,
            ActivityKind::Unknown,
            ActivityKind::Activity,
            ActivityKind::LightSleep,
            ActivityKind::DeepSleep,
            ActivityKind::NotWorn,
        ] {
            assert_eq!(kind.to_string().parse(), Ok(kind));
        }
    }

    #[test]
    fn test_kind_is_sleep() {
        assert!(ActivityKind::LightSleep.is_sleep());
        assert!(ActivityKind::DeepSleep.is_sleep());
        assert!(!ActivityKind::Activity.is_sleep());
        assert!(!ActivityKind::NotWorn.is_sleep());
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ActivityKind::DeepSleep).unwrap(),
            "\"deep-sleep\""
        );
        let kind: ActivityKind = serde_json::from_str("\"not-worn\"").unwrap();
        assert_eq!(kind, ActivityKind::NotWorn);
    }

    // --- map_to_db_kinds tests ---

    #[test]
    fn test_map_collapses_shared_codes() {
        assert_eq!(map_to_db_kinds(KindFilter::SLEEP, &CoarseDevice), vec![20]);
    }

    #[test]
    fn test_map_skips_unrecorded_kinds() {
        assert_eq!(map_to_db_kinds(KindFilter::ALL, &CoarseDevice), vec![10, 20]);
        assert!(map_to_db_kinds(KindFilter::NOT_WORN, &CoarseDevice).is_empty());
    }

    #[test]
    fn test_map_empty_filter() {
        assert!(map_to_db_kinds(KindFilter::NONE, &CoarseDevice).is_empty());
    }

    #[test]
    fn test_map_through_trait_object() {
        let device: &dyn KindMapping = &CoarseDevice;
        assert_eq!(map_to_db_kinds(KindFilter::ACTIVITY, device), vec![10]);
    }
}
