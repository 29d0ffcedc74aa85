//! Activity kinds and the semantic kind filter.

use core::fmt;
use core::ops::BitOr;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Normalized kind of a single activity sample.
///
/// Device tables store their own raw integer codes; a [`KindMapping`]
/// translates between those codes and this enum.
///
/// [`KindMapping`]: crate::KindMapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[non_exhaustive]
pub enum ActivityKind {
    /// The device did not record anything for this sample.
    NotMeasured,
    /// The raw code is not known to the device mapping.
    Unknown,
    /// Awake and moving.
    Activity,
    /// Light sleep phase.
    LightSleep,
    /// Deep sleep phase.
    DeepSleep,
    /// The device was not being worn.
    NotWorn,
}

impl ActivityKind {
    /// Kinds that can be selected through a [`KindFilter`], in mapping order.
    pub const FILTERABLE: [ActivityKind; 4] = [
        ActivityKind::Activity,
        ActivityKind::DeepSleep,
        ActivityKind::LightSleep,
        ActivityKind::NotWorn,
    ];

    /// Filter bit for this kind, or `0` for kinds that cannot be filtered on.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            ActivityKind::Activity => KindFilter::ACTIVITY.0,
            ActivityKind::LightSleep => KindFilter::LIGHT_SLEEP.0,
            ActivityKind::DeepSleep => KindFilter::DEEP_SLEEP.0,
            ActivityKind::NotWorn => KindFilter::NOT_WORN.0,
            ActivityKind::NotMeasured | ActivityKind::Unknown => 0,
        }
    }

    /// Whether this kind is one of the sleep phases.
    #[must_use]
    pub fn is_sleep(self) -> bool {
        matches!(self, ActivityKind::LightSleep | ActivityKind::DeepSleep)
    }

    /// Stable lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::NotMeasured => "not-measured",
            ActivityKind::Unknown => "unknown",
            ActivityKind::Activity => "activity",
            ActivityKind::LightSleep => "light-sleep",
            ActivityKind::DeepSleep => "deep-sleep",
            ActivityKind::NotWorn => "not-worn",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = ParseError;

    /// Parse a kind name (case-insensitive, `_` and `-` interchangeable).
    ///
    /// ```
    /// use gadget_types::ActivityKind;
    ///
    /// assert_eq!("deep-sleep".parse(), Ok(ActivityKind::DeepSleep));
    /// assert_eq!("deep_sleep".parse(), Ok(ActivityKind::DeepSleep));
    /// assert_eq!("Not-Worn".parse(), Ok(ActivityKind::NotWorn));
    /// assert!("walking".parse::<ActivityKind>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "not-measured" => Ok(ActivityKind::NotMeasured),
            "unknown" => Ok(ActivityKind::Unknown),
            "activity" => Ok(ActivityKind::Activity),
            "light-sleep" => Ok(ActivityKind::LightSleep),
            "deep-sleep" => Ok(ActivityKind::DeepSleep),
            "not-worn" => Ok(ActivityKind::NotWorn),
            _ => Err(ParseError::UnknownKind(s.to_string())),
        }
    }
}

fn normalize_name(s: &str) -> String {
    s.trim().to_lowercase().replace('_', "-")
}

/// Semantic selection of activity kinds used when querying samples.
///
/// A filter is a set over the filterable [`ActivityKind`]s. [`KindFilter::ALL`]
/// is special: it places no restriction on the stored raw kind at all, so
/// samples with codes unknown to the device mapping are included too.
///
/// ```
/// use gadget_types::{ActivityKind, KindFilter};
///
/// let sleep = KindFilter::SLEEP;
/// assert!(sleep.contains(ActivityKind::DeepSleep));
/// assert!(!sleep.contains(ActivityKind::Activity));
/// assert_eq!(KindFilter::LIGHT_SLEEP | KindFilter::DEEP_SLEEP, KindFilter::SLEEP);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindFilter(u8);

impl KindFilter {
    /// Selects nothing.
    pub const NONE: KindFilter = KindFilter(0);
    /// Awake activity.
    pub const ACTIVITY: KindFilter = KindFilter(0b0001);
    /// Light sleep.
    pub const LIGHT_SLEEP: KindFilter = KindFilter(0b0010);
    /// Deep sleep.
    pub const DEEP_SLEEP: KindFilter = KindFilter(0b0100);
    /// Device not worn.
    pub const NOT_WORN: KindFilter = KindFilter(0b1000);
    /// Any sleep phase.
    pub const SLEEP: KindFilter = KindFilter(0b0110);
    /// Every sample regardless of raw kind.
    pub const ALL: KindFilter = KindFilter(0b1111);

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build a filter from raw bits, dropping unknown bits.
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        KindFilter(bits & Self::ALL.0)
    }

    /// True when this filter places no restriction on the raw kind.
    #[must_use]
    pub const fn is_all(self) -> bool {
        self.0 == Self::ALL.0
    }

    /// True when this filter selects no kind.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether `kind` is selected by this filter.
    #[must_use]
    pub const fn contains(self, kind: ActivityKind) -> bool {
        let bit = kind.bit();
        bit != 0 && self.0 & bit == bit
    }

    /// Selected kinds, in mapping order.
    pub fn kinds(self) -> impl Iterator<Item = ActivityKind> {
        ActivityKind::FILTERABLE
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl BitOr for KindFilter {
    type Output = KindFilter;

    fn bitor(self, rhs: Self) -> Self::Output {
        KindFilter(self.0 | rhs.0)
    }
}

impl From<ActivityKind> for KindFilter {
    fn from(kind: ActivityKind) -> Self {
        KindFilter(kind.bit())
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            KindFilter::ALL => f.write_str("all"),
            KindFilter::SLEEP => f.write_str("sleep"),
            KindFilter::NONE => f.write_str("none"),
            filter => {
                let names: Vec<&str> = filter.kinds().map(ActivityKind::as_str).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

impl FromStr for KindFilter {
    type Err = ParseError;

    /// Parse a comma separated list of kind names; `all`, `sleep` and
    /// `none` are accepted as shorthands.
    ///
    /// ```
    /// use gadget_types::KindFilter;
    ///
    /// assert_eq!("all".parse(), Ok(KindFilter::ALL));
    /// assert_eq!("activity,sleep".parse(), Ok(KindFilter::ACTIVITY | KindFilter::SLEEP));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut filter = KindFilter::NONE;
        let mut parts = 0;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            parts += 1;
            filter = filter
                | match normalize_name(part).as_str() {
                    "all" => KindFilter::ALL,
                    "sleep" => KindFilter::SLEEP,
                    "none" => KindFilter::NONE,
                    _ => {
                        let kind: ActivityKind = part.parse()?;
                        if kind.bit() == 0 {
                            return Err(ParseError::UnknownKind(part.to_string()));
                        }
                        KindFilter::from(kind)
                    }
                };
        }

        if parts == 0 {
            return Err(ParseError::EmptyKindList);
        }
        Ok(filter)
    }
}
