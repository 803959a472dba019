//! Race-distance buckets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marathon distance in kilometers.
pub const MARATHON_KM: f64 = 42.195;

/// Half-marathon distance in kilometers, as recorded in the catalog.
pub const HALF_MARATHON_KM: f64 = 21.1;

/// Allowed deviation for named-race buckets (exclusive).
pub const NAMED_RACE_TOLERANCE_KM: f64 = 0.1;

/// A distance filter category.
///
/// Named-race buckets match a target distance within [`NAMED_RACE_TOLERANCE_KM`];
/// discrete buckets are half-open ranges: `≤ 5`, `(5, 10]`, `(10, 21]`, `> 21`.
/// An event without a distance only matches [`DistanceBucket::All`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceBucket {
    /// No distance filter
    #[default]
    All,
    /// 42.195 km
    Marathon,
    /// 21.1 km
    HalfMarathon,
    /// Up to 5 km
    UpTo5,
    /// More than 5, up to 10 km
    From5To10,
    /// More than 10, up to 21 km
    From10To21,
    /// More than 21 km
    Over21,
}

impl DistanceBucket {
    /// Every bucket, in menu order.
    pub const ALL: [Self; 7] = [
        Self::All,
        Self::Marathon,
        Self::HalfMarathon,
        Self::UpTo5,
        Self::From5To10,
        Self::From10To21,
        Self::Over21,
    ];

    /// Returns true if an event with the given distance falls into this bucket.
    pub fn matches(self, distance_km: Option<f64>) -> bool {
        if self == Self::All {
            return true;
        }
        let Some(d) = distance_km else {
            return false;
        };

        match self {
            Self::All => true,
            Self::Marathon => within_tolerance(d, MARATHON_KM),
            Self::HalfMarathon => within_tolerance(d, HALF_MARATHON_KM),
            Self::UpTo5 => d <= 5.0,
            Self::From5To10 => d > 5.0 && d <= 10.0,
            Self::From10To21 => d > 10.0 && d <= 21.0,
            Self::Over21 => d > 21.0,
        }
    }

    /// Stable identifier used on the command line and in JSON.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Marathon => "marathon",
            Self::HalfMarathon => "half-marathon",
            Self::UpTo5 => "up-to5",
            Self::From5To10 => "from5-to10",
            Self::From10To21 => "from10-to21",
            Self::Over21 => "over21",
        }
    }

    /// German menu label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "Alle Distanzen",
            Self::Marathon => "Marathon (42,195 km)",
            Self::HalfMarathon => "Halbmarathon (21,1 km)",
            Self::UpTo5 => "Bis 5 km",
            Self::From5To10 => "5 bis 10 km",
            Self::From10To21 => "10 bis 21 km",
            Self::Over21 => "Über 21 km",
        }
    }
}

fn within_tolerance(distance: f64, target: f64) -> bool {
    (distance - target).abs() < NAMED_RACE_TOLERANCE_KM
}

impl fmt::Display for DistanceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown bucket name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown distance bucket '{0}' (expected one of: all, marathon, half-marathon, 5, 10, 21, 21+)")]
pub struct ParseBucketError(String);

impl FromStr for DistanceBucket {
    type Err = ParseBucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "marathon" | "42.195" => Ok(Self::Marathon),
            "half-marathon" | "halbmarathon" | "21.1" => Ok(Self::HalfMarathon),
            "up-to5" | "5" => Ok(Self::UpTo5),
            "from5-to10" | "10" => Ok(Self::From5To10),
            "from10-to21" | "21" => Ok(Self::From10To21),
            "over21" | "21+" => Ok(Self::Over21),
            _ => Err(ParseBucketError(s.to_string())),
        }
    }
}
