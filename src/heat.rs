//! Pace heat scale for activity table rows.
//!
//! Maps a pace (min/km) to one of seven ordered color buckets, plus a neutral
//! bucket for rows without a pace. Faster pace = green, slower pace = red.
//!
//! ## Example
//! ```rust
//! use activity_progress::heat::{pace_heat_bucket, pace_heat_color, PaceHeatBucket};
//!
//! assert_eq!(pace_heat_bucket(4.8), PaceHeatBucket::VeryFast);
//! assert_eq!(pace_heat_bucket(5.0), PaceHeatBucket::Fast);
//! assert_eq!(pace_heat_color(0.0), "inherit");
//! ```

use serde::{Deserialize, Serialize};

use crate::units::speed_to_pace;

/// Ordered heat-scale bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum PaceHeatBucket {
    /// No pace recorded
    Neutral,
    VeryFast,
    Fast,
    Good,
    Moderate,
    Average,
    Slow,
    VerySlow,
}

/// Colored buckets in ascending pace order.
const COLORED_BUCKETS: [PaceHeatBucket; 7] = [
    PaceHeatBucket::VeryFast,
    PaceHeatBucket::Fast,
    PaceHeatBucket::Good,
    PaceHeatBucket::Moderate,
    PaceHeatBucket::Average,
    PaceHeatBucket::Slow,
    PaceHeatBucket::VerySlow,
];

impl PaceHeatBucket {
    /// Display color identifier consumed by the rendering layer.
    pub fn color(&self) -> &'static str {
        match self {
            PaceHeatBucket::Neutral => "inherit",
            PaceHeatBucket::VeryFast => "var(--trend-positive)",
            PaceHeatBucket::Fast => "#4caf50",
            PaceHeatBucket::Good => "#8bc34a",
            PaceHeatBucket::Moderate => "#cddc39",
            PaceHeatBucket::Average => "#ffeb3b",
            PaceHeatBucket::Slow => "#ff9800",
            PaceHeatBucket::VerySlow => "#ff5722",
        }
    }
}

/// Upper bounds (exclusive, min/km) of the first six colored buckets.
/// Everything at or above the last bound is VerySlow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceHeatScale {
    pub thresholds: [f64; 6],
}

impl PaceHeatScale {
    pub fn with_thresholds(thresholds: [f64; 6]) -> Self {
        Self { thresholds }
    }

    /// Bucket for a pace. The first threshold the pace is below wins.
    pub fn bucket(&self, pace: f64) -> PaceHeatBucket {
        if pace.is_nan() || pace <= 0.0 {
            return PaceHeatBucket::Neutral;
        }
        for (i, &threshold) in self.thresholds.iter().enumerate() {
            if pace < threshold {
                return COLORED_BUCKETS[i];
            }
        }
        PaceHeatBucket::VerySlow
    }
}

impl Default for PaceHeatScale {
    fn default() -> Self {
        Self {
            thresholds: [5.0, 5.5, 6.0, 6.5, 7.0, 7.5],
        }
    }
}

/// Bucket for a pace on the default scale.
pub fn pace_heat_bucket(pace: f64) -> PaceHeatBucket {
    PaceHeatScale::default().bucket(pace)
}

/// Color identifier for a pace on the default scale.
pub fn pace_heat_color(pace: f64) -> &'static str {
    pace_heat_bucket(pace).color()
}

/// Color identifier for a row that only carries average speed (m/s).
pub fn heat_color_for_speed(meters_per_second: f64) -> &'static str {
    pace_heat_color(speed_to_pace(meters_per_second))
}

/// Count of activities per heat bucket, for a legend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatDistribution {
    /// Activities without a pace
    pub neutral: u32,
    /// Counts for VeryFast..VerySlow
    pub bucket_counts: [u32; 7],
    /// Percentage of paced activities per bucket
    pub bucket_percentages: [f64; 7],
}

/// Distribute paces over the heat scale.
pub fn heat_distribution(paces: &[f64], scale: &PaceHeatScale) -> HeatDistribution {
    let mut distribution = HeatDistribution::default();

    for &pace in paces {
        let bucket = scale.bucket(pace);
        match COLORED_BUCKETS.iter().position(|b| *b == bucket) {
            Some(i) => distribution.bucket_counts[i] += 1,
            None => distribution.neutral += 1,
        }
    }

    let paced: u32 = distribution.bucket_counts.iter().sum();
    if paced > 0 {
        for i in 0..7 {
            distribution.bucket_percentages[i] =
                distribution.bucket_counts[i] as f64 / paced as f64 * 100.0;
        }
    }

    distribution
}
