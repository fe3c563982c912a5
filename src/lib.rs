//! # Activity Progress
//!
//! Analytics core for a personal activity log (runs, walks, rides).
//!
//! This library provides:
//! - Filtering by activity category, trailing time window and calendar year
//! - Per-activity metrics (pace, heart rate, elevation, calendar day)
//! - Trailing moving-average pace and cumulative distance
//! - Milestone crossings and personal-record detection
//! - Summary and per-year statistics
//! - Fixed-size widget summaries (weekly distance, recent pace)
//! - A pace heat scale for table rows
//!
//! Everything is a pure function of `(activities, filter parameters, now)`.
//! Rendering, storage and route geometry live outside this crate; outputs are
//! plain serde-serialisable structures.
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel per-year rollups with rayon
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use activity_progress::{
//!     compute_progress, ActivityType, FilterParams, ProgressConfig, RawActivity, TimeRange,
//! };
//! use activity_progress::units::parse_start_date;
//!
//! let activities = vec![
//!     RawActivity::new("Run", "2024-06-01 07:00:00", 5000.0, "0:25:00"),
//!     RawActivity::new("Run", "2024-06-03 07:00:00", 10000.0, "0:55:00"),
//! ];
//!
//! let now = parse_start_date("2024-06-15 12:00:00").unwrap();
//! let params = FilterParams::new(ActivityType::Run, TimeRange::ThreeMonths);
//! let progress = compute_progress(&activities, &params, now, &ProgressConfig::default());
//!
//! assert_eq!(progress.stats.count, 2);
//! assert_eq!(progress.stats.best_pace, 5.0);
//! ```

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

// Unified error handling
pub mod error;
pub use error::{ProgressError, Result};

// Duration parsing and unit conversion
pub mod units;

// Category / time window / year filtering
pub mod filter;
pub use filter::{available_years, filter_activities, ActivityType, FilterParams, TimeRange};

// Per-activity derived metrics and the JSON input boundary
pub mod metrics;
pub use metrics::{parse_activities_json, process_activities, process_activity};

// Moving averages and running sums
pub mod windows;
pub use windows::{cumulative_sum, moving_average, moving_averages};

// Milestone crossings and personal records
pub mod achievements;
pub use achievements::{
    detect_milestones, find_personal_record, reference_milestones, DEFAULT_MILESTONES_KM,
};

// Summary and per-year statistics
pub mod stats;
pub use stats::{summarize, year_stats, year_stats_all, YearSelection, YearStats};
#[cfg(feature = "parallel")]
pub use stats::year_stats_all_parallel;

// Weekly buckets, recent pace slices and goal progress
pub mod buckets;
pub use buckets::{goal_progress, recent_paces, weekly_distance_buckets, GoalProgress};

// Pace heat scale for table rows
pub mod heat;
pub use heat::{pace_heat_bucket, pace_heat_color, PaceHeatBucket};

// Chart point assembly and axis hints
pub mod chart;
pub use chart::{build_chart_points, chart_hints, AxisDomain, ChartHints};

// Main pipeline
pub mod pipeline;
pub use pipeline::{compute_progress, ProgressData};

// LRU cache for memoised pipeline results
pub mod lru_cache;

// Stateful activity engine (singleton with the append-only collection)
pub mod engine;
pub use engine::{with_engine, EngineStats, ProgressEngine, ENGINE};

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("ActivityProgressRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// Read a record field, falling back to its default when the value is `null`
/// or of the wrong type.
///
/// Only malformed JSON fails here; a well-formed value that does not fit the
/// field (e.g. `"distance": "7000"`) leaves the rest of the record intact.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(T::deserialize(&value).unwrap_or_else(|err| {
        warn!("[Metrics] Ignoring field value {}: {}", value, err);
        T::default()
    }))
}

/// One recorded activity as it arrives from the upstream dataset.
///
/// Every field has a default, so records with missing, `null` or mistyped
/// fields are accepted rather than rejected. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    #[serde(default, deserialize_with = "lenient")]
    pub run_id: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    /// Category label ("Run", "Walk", "Ride", ...)
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub activity_type: String,
    /// Naive local start time, e.g. "2024-03-09 07:15:00"
    #[serde(default, deserialize_with = "lenient")]
    pub start_date_local: String,
    /// Distance in meters
    #[serde(default, deserialize_with = "lenient")]
    pub distance: f64,
    /// Moving time as "H:MM:SS" or "MM:SS"
    #[serde(default, deserialize_with = "lenient")]
    pub moving_time: String,
    /// Average speed in m/s
    #[serde(default, deserialize_with = "lenient")]
    pub average_speed: Option<f64>,
    /// Average heart rate in bpm
    #[serde(default, deserialize_with = "lenient")]
    pub average_heartrate: Option<f64>,
    /// Elevation gain in meters
    #[serde(default, deserialize_with = "lenient")]
    pub elevation_gain: Option<f64>,
    /// Consecutive-day streak length, precomputed upstream
    #[serde(default, deserialize_with = "lenient")]
    pub streak: u32,
}

impl RawActivity {
    /// Create a record with the fields every activity carries.
    pub fn new(
        activity_type: &str,
        start_date_local: &str,
        distance: f64,
        moving_time: &str,
    ) -> Self {
        Self {
            activity_type: activity_type.to_string(),
            start_date_local: start_date_local.to_string(),
            distance,
            moving_time: moving_time.to_string(),
            ..Self::default()
        }
    }
}

/// Per-activity derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedActivity {
    /// Calendar day ("YYYY-MM-DD")
    pub date: String,
    /// Start time in epoch milliseconds
    pub timestamp: i64,
    pub distance_km: f64,
    /// Pace in min/km (0 when distance or time is zero)
    pub pace: f64,
    pub moving_time_seconds: f64,
    pub heart_rate: Option<f64>,
    pub elevation_gain: f64,
    pub category: String,
    pub name: String,
    pub streak: u32,
}

/// One point of the progress charts, carrying cross-activity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub timestamp: i64,
    pub pace: f64,
    /// Trailing moving average of valid paces (None when the window has none)
    pub moving_average_pace: Option<f64>,
    /// Running total, non-decreasing along the sequence
    pub cumulative_distance_km: f64,
    pub heart_rate: Option<f64>,
    pub elevation_gain: f64,
    pub distance_km: f64,
    /// Milestone first reached by this activity
    pub milestone: Option<f64>,
    /// Fastest valid pace of the filtered set
    pub is_personal_record: bool,
}

/// Scalar summary of a filtered activity set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SummaryStatistics {
    pub count: u32,
    pub total_distance_km: f64,
    /// Mean of valid paces (0 if none)
    pub average_pace: f64,
    /// Minimum valid pace (0 if none)
    pub best_pace: f64,
    /// Longest consecutive-day streak seen in the set
    pub max_streak: u32,
}

/// A single bar/point of a compact widget. Labels are ordinal ("1", "2", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct BucketPoint {
    pub value: f64,
    pub label: String,
}

/// Configuration for the progress pipeline and widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Trailing window (in activities) for the moving-average pace.
    /// Default: 7
    pub moving_average_window: usize,

    /// Cumulative distance milestones in km, strictly ascending.
    /// Default: [100, 250, 500, 750, 1000, 1500, 2000]
    pub milestones_km: Vec<f64>,

    /// Reference milestones above `headroom × max cumulative distance` are
    /// not suggested to the chart. Default: 1.1
    pub milestone_reference_headroom: f64,

    /// Annotate milestones and the personal record on chart points.
    /// Default: true
    pub annotate_extremes: bool,

    /// Paces at or below this (min/km) are excluded from average/best.
    /// Default: 0.0
    pub valid_pace_min: f64,

    /// Paces at or above this (min/km) are excluded from average/best.
    /// Default: 15.0
    pub valid_pace_max: f64,

    /// Number of weekly distance buckets. Default: 8
    pub weekly_bucket_count: usize,

    /// Number of recent activities in the pace widget. Default: 10
    pub recent_pace_count: usize,

    /// Yearly distance goal in km. Default: 1000
    pub yearly_goal_km: f64,

    /// Memoised pipeline results kept by the engine. Default: 32
    pub cache_capacity: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            moving_average_window: 7,
            milestones_km: DEFAULT_MILESTONES_KM.to_vec(),
            milestone_reference_headroom: 1.1,
            annotate_extremes: true,
            valid_pace_min: 0.0,
            valid_pace_max: 15.0,
            weekly_bucket_count: 8,
            recent_pace_count: 10,
            yearly_goal_km: 1000.0,
            cache_capacity: 32,
        }
    }
}

impl ProgressConfig {
    /// Check the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.moving_average_window == 0 {
            return Err(ProgressError::config(
                "moving_average_window must be at least 1",
            ));
        }
        if self
            .milestones_km
            .iter()
            .any(|m| !m.is_finite() || *m <= 0.0)
        {
            return Err(ProgressError::config(
                "milestones_km must be finite and positive",
            ));
        }
        if self.milestones_km.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ProgressError::config(
                "milestones_km must be strictly ascending",
            ));
        }
        if self.valid_pace_min.is_nan()
            || self.valid_pace_max.is_nan()
            || self.valid_pace_min < 0.0
            || self.valid_pace_max <= self.valid_pace_min
        {
            return Err(ProgressError::config(format!(
                "valid pace band ({}, {}) is empty",
                self.valid_pace_min, self.valid_pace_max
            )));
        }
        let headroom = self.milestone_reference_headroom;
        if headroom.is_nan() || headroom < 1.0 {
            return Err(ProgressError::config(
                "milestone_reference_headroom must be at least 1.0",
            ));
        }
        if self.cache_capacity == 0 {
            return Err(ProgressError::config("cache_capacity must be at least 1"));
        }
        Ok(())
    }

    /// Whether a pace counts towards average/best statistics.
    pub fn is_valid_pace(&self, pace: f64) -> bool {
        pace > self.valid_pace_min && pace < self.valid_pace_max
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ProgressConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_unsorted_milestones() {
        let config = ProgressConfig {
            milestones_km: vec![100.0, 500.0, 250.0],
            ..ProgressConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ProgressError::Config { .. })
        ));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let zero_window = ProgressConfig {
            moving_average_window: 0,
            ..ProgressConfig::default()
        };
        assert!(zero_window.validate().is_err());

        let inverted_band = ProgressConfig {
            valid_pace_min: 10.0,
            valid_pace_max: 5.0,
            ..ProgressConfig::default()
        };
        assert!(inverted_band.validate().is_err());

        let duplicate = ProgressConfig {
            milestones_km: vec![100.0, 100.0],
            ..ProgressConfig::default()
        };
        assert!(duplicate.validate().is_err());
    }

    #[test]
    fn test_config_rejects_nan() {
        let nan_band = ProgressConfig {
            valid_pace_max: f64::NAN,
            ..ProgressConfig::default()
        };
        assert!(nan_band.validate().is_err());

        let nan_floor = ProgressConfig {
            valid_pace_min: f64::NAN,
            ..ProgressConfig::default()
        };
        assert!(nan_floor.validate().is_err());

        let nan_headroom = ProgressConfig {
            milestone_reference_headroom: f64::NAN,
            ..ProgressConfig::default()
        };
        assert!(nan_headroom.validate().is_err());
    }

    #[test]
    fn test_valid_pace_band_is_exclusive() {
        let config = ProgressConfig::default();
        assert!(!config.is_valid_pace(0.0));
        assert!(config.is_valid_pace(5.0));
        assert!(config.is_valid_pace(14.99));
        assert!(!config.is_valid_pace(15.0));
    }

    #[test]
    fn test_raw_activity_defaults_from_json() {
        let json = r#"{"type": "Run", "distance": null, "name": "Lunch Run", "extra": 1}"#;
        let raw: RawActivity = serde_json::from_str(json).unwrap();
        assert_eq!(raw.activity_type, "Run");
        assert_eq!(raw.distance, 0.0);
        assert_eq!(raw.moving_time, "");
        assert_eq!(raw.average_heartrate, None);
        assert_eq!(raw.streak, 0);
    }

    #[test]
    fn test_raw_activity_mistyped_fields() {
        let json = r#"{"type": "Run", "distance": "7000", "moving_time": 900,
                       "average_speed": "fast", "elevation_gain": 12.5, "run_id": "x"}"#;
        let raw: RawActivity = serde_json::from_str(json).unwrap();
        assert_eq!(raw.activity_type, "Run");
        assert_eq!(raw.distance, 0.0);
        assert_eq!(raw.moving_time, "");
        assert_eq!(raw.average_speed, None);
        assert_eq!(raw.elevation_gain, Some(12.5));
        assert_eq!(raw.run_id, 0);

        // Broken JSON is still an error
        assert!(serde_json::from_str::<RawActivity>(r#"{"distance": }"#).is_err());
    }

    #[test]
    fn test_config_partial_json() {
        let config: ProgressConfig =
            serde_json::from_str(r#"{"moving_average_window": 5}"#).unwrap();
        assert_eq!(config.moving_average_window, 5);
        assert_eq!(config.weekly_bucket_count, 8);
    }
}
