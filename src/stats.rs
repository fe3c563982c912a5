//! Aggregate statistics over activity sets.
//!
//! [`summarize`] reduces the filtered, derived set of the progress pipeline.
//! [`year_stats`] rolls up raw records per calendar year (or all time) for the
//! year cards, using distance-weighted pace from recorded average speed.
//!
//! ## Example
//! ```rust
//! use activity_progress::{process_activities, summarize, ProgressConfig, RawActivity};
//!
//! let raws = vec![
//!     RawActivity::new("Run", "2024-06-01 07:00:00", 5000.0, "0:25:00"),
//!     RawActivity::new("Run", "2024-06-02 07:00:00", 5000.0, "0:35:00"),
//! ];
//! let stats = summarize(&process_activities(&raws), &ProgressConfig::default());
//! assert_eq!(stats.count, 2);
//! assert_eq!(stats.average_pace, 6.0);
//! assert_eq!(stats.best_pace, 5.0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::filter::{activity_year, available_years};
use crate::units::{meters_to_km, speed_to_pace};
use crate::{ProcessedActivity, ProgressConfig, RawActivity, SummaryStatistics};

/// Reduce a derived activity set to summary statistics.
///
/// Paces outside the configured valid band stay in the set but are excluded
/// from the average and best pace. An empty set yields all zeros.
pub fn summarize(activities: &[ProcessedActivity], config: &ProgressConfig) -> SummaryStatistics {
    let valid_paces: Vec<f64> = activities
        .iter()
        .map(|a| a.pace)
        .filter(|p| config.is_valid_pace(*p))
        .collect();

    let (average_pace, best_pace) = if valid_paces.is_empty() {
        (0.0, 0.0)
    } else {
        let sum: f64 = valid_paces.iter().sum();
        let best = valid_paces.iter().copied().fold(f64::INFINITY, f64::min);
        (sum / valid_paces.len() as f64, best)
    };

    SummaryStatistics {
        count: activities.len() as u32,
        total_distance_km: activities.iter().map(|a| a.distance_km).sum(),
        average_pace,
        best_pace,
        max_streak: activities.iter().map(|a| a.streak).max().unwrap_or(0),
    }
}

/// Which activities a year card covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YearSelection {
    Total,
    Year(i32),
}

impl fmt::Display for YearSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearSelection::Total => f.write_str("Total"),
            YearSelection::Year(year) => write!(f, "{}", year),
        }
    }
}

/// Roll-up shown on a year card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
    pub selection: YearSelection,
    pub run_count: u32,
    /// Total distance, rounded to one decimal
    pub total_distance_km: f64,
    /// Total elevation gain, rounded to whole meters
    pub total_elevation_gain_m: f64,
    /// Distance-weighted pace over records with a recorded speed (0 if none)
    pub average_pace: f64,
    /// Mean over records with a heart rate
    pub average_heart_rate: Option<f64>,
    pub max_streak: u32,
}

fn positive(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Roll up the records of one year, or of all time.
pub fn year_stats(activities: &[RawActivity], selection: YearSelection) -> YearStats {
    let selected: Vec<&RawActivity> = match selection {
        YearSelection::Total => activities.iter().collect(),
        YearSelection::Year(year) => activities
            .iter()
            .filter(|a| activity_year(a) == Some(year))
            .collect(),
    };

    let mut distance_m = 0.0;
    let mut elevation_m = 0.0;
    let mut timed_distance_m = 0.0;
    let mut timed_seconds = 0.0;
    let mut heart_rate_sum = 0.0;
    let mut heart_rate_count = 0u32;
    let mut max_streak = 0u32;

    for activity in &selected {
        let distance = positive(activity.distance);
        distance_m += distance;
        elevation_m += activity.elevation_gain.map(positive).unwrap_or(0.0);

        if let Some(speed) = activity.average_speed.filter(|s| *s > 0.0 && s.is_finite()) {
            timed_distance_m += distance;
            timed_seconds += distance / speed;
        }
        if let Some(hr) = activity
            .average_heartrate
            .filter(|hr| *hr > 0.0 && hr.is_finite())
        {
            heart_rate_sum += hr;
            heart_rate_count += 1;
        }
        max_streak = max_streak.max(activity.streak);
    }

    let average_pace = if timed_seconds > 0.0 {
        speed_to_pace(timed_distance_m / timed_seconds)
    } else {
        0.0
    };

    YearStats {
        selection,
        run_count: selected.len() as u32,
        total_distance_km: (meters_to_km(distance_m) * 10.0).round() / 10.0,
        total_elevation_gain_m: elevation_m.round(),
        average_pace,
        average_heart_rate: if heart_rate_count > 0 {
            Some(heart_rate_sum / heart_rate_count as f64)
        } else {
            None
        },
        max_streak,
    }
}

/// One roll-up per year present (newest first), followed by the all-time total.
pub fn year_stats_all(activities: &[RawActivity]) -> Vec<YearStats> {
    let mut all: Vec<YearStats> = available_years(activities)
        .into_iter()
        .map(|year| year_stats(activities, YearSelection::Year(year)))
        .collect();
    all.push(year_stats(activities, YearSelection::Total));
    all
}

/// Per-year roll-ups computed in parallel.
/// More efficient for long histories (> 1,000 records).
#[cfg(feature = "parallel")]
pub fn year_stats_all_parallel(activities: &[RawActivity]) -> Vec<YearStats> {
    if activities.len() < 1_000 {
        // Fall back to sequential for small histories
        return year_stats_all(activities);
    }

    let years = available_years(activities);
    let mut all: Vec<YearStats> = years
        .par_iter()
        .map(|&year| year_stats(activities, YearSelection::Year(year)))
        .collect();
    all.push(year_stats(activities, YearSelection::Total));
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::process_activities;

    fn make_processed(pace: f64, distance_km: f64, streak: u32) -> ProcessedActivity {
        ProcessedActivity {
            date: "2024-01-01".to_string(),
            timestamp: 0,
            distance_km,
            pace,
            moving_time_seconds: pace * distance_km * 60.0,
            heart_rate: None,
            elevation_gain: 0.0,
            category: "Run".to_string(),
            name: String::new(),
            streak,
        }
    }

    fn make_raw(start: &str, distance: f64, speed: Option<f64>, hr: Option<f64>) -> RawActivity {
        let mut raw = RawActivity::new("Run", start, distance, "0:30:00");
        raw.average_speed = speed;
        raw.average_heartrate = hr;
        raw
    }

    #[test]
    fn test_empty_set() {
        let stats = summarize(&[], &ProgressConfig::default());
        assert_eq!(stats, SummaryStatistics::default());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total_distance_km, 0.0);
        assert_eq!(stats.average_pace, 0.0);
        assert_eq!(stats.best_pace, 0.0);
    }

    #[test]
    fn test_out_of_band_paces_excluded() {
        let activities = vec![
            make_processed(5.0, 10.0, 1),
            make_processed(7.0, 5.0, 4),
            make_processed(0.0, 2.0, 0),  // no pace
            make_processed(20.0, 1.0, 2), // walk-speed anomaly
        ];
        let stats = summarize(&activities, &ProgressConfig::default());
        assert_eq!(stats.count, 4);
        assert_eq!(stats.total_distance_km, 18.0);
        assert_eq!(stats.average_pace, 6.0);
        assert_eq!(stats.best_pace, 5.0);
        assert_eq!(stats.max_streak, 4);
    }

    #[test]
    fn test_all_paces_invalid() {
        let activities = vec![make_processed(0.0, 3.0, 0), make_processed(15.0, 1.0, 0)];
        let stats = summarize(&activities, &ProgressConfig::default());
        assert_eq!(stats.count, 2);
        assert_eq!(stats.average_pace, 0.0);
        assert_eq!(stats.best_pace, 0.0);
    }

    #[test]
    fn test_summarize_from_raw() {
        let raws = vec![
            RawActivity::new("Run", "2024-06-01 07:00:00", 5000.0, "0:25:00"),
            RawActivity::new("Run", "2024-06-02 07:00:00", 0.0, "0:25:00"),
        ];
        let stats = summarize(&process_activities(&raws), &ProgressConfig::default());
        assert_eq!(stats.count, 2);
        assert_eq!(stats.best_pace, 5.0);
        assert_eq!(stats.average_pace, 5.0);
    }

    #[test]
    fn test_year_stats() {
        let mut streaky = make_raw("2023-05-01 07:00:00", 10000.0, Some(2.5), Some(140.0));
        streaky.streak = 6;
        streaky.elevation_gain = Some(120.4);
        let activities = vec![
            make_raw("2023-04-01 07:00:00", 10000.0, Some(5.0), None),
            streaky,
            make_raw("2024-01-01 07:00:00", 5000.0, None, Some(160.0)),
        ];

        let y2023 = year_stats(&activities, YearSelection::Year(2023));
        assert_eq!(y2023.run_count, 2);
        assert_eq!(y2023.total_distance_km, 20.0);
        assert_eq!(y2023.total_elevation_gain_m, 120.0);
        // 20km in 2000s + 4000s = 6000s -> 3.333 m/s -> 5 min/km
        assert!((y2023.average_pace - 5.0).abs() < 1e-9);
        assert_eq!(y2023.average_heart_rate, Some(140.0));
        assert_eq!(y2023.max_streak, 6);

        let y2024 = year_stats(&activities, YearSelection::Year(2024));
        assert_eq!(y2024.average_pace, 0.0);
        assert_eq!(y2024.average_heart_rate, Some(160.0));

        let total = year_stats(&activities, YearSelection::Total);
        assert_eq!(total.run_count, 3);
        assert_eq!(total.total_distance_km, 25.0);
        assert_eq!(total.average_heart_rate, Some(150.0));
    }

    #[test]
    fn test_year_stats_all_order() {
        let activities = vec![
            make_raw("2022-04-01 07:00:00", 1000.0, None, None),
            make_raw("2024-04-01 07:00:00", 1000.0, None, None),
        ];
        let all = year_stats_all(&activities);
        let labels: Vec<String> = all.iter().map(|s| s.selection.to_string()).collect();
        assert_eq!(labels, vec!["2024", "2022", "Total"]);
    }

    #[test]
    fn test_year_stats_empty() {
        let stats = year_stats(&[], YearSelection::Total);
        assert_eq!(stats.run_count, 0);
        assert_eq!(stats.average_pace, 0.0);
        assert_eq!(stats.average_heart_rate, None);
    }
}
