//! Fixed-size summaries for compact dashboard widgets.
//!
//! - Weekly distance: N contiguous 7-day buckets ending at "now", oldest first
//! - Recent pace: the raw speed of the M most recent activities, oldest first
//! - Yearly goal progress and bar height normalisation
//!
//! Both bucket builders work on the full, unfiltered collection.
//!
//! ## Example
//! ```rust
//! use activity_progress::buckets::weekly_distance_buckets;
//! use activity_progress::units::parse_start_date;
//! use activity_progress::RawActivity;
//!
//! let now = parse_start_date("2024-06-15 12:00:00").unwrap();
//! let runs = vec![RawActivity::new("Run", "2024-06-14 07:00:00", 8000.0, "0:40:00")];
//! let weeks = weekly_distance_buckets(&runs, 8, now);
//! assert_eq!(weeks.len(), 8);
//! assert_eq!(weeks[7].value, 8.0);
//! assert_eq!(weeks[7].label, "8");
//! ```

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::filter::{activity_year, start_time};
use crate::units::{epoch_millis, meters_to_km};
use crate::{BucketPoint, RawActivity};

const MILLIS_PER_WEEK: i64 = 7 * 24 * 60 * 60 * 1000;

fn distance_of(activity: &RawActivity) -> f64 {
    if activity.distance.is_finite() && activity.distance > 0.0 {
        activity.distance
    } else {
        0.0
    }
}

/// Distance (km) per 7-day bucket over the trailing `weeks` weeks.
///
/// Bucket `k` (oldest = 1) covers `[now - (weeks-k+1)·7d, now - (weeks-k)·7d)`.
/// Always returns exactly `weeks` points, labeled "1".."weeks".
pub fn weekly_distance_buckets(
    activities: &[RawActivity],
    weeks: usize,
    now: NaiveDateTime,
) -> Vec<BucketPoint> {
    let now_ms = epoch_millis(&now);
    // Index 0 is the most recent week
    let mut totals = vec![0.0f64; weeks];

    for activity in activities {
        let age_ms = now_ms.saturating_sub(epoch_millis(&start_time(activity)));
        if age_ms <= 0 {
            continue;
        }
        let weeks_back = ((age_ms - 1) / MILLIS_PER_WEEK) as usize;
        if let Some(total) = totals.get_mut(weeks_back) {
            *total += distance_of(activity);
        }
    }

    totals
        .iter()
        .rev()
        .enumerate()
        .map(|(i, meters)| BucketPoint {
            value: meters_to_km(*meters),
            label: (i + 1).to_string(),
        })
        .collect()
}

/// Raw average speed (m/s) of the `count` most recent activities that have one.
///
/// Selection is newest first; the output is reversed to read oldest to newest
/// and labeled "1".."n".
pub fn recent_paces(activities: &[RawActivity], count: usize) -> Vec<BucketPoint> {
    let mut with_speed: Vec<(i64, f64)> = activities
        .iter()
        .filter_map(|a| {
            a.average_speed
                .filter(|s| s.is_finite() && *s > 0.0)
                .map(|speed| (epoch_millis(&start_time(a)), speed))
        })
        .collect();

    with_speed.sort_by(|a, b| b.0.cmp(&a.0));
    with_speed.truncate(count);
    with_speed.reverse();

    with_speed
        .into_iter()
        .enumerate()
        .map(|(i, (_, speed))| BucketPoint {
            value: speed,
            label: (i + 1).to_string(),
        })
        .collect()
}

/// Bar heights as a percentage of the largest value (floored at 1).
pub fn normalize_bars(points: &[BucketPoint]) -> Vec<f64> {
    let max = points.iter().map(|p| p.value).fold(1.0, f64::max);
    points.iter().map(|p| p.value / max * 100.0).collect()
}

/// Progress towards a distance goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub current_km: f64,
    pub target_km: f64,
    /// Clamped to [0, 100]
    pub percentage: f64,
}

pub fn goal_progress(current_km: f64, target_km: f64) -> GoalProgress {
    let percentage = if target_km > 0.0 && current_km.is_finite() {
        (current_km / target_km * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    GoalProgress {
        current_km,
        target_km,
        percentage,
    }
}

/// Distance covered so far in the calendar year of `now`.
pub fn current_year_distance_km(activities: &[RawActivity], now: NaiveDateTime) -> f64 {
    let year = now.year();
    let meters: f64 = activities
        .iter()
        .filter(|a| activity_year(a) == Some(year))
        .map(distance_of)
        .sum();
    meters_to_km(meters)
}
