//! Milestone and personal record (PR) detection.
//!
//! Works on the chronologically ordered sequence produced by the pipeline:
//! cumulative distance for milestones, per-activity pace for the PR.
//!
//! ## Features
//! - Cumulative distance milestones (100km, 250km, ... 2000km)
//! - Fastest pace personal record (single, earliest on ties)
//! - Reference milestone lines for the distance chart
//! - Achievement summaries for display
//!
//! ## Example
//! ```rust
//! use activity_progress::achievements::{detect_milestones, find_personal_record};
//!
//! let crossings = detect_milestones(&[50.0, 120.0, 130.0, 260.0], &[100.0, 250.0]);
//! assert_eq!(crossings[0].index, 1);
//! assert_eq!(crossings[1].index, 3);
//!
//! assert_eq!(find_personal_record(&[5.2, 0.0, 4.9, 4.9]), Some(2));
//! ```

use serde::{Deserialize, Serialize};

use crate::units::format_pace;
use crate::ChartPoint;

/// Standard cumulative distance milestones (in km)
pub const DEFAULT_MILESTONES_KM: &[f64] = &[100.0, 250.0, 500.0, 750.0, 1000.0, 1500.0, 2000.0];

/// A milestone reached at a position of the ordered sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MilestoneCrossing {
    /// Index of the activity whose cumulative distance first reached it
    pub index: usize,
    /// Milestone value (km)
    pub threshold: f64,
}

/// Detect first crossings of ascending milestone thresholds.
///
/// At each index the smallest threshold above the last flagged one that is
/// newly reached there (the previous cumulative value was below it, or this is
/// the first index) is flagged. Each threshold fires at most once and never
/// after a larger one, so an index carries at most one milestone. When a
/// single activity jumps over several thresholds, only the smallest is flagged.
pub fn detect_milestones(cumulative: &[f64], thresholds: &[f64]) -> Vec<MilestoneCrossing> {
    let mut crossings = Vec::new();
    let mut last_flagged: Option<f64> = None;

    for (index, &value) in cumulative.iter().enumerate() {
        let previous = index.checked_sub(1).map(|i| cumulative[i]);

        let reached = thresholds.iter().copied().find(|&threshold| {
            last_flagged.map_or(true, |last| threshold > last)
                && value >= threshold
                && previous.map_or(true, |p| p < threshold)
        });

        if let Some(threshold) = reached {
            crossings.push(MilestoneCrossing { index, threshold });
            last_flagged = Some(threshold);
        }
    }

    crossings
}

/// Index of the fastest valid (positive) pace, earliest on ties.
pub fn find_personal_record(paces: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (index, &pace) in paces.iter().enumerate() {
        if pace.is_nan() || pace <= 0.0 {
            continue;
        }
        match best {
            Some((_, best_pace)) if pace >= best_pace => {}
            _ => best = Some((index, pace)),
        }
    }

    best.map(|(index, _)| index)
}

/// Milestones worth drawing as reference lines on the distance chart.
///
/// Thresholds above `headroom × max_cumulative` are omitted. This is a
/// display hint only and does not affect crossing detection.
pub fn reference_milestones(thresholds: &[f64], max_cumulative: f64, headroom: f64) -> Vec<f64> {
    let limit = max_cumulative * headroom;
    thresholds
        .iter()
        .copied()
        .filter(|&threshold| threshold <= limit)
        .collect()
}

// ============================================================================
// Achievement Summaries
// ============================================================================

/// Type of achievement detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementType {
    /// Cumulative distance milestone reached
    Milestone,
    /// Fastest pace of the filtered set
    PaceRecord,
}

/// An achievement detected on the chart sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub achievement_type: AchievementType,
    /// Human-readable title
    pub title: String,
    /// The value that triggered the achievement (e.g. "500km" or "4'45\"")
    pub value: String,
    /// Calendar day of the activity
    pub date: String,
    pub timestamp: i64,
    /// Importance score (higher = more significant)
    pub importance: u8,
}

/// Collect the annotated milestones and personal record of a chart sequence.
///
/// Sorted by importance, highest first; ties keep chronological order.
pub fn summarize_achievements(points: &[ChartPoint]) -> Vec<Achievement> {
    let mut achievements = Vec::new();

    for point in points {
        if let Some(milestone) = point.milestone {
            achievements.push(Achievement {
                achievement_type: AchievementType::Milestone,
                title: format!("{}km Total!", milestone as i64),
                value: format!("{}km", milestone as i64),
                date: point.date.clone(),
                timestamp: point.timestamp,
                importance: milestone_importance(milestone),
            });
        }
        if point.is_personal_record {
            achievements.push(Achievement {
                achievement_type: AchievementType::PaceRecord,
                title: "Fastest Pace!".to_string(),
                value: format_pace(point.pace),
                date: point.date.clone(),
                timestamp: point.timestamp,
                importance: 90,
            });
        }
    }

    achievements.sort_by(|a, b| b.importance.cmp(&a.importance));
    achievements
}

fn milestone_importance(km: f64) -> u8 {
    match km as i64 {
        k if k >= 2000 => 95,
        k if k >= 1000 => 85,
        k if k >= 500 => 75,
        k if k >= 250 => 60,
        _ => 50,
    }
}
