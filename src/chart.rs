//! Chart point assembly and axis hints.
//!
//! Turns the ordered, derived activity sequence into [`ChartPoint`]s carrying
//! the cross-activity fields (moving-average pace, cumulative distance,
//! milestone and personal-record annotations), and suggests axis domains for
//! the rendering layer.

use serde::{Deserialize, Serialize};

use crate::achievements::{detect_milestones, find_personal_record, reference_milestones};
use crate::windows::{cumulative_sum, moving_averages};
use crate::{ChartPoint, ProcessedActivity, ProgressConfig};

/// Build one chart point per activity, in the order given.
///
/// The input must already be in chronological order. With
/// `config.annotate_extremes` off, no milestone or personal record is set.
pub fn build_chart_points(
    activities: &[ProcessedActivity],
    config: &ProgressConfig,
) -> Vec<ChartPoint> {
    let paces: Vec<f64> = activities.iter().map(|a| a.pace).collect();
    let distances: Vec<f64> = activities.iter().map(|a| a.distance_km).collect();

    let averages = moving_averages(&paces, config.moving_average_window);
    let cumulative = cumulative_sum(&distances);

    let mut milestones: Vec<Option<f64>> = vec![None; activities.len()];
    let mut personal_record = None;
    if config.annotate_extremes {
        for crossing in detect_milestones(&cumulative, &config.milestones_km) {
            milestones[crossing.index] = Some(crossing.threshold);
        }
        personal_record = find_personal_record(&paces);
    }

    activities
        .iter()
        .enumerate()
        .map(|(i, activity)| ChartPoint {
            date: activity.date.clone(),
            timestamp: activity.timestamp,
            pace: activity.pace,
            moving_average_pace: averages[i],
            cumulative_distance_km: cumulative[i],
            heart_rate: activity.heart_rate,
            elevation_gain: activity.elevation_gain,
            distance_km: activity.distance_km,
            milestone: milestones[i],
            is_personal_record: personal_record == Some(i),
        })
        .collect()
}

// ============================================================================
// Axis Hints
// ============================================================================

/// Suggested axis range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisDomain {
    pub min: f64,
    pub max: f64,
}

/// Display hints for the progress charts. A domain is `None` when its
/// series has no data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartHints {
    pub pace_domain: Option<AxisDomain>,
    pub distance_domain: Option<AxisDomain>,
    pub heart_rate_domain: Option<AxisDomain>,
    pub elevation_domain: Option<AxisDomain>,
    /// Milestones worth drawing as reference lines on the distance chart
    pub reference_milestones: Vec<f64>,
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Axis hints for a chart sequence.
pub fn chart_hints(points: &[ChartPoint], config: &ProgressConfig) -> ChartHints {
    let pace_domain = min_max(
        points
            .iter()
            .map(|p| p.pace)
            .filter(|p| config.is_valid_pace(*p)),
    )
    .map(|(lo, hi)| AxisDomain {
        min: (lo.floor() - 1.0).max(3.0),
        max: (hi.ceil() + 1.0).min(15.0),
    });

    let max_cumulative = points
        .iter()
        .map(|p| p.cumulative_distance_km)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));
    let distance_domain = max_cumulative.map(|hi| AxisDomain {
        min: 0.0,
        max: (hi / 100.0).ceil() * 100.0,
    });

    let heart_rate_domain = min_max(points.iter().filter_map(|p| p.heart_rate)).map(|(lo, hi)| {
        AxisDomain {
            min: ((lo / 10.0).floor() * 10.0 - 10.0).max(60.0),
            max: ((hi / 10.0).ceil() * 10.0 + 10.0).min(220.0),
        }
    });

    let elevation_domain = min_max(
        points
            .iter()
            .map(|p| p.elevation_gain)
            .filter(|e| *e > 0.0),
    )
    .map(|(_, hi)| AxisDomain {
        min: 0.0,
        max: (hi / 50.0).ceil() * 50.0,
    });

    ChartHints {
        pace_domain,
        distance_domain,
        heart_rate_domain,
        elevation_domain,
        reference_milestones: reference_milestones(
            &config.milestones_km,
            max_cumulative.unwrap_or(0.0),
            config.milestone_reference_headroom,
        ),
    }
}
