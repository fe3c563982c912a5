//! The progress pipeline: filter, derive, sort, aggregate.
//!
//! ```text
//! raw records --filter--> selected --derive+sort--> activities
//!                                                      |-- summarize ---> stats
//!                                                      `-- chart points -> chart_data, hints
//! ```
//!
//! A pure function of `(activities, params, now, config)`.

use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::chart::{build_chart_points, chart_hints, ChartHints};
use crate::filter::{filter_activities, FilterParams};
use crate::metrics::process_activities;
use crate::stats::summarize;
use crate::{ChartPoint, ProcessedActivity, ProgressConfig, RawActivity, SummaryStatistics};

/// Everything the progress views need for one set of filter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    /// Filtered activities, chronological
    pub activities: Vec<ProcessedActivity>,
    pub stats: SummaryStatistics,
    /// One point per activity, same order
    pub chart_data: Vec<ChartPoint>,
    pub hints: ChartHints,
}

/// Run the full pipeline over a raw collection.
pub fn compute_progress(
    activities: &[RawActivity],
    params: &FilterParams,
    now: NaiveDateTime,
    config: &ProgressConfig,
) -> ProgressData {
    let selected = filter_activities(activities, params, now);
    let processed = process_activities(selected);

    let stats = summarize(&processed, config);
    let chart_data = build_chart_points(&processed, config);
    let hints = chart_hints(&chart_data, config);

    debug!(
        "[Pipeline] {} {} {:?}: {} of {} activities, {:.1} km",
        params.activity_type,
        params.time_range.as_str(),
        params.year,
        processed.len(),
        activities.len(),
        stats.total_distance_km
    );

    ProgressData {
        activities: processed,
        stats,
        chart_data,
        hints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ActivityType, TimeRange};
    use crate::units::parse_start_date;

    fn now() -> NaiveDateTime {
        parse_start_date("2024-06-15 12:00:00").unwrap()
    }

    fn make_activity(kind: &str, start: &str, distance: f64, moving_time: &str) -> RawActivity {
        RawActivity::new(kind, start, distance, moving_time)
    }

    #[test]
    fn test_pipeline_empty() {
        let data = compute_progress(&[], &FilterParams::default(), now(), &ProgressConfig::default());
        assert!(data.activities.is_empty());
        assert!(data.chart_data.is_empty());
        assert_eq!(data.stats, SummaryStatistics::default());
    }

    #[test]
    fn test_pipeline_filters_and_sorts() {
        let activities = vec![
            make_activity("Run", "2024-06-10 07:00:00", 10000.0, "0:50:00"),
            make_activity("Ride", "2024-06-09 07:00:00", 40000.0, "1:30:00"),
            make_activity("Run", "2024-06-01 07:00:00", 5000.0, "0:30:00"),
            make_activity("Run", "2023-01-01 07:00:00", 5000.0, "0:20:00"),
        ];
        let params = FilterParams::new(ActivityType::Run, TimeRange::ThreeMonths);
        let data = compute_progress(&activities, &params, now(), &ProgressConfig::default());

        assert_eq!(data.stats.count, 2);
        assert_eq!(data.stats.total_distance_km, 15.0);
        assert_eq!(data.stats.best_pace, 5.0);
        assert_eq!(data.stats.average_pace, 5.5);

        let dates: Vec<&str> = data.activities.iter().map(|a| a.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-06-01", "2024-06-10"]);
        assert_eq!(data.chart_data.len(), data.activities.len());
        assert_eq!(data.chart_data[1].cumulative_distance_km, 15.0);
        assert!(data.chart_data[1].is_personal_record);
    }

    #[test]
    fn test_pipeline_year_selection() {
        let activities = vec![
            make_activity("Run", "2024-02-10 07:00:00", 10000.0, "0:50:00"),
            make_activity("Run", "2023-06-01 07:00:00", 5000.0, "0:30:00"),
        ];
        let params = FilterParams::new(ActivityType::Run, TimeRange::AllTime).with_year(2023);
        let data = compute_progress(&activities, &params, now(), &ProgressConfig::default());
        assert_eq!(data.stats.count, 1);
        assert_eq!(data.activities[0].date, "2023-06-01");
    }
}
