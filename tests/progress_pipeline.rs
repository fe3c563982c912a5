//! End-to-end tests driving the public API from a JSON activity document.

use activity_progress::units::{format_pace, parse_start_date};
use activity_progress::{
    compute_progress, parse_activities_json, pace_heat_color, recent_paces,
    weekly_distance_buckets, with_engine, year_stats_all, ActivityType, FilterParams,
    ProgressConfig, ProgressEngine, TimeRange,
};
use chrono::NaiveDateTime;

const ACTIVITIES: &str = r#"[
    {"run_id": 1, "name": "Long build", "type": "Run", "start_date_local": "2024-03-20 07:00:00",
     "distance": 100000, "moving_time": "10:00:00", "average_heartrate": 140, "streak": 1},
    {"run_id": 2, "name": "Tempo", "type": "Run", "start_date_local": "2024-04-10 07:00:00",
     "distance": 50000, "moving_time": "4:10:00", "average_speed": 3.2, "average_heartrate": null},
    {"run_id": 3, "name": "Ultra", "type": "Run", "start_date_local": "2024-05-01 07:00:00",
     "distance": 120000, "moving_time": "12:00:00", "elevation_gain": 310.0},
    {"run_id": 4, "name": "Stroll", "type": "Walk", "start_date_local": "2024-05-02 18:00:00",
     "distance": 3000, "moving_time": "0:50:00"},
    {"run_id": 5, "name": "Fast finish", "type": "Run", "start_date_local": "2024-06-14 07:00:00",
     "distance": 10000, "moving_time": "0:45:00", "average_speed": 3.7, "streak": 3},
    {"run_id": 6, "name": "New year", "type": "Run", "start_date_local": "2023-01-01 09:00:00",
     "distance": 8000, "moving_time": "0:48:00"},
    {"run_id": 7, "name": "Lost date", "type": "Run", "start_date_local": "someday",
     "distance": 5000, "moving_time": "0:30:00"}
]"#;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn now() -> NaiveDateTime {
    parse_start_date("2024-06-15 12:00:00").unwrap()
}

#[test]
fn test_three_month_run_progress() {
    init_logger();
    let activities = parse_activities_json(ACTIVITIES).unwrap();
    let params = FilterParams::new(ActivityType::Run, TimeRange::ThreeMonths);
    let data = compute_progress(&activities, &params, now(), &ProgressConfig::default());

    let names: Vec<&str> = data.activities.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Long build", "Tempo", "Ultra", "Fast finish"]);

    assert_eq!(data.stats.count, 4);
    assert_eq!(data.stats.total_distance_km, 280.0);
    assert_eq!(data.stats.average_pace, 5.375);
    assert_eq!(data.stats.best_pace, 4.5);
    assert_eq!(data.stats.max_streak, 3);

    let cumulative: Vec<f64> = data
        .chart_data
        .iter()
        .map(|p| p.cumulative_distance_km)
        .collect();
    assert_eq!(cumulative, vec![100.0, 150.0, 270.0, 280.0]);

    let milestones: Vec<Option<f64>> = data.chart_data.iter().map(|p| p.milestone).collect();
    assert_eq!(milestones, vec![Some(100.0), None, Some(250.0), None]);

    let records: Vec<bool> = data
        .chart_data
        .iter()
        .map(|p| p.is_personal_record)
        .collect();
    assert_eq!(records, vec![false, false, false, true]);

    assert_eq!(data.hints.reference_milestones, vec![100.0, 250.0]);
    assert_eq!(data.activities[0].heart_rate, Some(140.0));
    assert_eq!(data.activities[1].heart_rate, None);

    let fastest = &data.activities[3];
    assert_eq!(format_pace(fastest.pace), "4'30\"");
    assert_eq!(pace_heat_color(fastest.pace), "var(--trend-positive)");
}

#[test]
fn test_repeated_runs_serialize_identically() {
    init_logger();
    let json = r#"[
        {"name": "Tied first", "type": "Run", "start_date_local": "2024-06-01 07:00:00",
         "distance": 5000, "moving_time": "0:25:00"},
        {"name": "Tied second", "type": "Run", "start_date_local": "2024-06-01 07:00:00",
         "distance": 10000, "moving_time": "0:50:00"},
        {"name": "Tied slow", "type": "Run", "start_date_local": "2024-06-01 07:00:00",
         "distance": 5000, "moving_time": "0:30:00"},
        {"name": "Earlier", "type": "Run", "start_date_local": "2024-05-01 07:00:00",
         "distance": 4000, "moving_time": "0:22:00"}
    ]"#;
    let activities = parse_activities_json(json).unwrap();
    let params = FilterParams::new(ActivityType::Run, TimeRange::ThreeMonths);
    let config = ProgressConfig::default();

    let first = compute_progress(&activities, &params, now(), &config);
    let second = compute_progress(&activities, &params, now(), &config);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    // Ties keep input order, and the earliest of two equal paces is the record
    let names: Vec<&str> = first.activities.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Earlier", "Tied first", "Tied second", "Tied slow"]);
    let records: Vec<bool> = first
        .chart_data
        .iter()
        .map(|p| p.is_personal_record)
        .collect();
    assert_eq!(records, vec![false, true, false, false]);
}

#[test]
fn test_all_time_includes_undated_records() {
    init_logger();
    let activities = parse_activities_json(ACTIVITIES).unwrap();
    let params = FilterParams::new(ActivityType::Run, TimeRange::AllTime);
    let data = compute_progress(&activities, &params, now(), &ProgressConfig::default());

    assert_eq!(data.stats.count, 6);
    // The undated record sorts first at the epoch
    assert_eq!(data.activities[0].name, "Lost date");
    assert_eq!(data.activities[0].timestamp, 0);

    let walks = FilterParams::new(ActivityType::Walk, TimeRange::AllTime);
    let data = compute_progress(&activities, &walks, now(), &ProgressConfig::default());
    assert_eq!(data.stats.count, 1);
    assert_eq!(data.stats.best_pace, 0.0);
}

#[test]
fn test_widgets_use_full_collection() {
    init_logger();
    let activities = parse_activities_json(ACTIVITIES).unwrap();

    let weeks = weekly_distance_buckets(&activities, 8, now());
    assert_eq!(weeks.len(), 8);
    assert_eq!(weeks[7].value, 10.0);
    let total: f64 = weeks.iter().map(|w| w.value).sum();
    assert_eq!(total, 133.0);

    let paces = recent_paces(&activities, 10);
    let values: Vec<f64> = paces.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![3.2, 3.7]);
    assert_eq!(paces[1].label, "2");

    let years = year_stats_all(&activities);
    let labels: Vec<String> = years.iter().map(|y| y.selection.to_string()).collect();
    assert_eq!(labels, vec!["2024", "2023", "Total"]);
    assert_eq!(years[2].run_count, 7);
}

#[test]
fn test_engine_end_to_end() {
    init_logger();
    let mut engine = ProgressEngine::new();
    engine.set_reference_time(Some(now()));
    assert_eq!(engine.load_json(ACTIVITIES).unwrap(), 7);

    let params = FilterParams::new(ActivityType::Run, TimeRange::ThreeMonths);
    let first = engine.progress(&params);
    assert_eq!(first.stats.count, 4);
    assert_eq!(engine.progress(&params), first);
    assert_eq!(engine.stats().cache_hits, 1);

    let extra = r#"[{"type": "Run", "start_date_local": "2024-06-15 07:00:00",
                     "distance": 250000, "moving_time": "25:00:00"}]"#;
    engine.load_json(extra).unwrap();
    let updated = engine.progress(&params);
    assert_eq!(updated.stats.count, 5);
    assert_eq!(updated.chart_data[4].milestone, Some(500.0));
}

#[test]
fn test_global_engine() {
    init_logger();
    let count = with_engine(|e| {
        e.clear();
        e.set_reference_time(Some(now()));
        e.load_json(ACTIVITIES).unwrap();
        e.activity_count()
    });
    assert_eq!(count, 7);

    let goal = with_engine(|e| e.goal_progress());
    assert_eq!(goal.current_km, 283.0);
    assert_eq!(goal.target_km, 1000.0);
}
