//! FFI bindings for mobile platforms (iOS/Android).
//!
//! Stateless UniFFI exports: each call receives the activity collection as a
//! JSON array and returns its result as JSON. All FFI functions are prefixed
//! with `ffi_` to avoid naming conflicts with the internal API. The stateful
//! `engine_*` exports live in [`crate::engine::engine_ffi`].

use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::achievements::summarize_achievements;
use crate::error::{ProgressError, Result};
use crate::heat::{heat_color_for_speed, heat_distribution, pace_heat_color, PaceHeatScale};
use crate::units::{format_pace, parse_duration, parse_start_date};
use crate::{
    compute_progress, init_logging, parse_activities_json, recent_paces, weekly_distance_buckets,
    year_stats_all, ActivityType, FilterParams, ProgressConfig, RawActivity, TimeRange,
};

// ============================================================================
// Input Helpers
// ============================================================================

fn parse_now(now: &str) -> Result<NaiveDateTime> {
    parse_start_date(now).ok_or_else(|| ProgressError::InvalidInput {
        message: format!("unreadable reference time '{}'", now),
    })
}

fn parse_params(activity_type: &str, time_range: &str, year: Option<i32>) -> Result<FilterParams> {
    Ok(FilterParams {
        activity_type: activity_type.parse::<ActivityType>()?,
        time_range: time_range.parse::<TimeRange>()?,
        year,
    })
}

fn parse_config(config_json: Option<String>) -> Result<ProgressConfig> {
    let config = match config_json {
        Some(json) if !json.is_empty() => serde_json::from_str::<ProgressConfig>(&json)?,
        _ => ProgressConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn parse_activities(activities_json: &str) -> Result<Vec<RawActivity>> {
    let activities = parse_activities_json(activities_json)?;
    debug!("[ActivityProgressRust] {} activities received", activities.len());
    Ok(activities)
}

fn to_json<T: serde::Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}

/// Log a rejected call and return the fallback document.
fn rejected(call: &str, err: ProgressError, fallback: &str) -> String {
    warn!("[ActivityProgressRust] {} rejected: {}", call, err);
    fallback.to_string()
}

// ============================================================================
// Progress Pipeline
// ============================================================================

/// Run the progress pipeline.
///
/// # Arguments
/// * `activities_json` - JSON array of activity records
/// * `activity_type` - "Run", "Walk", "Ride" or "All"
/// * `time_range` - "3m", "6m", "1y" or "all"
/// * `year` - Optional calendar year restriction
/// * `now` - Reference time ("YYYY-MM-DD HH:MM:SS")
/// * `config_json` - Optional partial configuration; missing fields take defaults
///
/// # Returns
/// JSON `{activities, stats, chart_data, hints}`, or "{}" on invalid input
#[uniffi::export]
pub fn ffi_progress_json(
    activities_json: String,
    activity_type: String,
    time_range: String,
    year: Option<i32>,
    now: String,
    config_json: Option<String>,
) -> String {
    init_logging();

    let inputs = parse_activities(&activities_json).and_then(|activities| {
        Ok((
            activities,
            parse_params(&activity_type, &time_range, year)?,
            parse_now(&now)?,
            parse_config(config_json)?,
        ))
    });

    match inputs {
        Ok((activities, params, now, config)) => {
            let data = compute_progress(&activities, &params, now, &config);
            to_json(&data, "{}")
        }
        Err(err) => rejected("progress", err, "{}"),
    }
}

/// Milestones and the personal record of a filtered set, most important first.
#[uniffi::export]
pub fn ffi_achievements_json(
    activities_json: String,
    activity_type: String,
    time_range: String,
    now: String,
) -> String {
    init_logging();

    let inputs = parse_activities(&activities_json).and_then(|activities| {
        Ok((
            activities,
            parse_params(&activity_type, &time_range, None)?,
            parse_now(&now)?,
        ))
    });

    match inputs {
        Ok((activities, params, now)) => {
            let data = compute_progress(&activities, &params, now, &ProgressConfig::default());
            to_json(&summarize_achievements(&data.chart_data), "[]")
        }
        Err(err) => rejected("achievements", err, "[]"),
    }
}

// ============================================================================
// Widget Summaries
// ============================================================================

/// Distance per week over the trailing `weeks` weeks, oldest first.
#[uniffi::export]
pub fn ffi_weekly_buckets_json(activities_json: String, weeks: u32, now: String) -> String {
    init_logging();

    match parse_activities(&activities_json).and_then(|a| Ok((a, parse_now(&now)?))) {
        Ok((activities, now)) => {
            to_json(&weekly_distance_buckets(&activities, weeks as usize, now), "[]")
        }
        Err(err) => rejected("weekly_buckets", err, "[]"),
    }
}

/// Raw speed of the `count` most recent activities, oldest first.
#[uniffi::export]
pub fn ffi_recent_paces_json(activities_json: String, count: u32) -> String {
    init_logging();

    match parse_activities(&activities_json) {
        Ok(activities) => to_json(&recent_paces(&activities, count as usize), "[]"),
        Err(err) => rejected("recent_paces", err, "[]"),
    }
}

/// Per-year roll-ups (newest first) followed by the all-time total.
#[uniffi::export]
pub fn ffi_year_stats_json(activities_json: String) -> String {
    init_logging();

    match parse_activities(&activities_json) {
        Ok(activities) => to_json(&year_stats_all(&activities), "[]"),
        Err(err) => rejected("year_stats", err, "[]"),
    }
}

// ============================================================================
// Formatting Helpers
// ============================================================================

/// Parse "H:MM:SS" / "MM:SS" duration text to seconds (0 if unreadable).
#[uniffi::export]
pub fn ffi_parse_duration(text: String) -> f64 {
    parse_duration(&text)
}

/// Format a pace as M'SS" ("--" if there is none).
#[uniffi::export]
pub fn ffi_format_pace(pace: f64) -> String {
    format_pace(pace)
}

/// Heat-scale color for a pace in min/km.
#[uniffi::export]
pub fn ffi_pace_heat_color(pace: f64) -> String {
    pace_heat_color(pace).to_string()
}

/// Heat-scale color for an average speed in m/s.
#[uniffi::export]
pub fn ffi_speed_heat_color(meters_per_second: f64) -> String {
    heat_color_for_speed(meters_per_second).to_string()
}

/// Distribution of paces over the heat scale, for a legend.
#[uniffi::export]
pub fn ffi_pace_heat_distribution_json(paces: Vec<f64>) -> String {
    to_json(&heat_distribution(&paces, &PaceHeatScale::default()), "{}")
}
