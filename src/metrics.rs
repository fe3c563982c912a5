//! Per-activity metric derivation and the JSON input boundary.
//!
//! Each activity is processed independently: duration text is parsed, pace is
//! computed, optional biometric fields are normalised, and the start time is
//! reduced to a calendar day and an epoch timestamp. Nothing here depends on
//! other activities, apart from the final chronological sort.

use log::{debug, warn};

use crate::error::Result;
use crate::units::{compute_pace, epoch_millis, meters_to_km, parse_duration, parse_start_date};
use crate::{ProcessedActivity, RawActivity};

/// Parse a JSON array of activity records.
///
/// Only a document that is not a JSON array is an error. Fields that are
/// missing, `null` or of the wrong type take their defaults, and array
/// elements that are not objects are skipped.
pub fn parse_activities_json(json: &str) -> Result<Vec<RawActivity>> {
    let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let total = records.len();

    let activities: Vec<RawActivity> = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| match serde_json::from_value(record) {
            Ok(activity) => Some(activity),
            Err(err) => {
                warn!("[Metrics] Skipping activity record {}: {}", i, err);
                None
            }
        })
        .collect();

    debug!(
        "[Metrics] Parsed {} of {} activity records",
        activities.len(),
        total
    );
    Ok(activities)
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Calendar-day part of a start time that failed to parse.
fn date_prefix(text: &str) -> String {
    text.trim()
        .split([' ', 'T'])
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Derive the per-activity metrics for one record.
pub fn process_activity(raw: &RawActivity) -> ProcessedActivity {
    let moving_time_seconds = parse_duration(&raw.moving_time);
    if moving_time_seconds == 0.0 && !raw.moving_time.is_empty() {
        warn!(
            "[Metrics] Activity {} has zero or unreadable moving time '{}'",
            raw.run_id, raw.moving_time
        );
    }

    let distance = non_negative(raw.distance);
    let pace = compute_pace(distance, moving_time_seconds);

    let (date, timestamp) = match parse_start_date(&raw.start_date_local) {
        Some(start) => (start.date().to_string(), epoch_millis(&start)),
        None => {
            warn!(
                "[Metrics] Activity {} has unreadable start date '{}', using epoch",
                raw.run_id, raw.start_date_local
            );
            (date_prefix(&raw.start_date_local), 0)
        }
    };

    ProcessedActivity {
        date,
        timestamp,
        distance_km: meters_to_km(distance),
        pace,
        moving_time_seconds,
        heart_rate: raw
            .average_heartrate
            .filter(|hr| hr.is_finite() && *hr > 0.0),
        elevation_gain: raw.elevation_gain.map(non_negative).unwrap_or(0.0),
        category: raw.activity_type.clone(),
        name: raw.name.clone(),
        streak: raw.streak,
    }
}

/// Derive metrics for every activity and sort them chronologically.
///
/// The sort is stable, so activities sharing a timestamp keep input order.
pub fn process_activities<'a, I>(activities: I) -> Vec<ProcessedActivity>
where
    I: IntoIterator<Item = &'a RawActivity>,
{
    let mut processed: Vec<ProcessedActivity> =
        activities.into_iter().map(process_activity).collect();
    processed.sort_by_key(|a| a.timestamp);
    processed
}
