//! Duration parsing and pace/speed conversion.
//!
//! Units are fixed: distances in kilometers, pace in minutes per kilometer,
//! speed in meters per second. Every function here is total; input that
//! cannot be interpreted yields 0 rather than an error.
//!
//! ## Example
//! ```rust
//! use activity_progress::units::{compute_pace, format_pace, parse_duration};
//!
//! let seconds = parse_duration("0:25:00");
//! let pace = compute_pace(5000.0, seconds);
//! assert_eq!(format_pace(pace), "5'00\"");
//! ```

use chrono::{NaiveDate, NaiveDateTime};

/// Meters in one kilometer
pub const METERS_PER_KM: f64 = 1000.0;

/// Paces above this (min/km) are treated as unset when formatting
pub const MAX_DISPLAY_PACE: f64 = 30.0;

/// Placeholder rendered for an invalid or unset pace
pub const PACE_PLACEHOLDER: &str = "--";

/// Parse a duration string into seconds.
///
/// Accepts `H:MM:SS` and `MM:SS`, with fractional seconds allowed in the last
/// field. The hour field may carry a day prefix (`"1 day, 2:03:04"`).
/// Any other shape, or a field that fails to parse, yields 0.
pub fn parse_duration(text: &str) -> f64 {
    let parts: Vec<&str> = text.trim().split(':').collect();

    let seconds = match parts.as_slice() {
        [hours, minutes, seconds] => match (
            parse_hours(hours),
            parse_whole(minutes),
            parse_seconds(seconds),
        ) {
            (Some(h), Some(m), Some(s)) => Some(h * 3600.0 + m * 60.0 + s),
            _ => None,
        },
        [minutes, seconds] => match (parse_whole(minutes), parse_seconds(seconds)) {
            (Some(m), Some(s)) => Some(m * 60.0 + s),
            _ => None,
        },
        _ => None,
    };

    match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => s,
        _ => 0.0,
    }
}

fn parse_whole(field: &str) -> Option<f64> {
    field.trim().parse::<u32>().ok().map(f64::from)
}

fn parse_seconds(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
}

/// Hours, optionally prefixed with `"<n> day(s), "`.
fn parse_hours(field: &str) -> Option<f64> {
    match field.split_once(',') {
        Some((days, hours)) => {
            let mut words = days.split_whitespace();
            let count = parse_whole(words.next()?)?;
            match (words.next(), words.next()) {
                (Some("day" | "days"), None) => Some(count * 24.0 + parse_whole(hours)?),
                _ => None,
            }
        }
        None => parse_whole(field),
    }
}

/// Parse a naive local start time such as `"2024-03-09 07:15:00"`.
///
/// Also accepts a `T` separator, fractional seconds, a trailing `Z`, and a bare
/// date (read as midnight). No timezone conversion is applied.
pub fn parse_start_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Milliseconds since the epoch for a naive date-time read as UTC.
pub fn epoch_millis(datetime: &NaiveDateTime) -> i64 {
    datetime.and_utc().timestamp_millis()
}

/// Pace in minutes per kilometer, or 0 when distance or time is not positive.
pub fn compute_pace(distance_meters: f64, time_seconds: f64) -> f64 {
    if distance_meters.is_nan()
        || time_seconds.is_nan()
        || distance_meters <= 0.0
        || time_seconds <= 0.0
    {
        return 0.0;
    }
    let distance_km = distance_meters / METERS_PER_KM;
    let time_minutes = time_seconds / 60.0;
    time_minutes / distance_km
}

/// Render a pace as `M'SS"`, e.g. 5.5 -> `5'30"`.
///
/// Returns [`PACE_PLACEHOLDER`] for paces that are not positive or exceed
/// [`MAX_DISPLAY_PACE`].
pub fn format_pace(pace: f64) -> String {
    if pace.is_nan() || pace <= 0.0 || pace > MAX_DISPLAY_PACE {
        return PACE_PLACEHOLDER.to_string();
    }
    let mut minutes = pace.floor() as u32;
    let mut seconds = ((pace - pace.floor()) * 60.0).round() as u32;
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    format!("{}'{:02}\"", minutes, seconds)
}

/// Render a distance in kilometers with one decimal.
pub fn format_distance(km: f64) -> String {
    format!("{:.1}", km)
}

/// Convert speed (m/s) to pace (min/km). Non-positive speed yields 0.
pub fn speed_to_pace(meters_per_second: f64) -> f64 {
    if meters_per_second.is_nan() || meters_per_second <= 0.0 {
        return 0.0;
    }
    METERS_PER_KM / 60.0 / meters_per_second
}

/// Convert pace (min/km) to speed (m/s). Non-positive pace yields 0.
pub fn pace_to_speed(pace: f64) -> f64 {
    if pace.is_nan() || pace <= 0.0 {
        return 0.0;
    }
    METERS_PER_KM / 60.0 / pace
}

/// Convert meters to kilometers.
pub fn meters_to_km(meters: f64) -> f64 {
    meters / METERS_PER_KM
}
