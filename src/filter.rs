//! Activity selection by category, relative time window and calendar year.
//!
//! Filtering never reorders: survivors keep their input order. Callers that
//! need chronological order sort afterwards (see [`crate::metrics`]).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ProgressError, Result};
use crate::units::parse_start_date;
use crate::RawActivity;

/// Activity category selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum ActivityType {
    #[default]
    Run,
    Walk,
    Ride,
    /// Wildcard: every category
    All,
}

impl ActivityType {
    /// Upstream category label for this selector.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Run => "Run",
            ActivityType::Walk => "Walk",
            ActivityType::Ride => "Ride",
            ActivityType::All => "All",
        }
    }

    /// Exact category match, except under the wildcard.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            ActivityType::All => true,
            _ => category == self.as_str(),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Run" => Ok(ActivityType::Run),
            "Walk" => Ok(ActivityType::Walk),
            "Ride" => Ok(ActivityType::Ride),
            "All" => Ok(ActivityType::All),
            other => Err(ProgressError::UnknownSelector {
                kind: "activity type",
                value: other.to_string(),
            }),
        }
    }
}

/// Trailing time window relative to "now".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum TimeRange {
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    AllTime,
}

impl TimeRange {
    /// Short selector label (`3m`, `6m`, `1y`, `all`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ThreeMonths => "3m",
            TimeRange::SixMonths => "6m",
            TimeRange::OneYear => "1y",
            TimeRange::AllTime => "all",
        }
    }

    fn months(&self) -> Option<u32> {
        match self {
            TimeRange::ThreeMonths => Some(3),
            TimeRange::SixMonths => Some(6),
            TimeRange::OneYear => Some(12),
            TimeRange::AllTime => None,
        }
    }

    /// Earliest start time kept by this window, or `None` for all time.
    ///
    /// Calendar months are subtracted, clamping to the end of shorter months.
    pub fn cutoff(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let months = self.months()?;
        Some(
            now.checked_sub_months(Months::new(months))
                .unwrap_or(NaiveDateTime::MIN),
        )
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "3m" => Ok(TimeRange::ThreeMonths),
            "6m" => Ok(TimeRange::SixMonths),
            "1y" => Ok(TimeRange::OneYear),
            "all" => Ok(TimeRange::AllTime),
            other => Err(ProgressError::UnknownSelector {
                kind: "time range",
                value: other.to_string(),
            }),
        }
    }
}

/// The full set of filter parameters. Doubles as the memo cache key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterParams {
    pub activity_type: ActivityType,
    pub time_range: TimeRange,
    /// Restrict to one calendar year
    pub year: Option<i32>,
}

impl FilterParams {
    pub fn new(activity_type: ActivityType, time_range: TimeRange) -> Self {
        Self {
            activity_type,
            time_range,
            year: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Start time of an activity, with unparseable dates pinned to the epoch.
pub(crate) fn start_time(activity: &RawActivity) -> NaiveDateTime {
    parse_start_date(&activity.start_date_local).unwrap_or_default()
}

/// Calendar year of an activity's start date, if it parses.
pub fn activity_year(activity: &RawActivity) -> Option<i32> {
    parse_start_date(&activity.start_date_local).map(|d| d.year())
}

/// Select activities matching the category, time window and year.
///
/// An activity is excluded from a bounded window when it started strictly
/// before the cutoff. Relative input order is preserved.
pub fn filter_activities<'a>(
    activities: &'a [RawActivity],
    params: &FilterParams,
    now: NaiveDateTime,
) -> Vec<&'a RawActivity> {
    let cutoff = params.time_range.cutoff(now);

    activities
        .iter()
        .filter(|a| params.activity_type.matches(&a.activity_type))
        .filter(|a| match cutoff {
            Some(cutoff) => start_time(a) >= cutoff,
            None => true,
        })
        .filter(|a| match params.year {
            Some(year) => activity_year(a) == Some(year),
            None => true,
        })
        .collect()
}

/// Activities of one calendar year, in input order.
pub fn filter_by_year(activities: &[RawActivity], year: i32) -> Vec<&RawActivity> {
    activities
        .iter()
        .filter(|a| activity_year(a) == Some(year))
        .collect()
}

/// Distinct years present in the collection, newest first.
pub fn available_years(activities: &[RawActivity]) -> Vec<i32> {
    let mut years: Vec<i32> = activities.iter().filter_map(activity_year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}
