//! Time ranges, calendars, and native time axes.
//!
//! CMIP6 models do not agree on a calendar: some run proleptic Gregorian,
//! some a fixed 365-day year, some a 360-day year with twelve 30-day months.
//! A native time axis is therefore described by its calendar plus fractional
//! day-of-year positions rather than by literal dates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time range `[start, end)` for queries, on the Gregorian
/// (UTC) timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt < &self.end
    }

    /// Cache key fragment for this range.
    pub fn cache_key(&self) -> String {
        format!(
            "{}_{}",
            self.start.format("%Y%m%dT%H%M"),
            self.end.format("%Y%m%dT%H%M")
        )
    }
}

/// Length of one step on the canonical target time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeStep {
    Daily,
    /// Calendar months; step lengths vary between 28 and 31 days.
    Monthly,
}

impl TimeStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeStep::Daily => "daily",
            TimeStep::Monthly => "monthly",
        }
    }
}

/// Calendar convention of a native model time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Calendar {
    /// Proleptic Gregorian, leap years included.
    Gregorian,
    /// Fixed 365-day year, no leap days.
    NoLeap,
    /// Twelve 30-day months.
    Day360,
}

impl Calendar {
    /// Number of days in the given year under this calendar.
    pub fn year_length(&self, year: i32) -> f64 {
        match self {
            Calendar::Gregorian => {
                if is_gregorian_leap(year) {
                    366.0
                } else {
                    365.0
                }
            }
            Calendar::NoLeap => 365.0,
            Calendar::Day360 => 360.0,
        }
    }
}

fn is_gregorian_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Native time axis of a gridded field: evenly spaced steps in native days,
/// anchored at a (year, day-of-year) position in the field's own calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    pub calendar: Calendar,
    /// Year of the first step.
    pub start_year: i32,
    /// Zero-based fractional day of year of the first step.
    pub start_doy: f64,
    /// Length of one native step in native days (e.g., 1.0 daily, 30.0 for a
    /// 360-day-calendar month).
    pub step_days: f64,
    /// Number of steps on the axis.
    pub len: usize,
}

impl TimeAxis {
    pub fn new(
        calendar: Calendar,
        start_year: i32,
        start_doy: f64,
        step_days: f64,
        len: usize,
    ) -> Self {
        Self {
            calendar,
            start_year,
            start_doy,
            step_days,
            len,
        }
    }

    /// Native (year, day-of-year) position of the start of step `k`.
    ///
    /// `k` may equal `len`, giving the exclusive end of the record.
    pub fn position(&self, k: usize) -> (i32, f64) {
        let mut year = self.start_year;
        let mut doy = self.start_doy + k as f64 * self.step_days;
        loop {
            let year_len = self.calendar.year_length(year);
            if doy < year_len {
                return (year, doy);
            }
            doy -= year_len;
            year += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
