//! Calendar normalization.
//!
//! Non-Gregorian model calendars are mapped onto the UTC timeline by
//! proportional day-of-year position: native day `d` of a year with `L`
//! native days lands at Gregorian day `d / L * G` of the same year, where `G`
//! is that year's Gregorian length. The result is rounded to the nearest
//! whole second. The mapping is lossy by construction (a 360-day year cannot
//! round-trip through a 365-day one), which is why it lives in exactly one
//! place.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ensemble_common::{Calendar, TimeAxis};

/// UTC instant of the start of native step `k`.
///
/// `k` may equal `axis.len`, giving the exclusive end of the record.
pub fn step_start_utc(axis: &TimeAxis, k: usize) -> DateTime<Utc> {
    let (year, native_doy) = axis.position(k);
    to_utc(axis.calendar, year, native_doy)
}

/// Map a native (year, fractional day-of-year) position to UTC.
pub fn to_utc(calendar: Calendar, year: i32, native_doy: f64) -> DateTime<Utc> {
    let native_len = calendar.year_length(year);
    let gregorian_len = Calendar::Gregorian.year_length(year);
    let gregorian_doy = native_doy / native_len * gregorian_len;

    let seconds = (gregorian_doy * 86_400.0).round() as i64;
    // Safe: Jan 1 exists for any year chrono supports.
    let jan1 = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
    jan1 + Duration::seconds(seconds)
}
