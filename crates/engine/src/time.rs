use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::model::{DayOfWeek, Workshop};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid clock time '{0}' -- expected HH:MM")]
pub struct TimeFormatError(pub String);

// ---------------------------------------------------------------------------
// Clock strings <-> fractional hours
// ---------------------------------------------------------------------------

/// Parse an `HH:MM` (or `H:MM`) clock string into fractional hours.
///
/// Parsing is strict: both components must be present and numeric, minutes
/// must be two digits below 60, and `24:00` is the only accepted value past
/// 23:59.
pub fn time_to_number(s: &str) -> Result<f64, TimeFormatError> {
    let err = || TimeFormatError(s.to_string());

    let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
    let numeric = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !numeric(h) || h.len() > 2 || !numeric(m) || m.len() != 2 {
        return Err(err());
    }

    let hours: u32 = h.parse().map_err(|_| err())?;
    let minutes: u32 = m.parse().map_err(|_| err())?;
    if minutes > 59 || hours > 24 || (hours == 24 && minutes > 0) {
        return Err(err());
    }

    Ok(hours as f64 + minutes as f64 / 60.0)
}

/// Format fractional hours as a zero-padded `HH:MM` string, rounding to the
/// nearest minute.
pub fn number_to_time_string(hours: f64) -> String {
    let total = total_minutes(hours);
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn total_minutes(hours: f64) -> i64 {
    (hours * 60.0).round().max(0.0) as i64
}

/// Fractional hour of a wall-clock time, at minute granularity.
pub fn hour_of(t: NaiveTime) -> f64 {
    t.hour() as f64 + t.minute() as f64 / 60.0
}

/// The instant `hours` after midnight on `date`.
pub fn at_hour(date: NaiveDate, hours: f64) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::minutes(total_minutes(hours))
}

/// `t` with seconds and below dropped.
pub fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(t)
}

/// `YYYY-MM-DDTHH:MM` for `hours` after midnight on `date`.
pub fn format_instant(date: NaiveDate, hours: f64) -> String {
    format!("{}T{}", date.format("%Y-%m-%d"), number_to_time_string(hours))
}

// ---------------------------------------------------------------------------
// Calendar helpers
// ---------------------------------------------------------------------------

pub fn day_of_week(date: NaiveDate) -> DayOfWeek {
    date.weekday().into()
}

/// Ceiling of the absolute number of days elapsed between two instants.
pub fn days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let secs = (end - start).num_seconds().abs();
    (secs + 86_399) / 86_400
}

/// Earliest instant at or after `from` at which `workshop` is open.
///
/// On an open day this is the opening time when `from` is earlier, or `from`
/// itself when it falls inside the window. Once the day has closed the scan
/// moves forward day by day, wrapping into the following week. Returns
/// `None` for a workshop that is never open.
pub fn next_opening(workshop: &Workshop, from: NaiveDateTime) -> Option<NaiveDateTime> {
    let from_hour = hour_of(from.time());

    for offset in 0..=7 {
        let date = from.date().checked_add_signed(Duration::days(offset))?;
        let Some((open, close)) = workshop.window(day_of_week(date)) else {
            continue;
        };
        if offset > 0 || from_hour < open {
            return Some(at_hour(date, open));
        }
        if from_hour < close {
            return Some(from);
        }
    }
    None
}

/// Opening time of the first open day strictly after `date`.
pub fn next_day_start(workshop: &Workshop, date: NaiveDate) -> Option<NaiveDateTime> {
    let tomorrow = date.succ_opt()?;
    next_opening(workshop, tomorrow.and_time(NaiveTime::MIN))
}

// ---------------------------------------------------------------------------
// ISO 8601 datetime parsing
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a local wall-clock datetime. A trailing `Z` is ignored; a bare date
/// means midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_end_matches('Z');

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
