//! Calendar dates of a bulk request, skipping chosen weekdays.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};

use super::error::DomainError;

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Parse a full weekday name such as `Saturday`, case-insensitively.
/// Abbreviations are not accepted.
pub fn parse_weekday(name: &str) -> Result<Weekday, String> {
    let wanted = name.trim();
    WEEKDAYS
        .iter()
        .find(|(full, _)| full.eq_ignore_ascii_case(wanted))
        .map(|(_, day)| *day)
        .ok_or_else(|| format!("Invalid weekday: {name}!"))
}

/// UTC calendar day of an RFC 3339 timestamp (any offset), or of a bare `YYYY-MM-DD`.
pub fn parse_day(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| "Invalid ISO date format with timezone!".to_string())
}

/// UTC day-start of `day`.
pub fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Every date from `from` to `to` inclusive, ascending, except those falling
/// on an excluded weekday.
pub fn expand(
    from: NaiveDate,
    to: NaiveDate,
    excluded: &HashSet<Weekday>,
) -> Result<Vec<NaiveDate>, DomainError> {
    if from > to {
        return Err(DomainError::validation(
            "shift.date_range",
            format!("Range start ({from}) must not be after range end ({to})!"),
        ));
    }
    Ok(from
        .iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| !excluded.contains(&d.weekday()))
        .collect())
}
