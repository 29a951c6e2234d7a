//! `HH:MM` clock times and minute arithmetic.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("Invalid ClockTime format (HH:MM)")]
    Malformed(String),

    #[error("{0} minutes is outside a single day (0..=1439)")]
    OutOfRange(u32),
}

/// Time of day with minute precision, `00:00` through `23:59`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    /// Default cap on break length.
    pub const EIGHT_HOURS: ClockTime = ClockTime::hours(8);

    /// Whole hours `0..=23`, for constants. An hour past 23 fails const
    /// evaluation (or panics if called at runtime); it is never clamped.
    pub const fn hours(h: u16) -> Self {
        assert!(h < 24, "hour must be in 0..=23");
        ClockTime(h * 60)
    }

    /// Minutes since midnight; anything past `23:59` is rejected, never wrapped.
    pub fn from_minutes(minutes: u32) -> Result<Self, ClockError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(ClockError::OutOfRange(minutes));
        }
        Ok(ClockTime(minutes as u16))
    }

    /// Strict `HH:MM`; surrounding whitespace is tolerated.
    pub fn parse(s: &str) -> Result<Self, ClockError> {
        let s = s.trim();
        let caps = CLOCK_RE
            .captures(s)
            .ok_or_else(|| ClockError::Malformed(s.to_string()))?;
        let h: u16 = caps[1].parse().map_err(|_| ClockError::Malformed(s.to_string()))?;
        let m: u16 = caps[2].parse().map_err(|_| ClockError::Malformed(s.to_string()))?;
        Ok(ClockTime(h * 60 + m))
    }

    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }
}

impl FromStr for ClockTime {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ClockTime::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// `"HH:MM"` to minutes since midnight.
pub fn parse(s: &str) -> Result<u32, ClockError> {
    ClockTime::parse(s).map(ClockTime::minutes)
}

/// Minutes since midnight to `"HH:MM"`; only defined within one day.
pub fn format(minutes: u32) -> Result<String, ClockError> {
    ClockTime::from_minutes(minutes).map(|t| t.to_string())
}

/// Minute totals as `H..H:MM` with as many hour digits as needed (`47:30`).
/// Used for sums across shifts, which routinely exceed a day.
pub fn format_total_hours(minutes: u64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_times() {
        assert_eq!(parse("00:00").unwrap(), 0);
        assert_eq!(parse("09:05").unwrap(), 545);
        assert_eq!(parse(" 23:59 ").unwrap(), 1439);
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["24:00", "9:00", "09:60", "0900", "09:00:00", "", "ab:cd", "-1:00"] {
            assert!(
                matches!(parse(bad), Err(ClockError::Malformed(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn formats_within_a_day_only() {
        assert_eq!(format(0).unwrap(), "00:00");
        assert_eq!(format(420).unwrap(), "07:00");
        assert_eq!(format(1439).unwrap(), "23:59");
        assert_eq!(format(1440), Err(ClockError::OutOfRange(1440)));
    }

    #[test]
    fn every_minute_of_the_day_round_trips() {
        for m in 0..MINUTES_PER_DAY {
            assert_eq!(parse(&format(m).unwrap()).unwrap(), m);
        }
    }

    #[test]
    fn totals_are_not_wrapped() {
        assert_eq!(format_total_hours(0), "00:00");
        assert_eq!(format_total_hours(2850), "47:30");
        assert_eq!(format_total_hours(60 * 125 + 5), "125:05");
    }

    #[test]
    fn whole_hours_are_exact() {
        assert_eq!(ClockTime::hours(0), ClockTime::MIDNIGHT);
        assert_eq!(ClockTime::EIGHT_HOURS.to_string(), "08:00");
        assert_eq!(ClockTime::hours(23).minutes(), 23 * 60);
    }

    #[test]
    #[should_panic(expected = "hour must be in 0..=23")]
    fn whole_hours_past_the_day_are_rejected() {
        let h = std::hint::black_box(24);
        let _ = ClockTime::hours(h);
    }

    #[test]
    fn serde_uses_the_string_form() {
        let t: ClockTime = serde_json::from_str("\"17:45\"").unwrap();
        assert_eq!(t.minutes(), 17 * 60 + 45);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"17:45\"");
        assert!(serde_json::from_str::<ClockTime>("\"7:45\"").is_err());
    }
}
