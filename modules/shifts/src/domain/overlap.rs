//! Write-time screening of a user's shifts for overlapping intervals.
//!
//! Intervals are closed: a shift ending at `12:00` and one starting at
//! `12:00` on the same date conflict. Shifts on different dates never do.

use chrono::NaiveDate;
use uuid::Uuid;

use super::clock::ClockTime;
use super::error::DomainError;

/// The part of a stored shift the detector looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
}

/// Closed `[start, end]` intersection test.
pub fn intersects(a_start: ClockTime, a_end: ClockTime, b_start: ClockTime, b_end: ClockTime) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Fail with `ShiftOverlap` on the first stored slot that shares a point with
/// the candidate on the same date. `exclude` skips the shift being updated.
///
/// The error path is `shift.start_time` when the candidate starts inside the
/// stored slot, else `shift.end_time`.
pub fn check(
    existing: &[Slot],
    date: NaiveDate,
    start: ClockTime,
    end: ClockTime,
    exclude: Option<Uuid>,
) -> Result<(), DomainError> {
    let conflict = existing
        .iter()
        .filter(|s| s.date == date && Some(s.id) != exclude)
        .find(|s| intersects(start, end, s.start, s.end));

    match conflict {
        None => Ok(()),
        Some(s) => {
            let path = if s.start <= start && start <= s.end {
                "shift.start_time"
            } else {
                "shift.end_time"
            };
            Err(DomainError::ShiftOverlap {
                path: path.to_string(),
                date,
                start: s.start,
                end: s.end,
            })
        }
    }
}

/// Screen one interval on several dates, as bulk creation does.
pub fn check_dates(
    existing: &[Slot],
    dates: &[NaiveDate],
    start: ClockTime,
    end: ClockTime,
) -> Result<(), DomainError> {
    dates
        .iter()
        .try_for_each(|date| check(existing, *date, start, end, None))
}
