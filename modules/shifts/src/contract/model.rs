use chrono::{DateTime, NaiveDate, Utc, Weekday};
use modkit_db::PageInfo;
use uuid::Uuid;

pub use crate::domain::clock::ClockTime;

/// A stored shift with its derived durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Always a UTC day-start.
    pub date: DateTime<Utc>,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub break_hours: ClockTime,
    pub break_mins: u32,
    pub working_hours: ClockTime,
    pub working_mins: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A shift on a single date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShift {
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub break_hours: Option<ClockTime>,
}

/// The same shift on every date of an inclusive range, minus excluded weekdays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBulkShift {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub weekends: Vec<Weekday>,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub break_hours: Option<ClockTime>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftPatch {
    pub date: Option<NaiveDate>,
    pub start_time: Option<ClockTime>,
    pub end_time: Option<ClockTime>,
    pub break_hours: Option<ClockTime>,
}

/// A page of the caller's shifts plus totals over every matching shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserShiftsSummary {
    pub total_shifts: u64,
    pub total_break_mins: u64,
    pub total_break_hours: String,
    pub total_working_mins: u64,
    pub total_working_hours: String,
    pub shifts: Vec<Shift>,
    pub page: PageInfo,
}
