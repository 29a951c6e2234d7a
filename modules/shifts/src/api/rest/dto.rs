use chrono::{DateTime, NaiveDate, Utc, Weekday};
use modkit::{FieldError, Violations};
use modkit_db::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{NewBulkShift, NewShift, Shift, ShiftPatch, UserShiftsSummary};
use crate::contract::ClockTime;
use crate::domain::date_range::{parse_day, parse_weekday};
use crate::domain::service::ServiceConfig;

/// REST DTO for a stored shift. Clock values are `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShiftDto {
    pub id: Uuid,
    pub user_id: Uuid,
    /// UTC day-start of the shift's date.
    pub date: DateTime<Utc>,
    pub start_time: String,
    pub end_time: String,
    pub break_hours: String,
    pub break_mins: u32,
    pub working_hours: String,
    pub working_mins: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Shift> for ShiftDto {
    fn from(s: Shift) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            date: s.date,
            start_time: s.start_time.to_string(),
            end_time: s.end_time.to_string(),
            break_hours: s.break_hours.to_string(),
            break_mins: s.break_mins,
            working_hours: s.working_hours.to_string(),
            working_mins: s.working_mins,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// The caller's shifts with totals over every matching shift.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserShiftsDto {
    pub total_shifts: u64,
    pub total_break_mins: u64,
    /// Unbounded hours, e.g. `47:30`.
    pub total_break_hours: String,
    pub total_working_mins: u64,
    pub total_working_hours: String,
    pub shifts: Vec<ShiftDto>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl From<UserShiftsSummary> for UserShiftsDto {
    fn from(s: UserShiftsSummary) -> Self {
        Self {
            total_shifts: s.total_shifts,
            total_break_mins: s.total_break_mins,
            total_break_hours: s.total_break_hours,
            total_working_mins: s.total_working_mins,
            total_working_hours: s.total_working_hours,
            shifts: s.shifts.into_iter().map(ShiftDto::from).collect(),
            page: s.page.page,
            limit: s.page.limit,
            total: s.page.total,
        }
    }
}

/// Created shift(s): one object for a single date, an array for a range.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CreatedShiftsDto {
    One(ShiftDto),
    Many(Vec<ShiftDto>),
}

/// One page of shifts across all users.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShiftListDto {
    pub shifts: Vec<ShiftDto>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl From<Page<Shift>> for ShiftListDto {
    fn from(page: Page<Shift>) -> Self {
        Self {
            page: page.page_info.page,
            limit: page.page_info.limit,
            total: page.page_info.total,
            shifts: page.items.into_iter().map(ShiftDto::from).collect(),
        }
    }
}

/// Shift creation payload: either a single `date`, or a two-element
/// `date_range` with optional `weekends` to skip.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateShiftReq {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Break duration as `HH:MM`, defaults to `00:00`.
    #[serde(default)]
    pub break_hours: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
    /// `[from, to]`, both inclusive.
    #[serde(default)]
    pub date_range: Option<Vec<String>>,
    /// Weekday names excluded from `date_range`, e.g. `["Saturday", "Sunday"]`.
    #[serde(default)]
    pub weekends: Option<Vec<String>>,
}

/// Partial shift update. Range fields are not accepted here.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateShiftReq {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub break_hours: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// A validated creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateShift {
    Single(NewShift),
    Bulk(NewBulkShift),
}

fn required_clock(v: &mut Violations, path: &str, raw: Option<&str>) -> Option<ClockTime> {
    match raw {
        Some(raw) => v.check(path, ClockTime::parse(raw)),
        None => {
            v.push(path, format!("{} is required", path.trim_start_matches("shift.")));
            None
        }
    }
}

/// `Ok(None)` when absent; `Err(())` once a violation was recorded.
fn break_time(v: &mut Violations, raw: Option<&str>, cfg: &ServiceConfig) -> Result<Option<ClockTime>, ()> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let parsed = v
        .check("shift.break_hours", ClockTime::parse(raw))
        .and_then(|b| v.check("shift.break_hours", cfg.check_break(b)));
    parsed.map(Some).ok_or(())
}

fn weekdays(v: &mut Violations, names: &[String], cfg: &ServiceConfig) -> Option<Vec<Weekday>> {
    let parsed: Vec<Weekday> = names
        .iter()
        .filter_map(|n| v.check("shift.weekends", parse_weekday(n)))
        .collect();
    if parsed.len() != names.len() {
        return None;
    }
    v.check("shift.weekends", cfg.check_weekends(&parsed))?;
    Some(parsed)
}

fn optional_day(v: &mut Violations, path: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ()> {
    match raw {
        None => Ok(None),
        Some(raw) => v.check(path, parse_day(raw)).map(Some).ok_or(()),
    }
}

impl CreateShiftReq {
    /// Check every field and report all failures at once.
    pub fn validate(&self, cfg: &ServiceConfig) -> Result<CreateShift, Vec<FieldError>> {
        let mut v = Violations::new();

        let start_time = required_clock(&mut v, "shift.start_time", self.start_time.as_deref());
        let end_time = required_clock(&mut v, "shift.end_time", self.end_time.as_deref());
        let break_hours = break_time(&mut v, self.break_hours.as_deref(), cfg);

        let target = match (self.date.as_deref(), self.date_range.as_deref()) {
            (Some(_), Some(_)) => {
                v.push("shift.date", "Provide either date or date_range, not both!");
                None
            }
            (None, None) => {
                v.push("shift.date", "Either date or date_range is required!");
                None
            }
            (Some(raw), None) => {
                if self.weekends.is_some() {
                    v.push("shift.weekends", "Weekends can only be used with date_range!");
                }
                v.check("shift.date", parse_day(raw)).map(Target::Day)
            }
            (None, Some([from, to])) => {
                let from = v.check("shift.date_range", parse_day(from));
                let to = v.check("shift.date_range", parse_day(to));
                let weekends = match self.weekends.as_deref() {
                    Some(names) => weekdays(&mut v, names, cfg),
                    None => Some(Vec::new()),
                };
                match (from, to, weekends) {
                    (Some(from), Some(to), Some(weekends)) => Some(Target::Range(from, to, weekends)),
                    _ => None,
                }
            }
            (None, Some(_)) => {
                v.push("shift.date_range", "Date range must contain exactly two dates!");
                None
            }
        };

        match (start_time, end_time, break_hours, target) {
            (Some(start_time), Some(end_time), Ok(break_hours), Some(target)) if v.is_empty() => {
                Ok(match target {
                    Target::Day(date) => CreateShift::Single(NewShift {
                        date,
                        start_time,
                        end_time,
                        break_hours,
                    }),
                    Target::Range(from, to, weekends) => CreateShift::Bulk(NewBulkShift {
                        from,
                        to,
                        weekends,
                        start_time,
                        end_time,
                        break_hours,
                    }),
                })
            }
            _ => Err(v.into_errors()),
        }
    }
}

enum Target {
    Day(NaiveDate),
    Range(NaiveDate, NaiveDate, Vec<Weekday>),
}

impl UpdateShiftReq {
    pub fn validate(&self, cfg: &ServiceConfig) -> Result<ShiftPatch, Vec<FieldError>> {
        let mut v = Violations::new();

        let start_time = self
            .start_time
            .as_deref()
            .map(|raw| v.check("shift.start_time", ClockTime::parse(raw)));
        let end_time = self
            .end_time
            .as_deref()
            .map(|raw| v.check("shift.end_time", ClockTime::parse(raw)));
        let break_hours = break_time(&mut v, self.break_hours.as_deref(), cfg);
        let date = optional_day(&mut v, "shift.date", self.date.as_deref());

        match (break_hours, date) {
            (Ok(break_hours), Ok(date)) if v.is_empty() => Ok(ShiftPatch {
                date,
                start_time: start_time.flatten(),
                end_time: end_time.flatten(),
                break_hours,
            }),
            _ => Err(v.into_errors()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn req(value: serde_json::Value) -> CreateShiftReq {
        serde_json::from_value(value).unwrap()
    }

    fn paths(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn single_date_request() {
        let parsed = req(json!({
            "start_time": "09:00",
            "end_time": "17:00",
            "break_hours": "01:00",
            "date": "2024-01-06T10:30:00.000+02:00"
        }))
        .validate(&ServiceConfig::default())
        .unwrap();

        let CreateShift::Single(new) = parsed else {
            panic!("expected a single shift");
        };
        assert_eq!(new.date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        assert_eq!(new.break_hours, Some(ClockTime::parse("01:00").unwrap()));
    }

    #[test]
    fn range_request_with_weekends() {
        let parsed = req(json!({
            "start_time": "09:00",
            "end_time": "17:00",
            "date_range": ["2024-01-01", "2024-01-07"],
            "weekends": ["Saturday", "Sunday"]
        }))
        .validate(&ServiceConfig::default())
        .unwrap();

        let CreateShift::Bulk(bulk) = parsed else {
            panic!("expected a bulk request");
        };
        assert_eq!(bulk.weekends, vec![Weekday::Sat, Weekday::Sun]);
        assert_eq!(bulk.break_hours, None);
    }

    #[test]
    fn every_bad_field_is_reported() {
        let errors = req(json!({
            "start_time": "9am",
            "break_hours": "09:00",
            "date_range": ["2024-01-01"]
        }))
        .validate(&ServiceConfig::default())
        .unwrap_err();

        assert_eq!(
            paths(&errors),
            vec![
                "shift.start_time",
                "shift.end_time",
                "shift.break_hours",
                "shift.date_range"
            ]
        );
        assert_eq!(errors[0].message, "Invalid ClockTime format (HH:MM)");
        assert_eq!(
            errors[2].message,
            "Break-time cannot be more than 8 hours (08:00)"
        );
    }

    #[test]
    fn date_and_range_are_exclusive() {
        let errors = req(json!({
            "start_time": "09:00",
            "end_time": "17:00",
            "date": "2024-01-01",
            "date_range": ["2024-01-01", "2024-01-07"]
        }))
        .validate(&ServiceConfig::default())
        .unwrap_err();
        assert_eq!(paths(&errors), vec!["shift.date"]);
    }

    #[test]
    fn weekends_are_checked() {
        let cfg = ServiceConfig::default();
        let base = json!({
            "start_time": "09:00",
            "end_time": "17:00",
            "date_range": ["2024-01-01", "2024-01-31"]
        });

        let mut dup = base.clone();
        dup["weekends"] = json!(["Sunday", "sunday"]);
        let errors = req(dup).validate(&cfg).unwrap_err();
        assert_eq!(errors[0].message, "Weekends must be unique!");

        let mut unknown = base.clone();
        unknown["weekends"] = json!(["Caturday"]);
        let errors = req(unknown).validate(&cfg).unwrap_err();
        assert_eq!(errors[0].message, "Invalid weekday: Caturday!");

        let mut all = base;
        all["weekends"] = json!([
            "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"
        ]);
        let errors = req(all).validate(&cfg).unwrap_err();
        assert_eq!(errors[0].message, "Weekends cannot be more than 6 days!");
    }

    #[test]
    fn bad_iso_date() {
        let errors = req(json!({
            "start_time": "09:00",
            "end_time": "17:00",
            "date": "06/01/2024"
        }))
        .validate(&ServiceConfig::default())
        .unwrap_err();
        assert_eq!(errors[0].path, "shift.date");
        assert_eq!(errors[0].message, "Invalid ISO date format with timezone!");
    }

    #[test]
    fn update_rejects_range_fields() {
        let res: Result<UpdateShiftReq, _> = serde_json::from_value(json!({
            "start_time": "10:00",
            "weekends": ["Sunday"]
        }));
        assert!(res.is_err());
    }

    #[test]
    fn update_keeps_absent_fields_empty() {
        let patch = UpdateShiftReq {
            end_time: Some("18:00".into()),
            ..Default::default()
        }
        .validate(&ServiceConfig::default())
        .unwrap();
        assert_eq!(
            patch,
            ShiftPatch {
                end_time: Some(ClockTime::parse("18:00").unwrap()),
                ..Default::default()
            }
        );
    }
}
