use chrono::{DateTime, Utc};
use modkit_db::{FieldKind, FieldMap};
use sea_orm::entity::prelude::*;

use crate::contract::{ClockTime, Shift};
use crate::domain::overlap::Slot;

/// Clock times are stored as `HH:MM` text so they sort and compare as written.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shifts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub start_time: String,
    pub end_time: String,
    pub break_hours: String,
    pub break_mins: i32,
    pub working_hours: String,
    pub working_mins: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn clock(column: &str, raw: &str) -> Result<ClockTime, DbErr> {
    ClockTime::parse(raw).map_err(|e| DbErr::Type(format!("shifts.{column}: {e}")))
}

fn minutes(column: &str, raw: i32) -> Result<u32, DbErr> {
    u32::try_from(raw).map_err(|_| DbErr::Type(format!("shifts.{column}: negative value {raw}")))
}

impl TryFrom<Model> for Shift {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            user_id: m.user_id,
            date: m.date,
            start_time: clock("start_time", &m.start_time)?,
            end_time: clock("end_time", &m.end_time)?,
            break_hours: clock("break_hours", &m.break_hours)?,
            break_mins: minutes("break_mins", m.break_mins)?,
            working_hours: clock("working_hours", &m.working_hours)?,
            working_mins: minutes("working_mins", m.working_mins)?,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl TryFrom<Model> for Slot {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            date: m.date.date_naive(),
            start: clock("start_time", &m.start_time)?,
            end: clock("end_time", &m.end_time)?,
        })
    }
}

impl From<&Shift> for ActiveModel {
    fn from(s: &Shift) -> Self {
        use sea_orm::ActiveValue::Set;
        Self {
            id: Set(s.id),
            user_id: Set(s.user_id),
            date: Set(s.date),
            start_time: Set(s.start_time.to_string()),
            end_time: Set(s.end_time.to_string()),
            break_hours: Set(s.break_hours.to_string()),
            // Both are below one day in minutes.
            break_mins: Set(s.break_mins as i32),
            working_hours: Set(s.working_hours.to_string()),
            working_mins: Set(s.working_mins as i32),
            created_at: Set(s.created_at),
            updated_at: Set(s.updated_at),
        }
    }
}

/// Query keys accepted by the shift list endpoints.
pub fn list_fields() -> FieldMap<Entity> {
    FieldMap::new()
        .insert("id", Column::Id, FieldKind::Uuid)
        .insert("user_id", Column::UserId, FieldKind::Uuid)
        .insert("date", Column::Date, FieldKind::DateTimeUtc)
        .insert("start_time", Column::StartTime, FieldKind::String)
        .insert("end_time", Column::EndTime, FieldKind::String)
        .insert("break_hours", Column::BreakHours, FieldKind::String)
        .insert("working_hours", Column::WorkingHours, FieldKind::String)
        .insert("break_mins", Column::BreakMins, FieldKind::I64)
        .insert("working_mins", Column::WorkingMins, FieldKind::I64)
        .insert("created_at", Column::CreatedAt, FieldKind::DateTimeUtc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn model() -> Model {
        let day = Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap();
        Model {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            date: day,
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            break_hours: "01:00".into(),
            break_mins: 60,
            working_hours: "07:00".into(),
            working_mins: 420,
            created_at: day,
            updated_at: day,
        }
    }

    #[test]
    fn stored_rows_convert_to_shifts() {
        let shift = Shift::try_from(model()).unwrap();
        assert_eq!(shift.working_hours.to_string(), "07:00");
        assert_eq!(shift.break_mins, 60);

        let am = ActiveModel::from(&shift);
        assert_eq!(am.start_time.unwrap(), "09:00");
    }

    #[test]
    fn corrupt_clock_text_is_a_type_error() {
        let mut m = model();
        m.end_time = "5pm".into();
        let err = Shift::try_from(m).unwrap_err();
        assert!(matches!(err, DbErr::Type(msg) if msg.contains("end_time")));
    }
}
