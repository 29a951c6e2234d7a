use modkit::api::problem::{common, ErrDef, ProblemResponse};

use crate::domain::error::DomainError;

/// Stable error catalog of the shifts module.
pub mod catalog {
    use super::ErrDef;

    pub const VALIDATION: ErrDef = ErrDef::new(400, "Validation error", "SHIFTS_VALIDATION");
    pub const INVALID_TIME_RANGE: ErrDef =
        ErrDef::new(400, "Invalid time range", "SHIFTS_INVALID_TIME_RANGE");
    pub const INVALID_BREAK_TIME: ErrDef =
        ErrDef::new(400, "Invalid Break-time", "SHIFTS_INVALID_BREAK_TIME");
    pub const INVALID_QUERY: ErrDef = ErrDef::new(400, "Invalid query", "SHIFTS_INVALID_QUERY");
    pub const OVERLAP: ErrDef = ErrDef::new(409, "Shift overlap", "SHIFTS_OVERLAP");
    pub const DUPLICATE: ErrDef = ErrDef::new(409, "Duplicate shift", "SHIFTS_DUPLICATE");
    pub const NOT_FOUND: ErrDef = ErrDef::new(404, "Shift not found", "SHIFTS_NOT_FOUND");
    pub const FORBIDDEN: ErrDef = ErrDef::new(403, "Forbidden", "SHIFTS_FORBIDDEN");
    pub const UNKNOWN_USER: ErrDef = ErrDef::new(401, "Unknown user", "SHIFTS_UNKNOWN_USER");
}

/// Map domain error to RFC 9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    let def = match e {
        DomainError::Validation { .. } => catalog::VALIDATION,
        DomainError::InvalidTimeRange { .. } => catalog::INVALID_TIME_RANGE,
        DomainError::InvalidBreakTime { .. } => catalog::INVALID_BREAK_TIME,
        DomainError::InvalidQuery { .. } => catalog::INVALID_QUERY,
        DomainError::ShiftOverlap { .. } => catalog::OVERLAP,
        DomainError::Duplicate { .. } => catalog::DUPLICATE,
        DomainError::ShiftNotFound { .. } => catalog::NOT_FOUND,
        DomainError::Forbidden { .. } => catalog::FORBIDDEN,
        DomainError::UserNotFound { .. } => catalog::UNKNOWN_USER,
        DomainError::Unauthenticated { .. } => common::UNAUTHENTICATED,
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "Database error occurred");
            return modkit::internal_error(instance);
        }
    };

    let resp = def.at(e.to_string(), instance);
    match e.path() {
        Some(path) => resp.with_error(path, e.to_string()),
        None => resp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ClockTime;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    #[test]
    fn every_kind_has_one_status() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        let cases = [
            (DomainError::validation("shift.weekends", "x"), 400),
            (
                DomainError::InvalidTimeRange {
                    start: t("17:00"),
                    end: t("09:00"),
                },
                400,
            ),
            (
                DomainError::InvalidBreakTime {
                    break_hours: t("08:00"),
                    shift_mins: 60,
                },
                400,
            ),
            (
                DomainError::ShiftOverlap {
                    path: "shift.start_time".into(),
                    date: day,
                    start: t("09:00"),
                    end: t("12:00"),
                },
                409,
            ),
            (
                DomainError::Duplicate {
                    path: None,
                    message: "Shift already exists".into(),
                },
                409,
            ),
            (DomainError::ShiftNotFound { id: Uuid::nil() }, 404),
            (DomainError::Forbidden { id: None }, 403),
            (
                DomainError::UserNotFound {
                    email: "a@b.io".into(),
                },
                401,
            ),
            (DomainError::unauthenticated("Please provide a valid email!"), 401),
            (DomainError::database("boom"), 500),
        ];
        for (err, status) in cases {
            let p = map_domain_error(&err, "/api/shifts").0;
            assert_eq!(p.status, status, "{err}");
        }
    }

    #[test]
    fn break_time_problem_points_at_the_field() {
        let err = DomainError::InvalidBreakTime {
            break_hours: t("08:00"),
            shift_mins: 480,
        };
        let p = map_domain_error(&err, "/api/shifts").0;
        assert_eq!(p.title, "Invalid Break-time");
        assert_eq!(p.code, "SHIFTS_INVALID_BREAK_TIME");
        let errors = p.errors.unwrap();
        assert_eq!(errors[0].path, "shift.break_hours");
    }

    #[test]
    fn duplicate_without_path_has_no_field_errors() {
        let err = DomainError::Duplicate {
            path: None,
            message: "Shift already exists".into(),
        };
        let p = map_domain_error(&err, "/api/shifts").0;
        assert_eq!(p.detail, "Shift already exists");
        assert!(p.errors.is_none());
    }
}
