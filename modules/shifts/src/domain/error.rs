use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use super::clock::ClockTime;

/// Failure classes shared by every shift error; each maps to one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    InvalidBreakTime,
    Conflict,
    NotFound,
    Authorization,
    Authentication,
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{message}")]
    Validation { path: String, message: String },

    #[error("End time ({end}) must be after start time ({start})!")]
    InvalidTimeRange { start: ClockTime, end: ClockTime },

    #[error("Break-time cannot be greater than or equal to the total shift duration!")]
    InvalidBreakTime { break_hours: ClockTime, shift_mins: i64 },

    #[error("Shift overlaps an existing shift from {start} to {end} on {date}!")]
    ShiftOverlap {
        path: String,
        date: NaiveDate,
        start: ClockTime,
        end: ClockTime,
    },

    #[error("{message}")]
    Duplicate { path: Option<String>, message: String },

    #[error("No shift found with id: {id}!")]
    ShiftNotFound { id: Uuid },

    #[error("No user found with email: {email}!")]
    UserNotFound { email: String },

    #[error("{}", forbidden_message(.id))]
    Forbidden { id: Option<Uuid> },

    #[error("{message}")]
    Unauthenticated { message: String },

    #[error("{message}")]
    InvalidQuery { key: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

fn forbidden_message(id: &Option<Uuid>) -> String {
    match id {
        Some(id) => format!("You are not allowed to modify shift {id}!"),
        None => "You are not allowed to access this resource!".to_string(),
    }
}

impl DomainError {
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::InvalidTimeRange { .. } | Self::InvalidQuery { .. } => {
                ErrorKind::Validation
            }
            Self::InvalidBreakTime { .. } => ErrorKind::InvalidBreakTime,
            Self::ShiftOverlap { .. } | Self::Duplicate { .. } => ErrorKind::Conflict,
            Self::ShiftNotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Authorization,
            Self::UserNotFound { .. } | Self::Unauthenticated { .. } => ErrorKind::Authentication,
            Self::Database { .. } => ErrorKind::Internal,
        }
    }

    /// Request field the error refers to, e.g. `shift.break_hours`.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Validation { path, .. } | Self::ShiftOverlap { path, .. } => Some(path),
            Self::InvalidTimeRange { .. } => Some("shift.end_time"),
            Self::InvalidBreakTime { .. } => Some("shift.break_hours"),
            Self::Duplicate { path, .. } => path.as_deref(),
            Self::InvalidQuery { key, .. } => Some(key),
            Self::ShiftNotFound { .. } | Self::Forbidden { .. } => Some("id"),
            Self::UserNotFound { .. } | Self::Unauthenticated { .. } => Some("email"),
            Self::Database { .. } => None,
        }
    }
}

impl From<modkit_db::PageError> for DomainError {
    fn from(e: modkit_db::PageError) -> Self {
        match e {
            modkit_db::PageError::Query(q) => Self::InvalidQuery {
                key: q.key().to_string(),
                message: q.to_string(),
            },
            modkit_db::PageError::Db(db) => Self::database(db.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_time_error_matches_the_public_message() {
        let e = DomainError::InvalidBreakTime {
            break_hours: ClockTime::parse("08:00").unwrap(),
            shift_mins: 480,
        };
        assert_eq!(e.kind(), ErrorKind::InvalidBreakTime);
        assert_eq!(e.path(), Some("shift.break_hours"));
        assert_eq!(
            e.to_string(),
            "Break-time cannot be greater than or equal to the total shift duration!"
        );
    }

    #[test]
    fn forbidden_message_depends_on_target() {
        let id = Uuid::nil();
        assert_eq!(
            DomainError::Forbidden { id: Some(id) }.to_string(),
            format!("You are not allowed to modify shift {id}!")
        );
        assert_eq!(
            DomainError::Forbidden { id: None }.to_string(),
            "You are not allowed to access this resource!"
        );
    }

    #[test]
    fn kinds_cover_the_taxonomy() {
        assert_eq!(DomainError::validation("x", "y").kind(), ErrorKind::Validation);
        assert_eq!(
            DomainError::Duplicate {
                path: None,
                message: "Shift already exists".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            DomainError::ShiftNotFound { id: Uuid::nil() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DomainError::UserNotFound {
                email: "a@b.io".into()
            }
            .kind(),
            ErrorKind::Authentication
        );
        assert_eq!(DomainError::database("x").kind(), ErrorKind::Internal);
    }
}
