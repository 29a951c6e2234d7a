use thiserror::Error;

use crate::domain::error::{DomainError, ErrorKind};

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShiftsError {
    #[error("{message}")]
    Validation { path: Option<String>, message: String },

    #[error("{message}")]
    Conflict { path: Option<String>, message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    Unauthenticated { message: String },

    #[error("Internal error")]
    Internal,
}

impl From<DomainError> for ShiftsError {
    fn from(e: DomainError) -> Self {
        let path = e.path().map(str::to_string);
        let message = e.to_string();
        match e.kind() {
            ErrorKind::Validation | ErrorKind::InvalidBreakTime => Self::Validation { path, message },
            ErrorKind::Conflict => Self::Conflict { path, message },
            ErrorKind::NotFound => Self::NotFound { message },
            ErrorKind::Authorization => Self::Forbidden { message },
            ErrorKind::Authentication => Self::Unauthenticated { message },
            ErrorKind::Internal => Self::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn projection_keeps_path_and_message() {
        let e = ShiftsError::from(DomainError::validation("shift.weekends", "Weekends must be unique!"));
        assert_eq!(
            e,
            ShiftsError::Validation {
                path: Some("shift.weekends".into()),
                message: "Weekends must be unique!".into()
            }
        );
        assert!(matches!(
            ShiftsError::from(DomainError::ShiftNotFound { id: Uuid::nil() }),
            ShiftsError::NotFound { .. }
        ));
        assert_eq!(
            ShiftsError::from(DomainError::database("disk")),
            ShiftsError::Internal
        );
    }
}
