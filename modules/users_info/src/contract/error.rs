use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsersInfoError {
    #[error("No user found with email: {email}!")]
    NotFound { email: String },

    #[error("User with email {email} is not active!")]
    Inactive { email: String },

    #[error("Please provide a valid email!")]
    MissingIdentity,

    #[error("User exists with email: {email}")]
    Conflict { email: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl UsersInfoError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<crate::domain::error::DomainError> for UsersInfoError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            UserNotFound { email } => Self::NotFound { email },
            Inactive { email } => Self::Inactive { email },
            MissingIdentity => Self::MissingIdentity,
            EmailAlreadyExists { email } => Self::Conflict { email },
            e @ (InvalidEmail { .. } | InvalidPassword { .. } | InvalidQuery { .. }) => {
                Self::validation(e.to_string())
            }
            Database { .. } => Self::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;

    #[test]
    fn identity_failures_keep_their_kind() {
        assert_eq!(
            UsersInfoError::from(DomainError::user_not_found("a@b.io")),
            UsersInfoError::NotFound {
                email: "a@b.io".into()
            }
        );
        assert_eq!(
            UsersInfoError::from(DomainError::MissingIdentity),
            UsersInfoError::MissingIdentity
        );
        assert_eq!(
            UsersInfoError::from(DomainError::database("disk full")),
            UsersInfoError::Internal
        );
        assert!(matches!(
            UsersInfoError::from(DomainError::invalid_email("x")),
            UsersInfoError::Validation { .. }
        ));
    }
}
