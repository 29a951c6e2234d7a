use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No user found with email: {email}!")]
    UserNotFound { email: String },

    #[error("User with email {email} is not active!")]
    Inactive { email: String },

    #[error("Please provide a valid email!")]
    MissingIdentity,

    #[error("User exists with email: {email}")]
    EmailAlreadyExists { email: String },

    #[error("Invalid email format: '{email}'")]
    InvalidEmail { email: String },

    #[error("{message}")]
    InvalidPassword { message: String },

    #[error("{message}")]
    InvalidQuery { key: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn user_not_found(email: impl Into<String>) -> Self {
        Self::UserNotFound {
            email: email.into(),
        }
    }

    pub fn inactive(email: impl Into<String>) -> Self {
        Self::Inactive {
            email: email.into(),
        }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail {
            email: email.into(),
        }
    }

    pub fn invalid_password(message: impl Into<String>) -> Self {
        Self::InvalidPassword {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Request field the error refers to, for `{ path, message }` causes.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MissingIdentity
            | Self::UserNotFound { .. }
            | Self::Inactive { .. }
            | Self::EmailAlreadyExists { .. }
            | Self::InvalidEmail { .. } => Some("email"),
            Self::InvalidPassword { .. } => Some("password"),
            Self::InvalidQuery { key, .. } => Some(key),
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
