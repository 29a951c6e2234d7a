use modkit::api::problem::{common, ErrDef, ProblemResponse};

use crate::domain::error::DomainError;

/// Stable error catalog of the users_info module.
pub mod catalog {
    use super::ErrDef;

    pub const USER_NOT_FOUND: ErrDef = ErrDef::new(404, "User not found", "USERS_NOT_FOUND");
    pub const USER_INACTIVE: ErrDef = ErrDef::new(403, "User is not active", "USERS_INACTIVE");
    pub const EMAIL_CONFLICT: ErrDef =
        ErrDef::new(409, "Email already exists", "USERS_EMAIL_CONFLICT");
    pub const INVALID_EMAIL: ErrDef = ErrDef::new(400, "Invalid email", "USERS_INVALID_EMAIL");
    pub const INVALID_PASSWORD: ErrDef =
        ErrDef::new(400, "Invalid password", "USERS_INVALID_PASSWORD");
    pub const INVALID_QUERY: ErrDef = ErrDef::new(400, "Invalid query", "USERS_INVALID_QUERY");
}

/// Map domain error to RFC 9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    let def = match e {
        DomainError::MissingIdentity => common::UNAUTHENTICATED,
        DomainError::UserNotFound { .. } => catalog::USER_NOT_FOUND,
        DomainError::Inactive { .. } => catalog::USER_INACTIVE,
        DomainError::EmailAlreadyExists { .. } => catalog::EMAIL_CONFLICT,
        DomainError::InvalidEmail { .. } => catalog::INVALID_EMAIL,
        DomainError::InvalidPassword { .. } => catalog::INVALID_PASSWORD,
        DomainError::InvalidQuery { .. } => catalog::INVALID_QUERY,
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
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
