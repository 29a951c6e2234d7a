//! Identity resolution through the users_info module's public client.

use std::sync::Arc;

use async_trait::async_trait;
use users_info::contract::{UsersInfoApi, UsersInfoError};

use crate::domain::error::DomainError;
use crate::domain::ports::{IdentityResolver, Owner};

pub struct UsersIdentityResolver {
    users: Arc<dyn UsersInfoApi>,
}

impl UsersIdentityResolver {
    pub fn new(users: Arc<dyn UsersInfoApi>) -> Self {
        Self { users }
    }
}

fn map_users_error(e: UsersInfoError) -> DomainError {
    match e {
        UsersInfoError::NotFound { email } => DomainError::UserNotFound { email },
        e @ (UsersInfoError::MissingIdentity
        | UsersInfoError::Inactive { .. }
        | UsersInfoError::Conflict { .. }
        | UsersInfoError::Validation { .. }) => DomainError::unauthenticated(e.to_string()),
        UsersInfoError::Internal => DomainError::database("identity lookup failed"),
    }
}

#[async_trait]
impl IdentityResolver for UsersIdentityResolver {
    async fn resolve(&self, email: Option<&str>) -> Result<Owner, DomainError> {
        let user = self
            .users
            .resolve_active(email)
            .await
            .map_err(map_users_error)?;
        Ok(Owner {
            id: user.id,
            email: user.email,
            is_admin: user.role.is_admin(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    #[test]
    fn identity_failures_are_authentication_errors() {
        let cases = [
            UsersInfoError::MissingIdentity,
            UsersInfoError::NotFound {
                email: "a@b.io".into(),
            },
            UsersInfoError::Inactive {
                email: "a@b.io".into(),
            },
        ];
        for e in cases {
            assert_eq!(map_users_error(e).kind(), ErrorKind::Authentication);
        }
        assert_eq!(
            map_users_error(UsersInfoError::Internal).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn missing_identity_keeps_its_message() {
        assert_eq!(
            map_users_error(UsersInfoError::MissingIdentity).to_string(),
            "Please provide a valid email!"
        );
    }
}
