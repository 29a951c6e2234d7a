use async_trait::async_trait;
use uuid::Uuid;

use super::error::DomainError;

/// The resolved caller of a shift operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

/// Outbound port: maps the caller's email to an active user.
///
/// Missing, unknown and inactive identities all fail with an
/// authentication-kind error.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, email: Option<&str>) -> Result<Owner, DomainError>;
}
