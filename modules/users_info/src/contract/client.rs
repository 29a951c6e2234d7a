use async_trait::async_trait;
use modkit_db::{Page, QueryParams};

use crate::contract::{
    error::UsersInfoError,
    model::{NewUser, User},
};

/// Public API of the users_info module for other modules.
#[async_trait]
pub trait UsersInfoApi: Send + Sync {
    /// Register a new identity.
    async fn register(&self, new_user: NewUser) -> Result<User, UsersInfoError>;

    /// Resolve the caller's email to an existing, active user.
    async fn resolve_active(&self, email: Option<&str>) -> Result<User, UsersInfoError>;

    /// Public profile of the user with this email.
    async fn get_profile(&self, email: &str) -> Result<User, UsersInfoError>;

    /// Filtered, sorted page of users.
    async fn list_users(&self, params: QueryParams) -> Result<Page<User>, UsersInfoError>;
}
