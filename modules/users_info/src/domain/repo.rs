use async_trait::async_trait;
use modkit_db::{LimitCfg, Page, PageError, QueryParams};

use crate::contract::User;

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;

    /// Every stored user name starting with `base`, used to pick a free suffix.
    async fn user_names_with_prefix(&self, base: &str) -> anyhow::Result<Vec<String>>;

    /// Insert `user` with its password hash. A unique violation surfaces as
    /// the underlying `sea_orm::DbErr` inside the error chain.
    async fn insert(&self, user: &User, password_hash: &str) -> anyhow::Result<()>;

    async fn list_page(&self, params: &QueryParams, limits: LimitCfg)
        -> Result<Page<User>, PageError>;
}
