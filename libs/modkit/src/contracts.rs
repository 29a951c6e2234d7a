use async_trait::async_trait;
use axum::Router;

/// Module that owns tables. Runs before any router is built.
#[async_trait]
pub trait DbModule: Send + Sync {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()>;
}

/// Module that contributes routes. Pure wiring; runs after migrations.
pub trait RestfulModule: Send + Sync {
    fn register_rest(&self, router: Router) -> anyhow::Result<Router>;
}
