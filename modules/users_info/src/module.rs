use std::sync::Arc;

use async_trait::async_trait;
use modkit::{DbModule, RestfulModule};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::UsersInfoConfig;
use crate::contract::client::UsersInfoApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::UsersInfoLocalClient;
use crate::infra::storage::SeaOrmUsersRepository;

/// Users module: owns the `users` table, the identity endpoints and the
/// in-process client other modules resolve callers through.
#[derive(Clone)]
pub struct UsersInfo {
    service: Arc<Service>,
}

impl UsersInfo {
    /// Wire repository (infra) to domain service (port).
    pub fn new(conn: DatabaseConnection, cfg: &UsersInfoConfig) -> Self {
        debug!(
            "Loaded users_info config: default_page_size={}, max_page_size={}",
            cfg.default_page_size, cfg.max_page_size
        );
        let repo = SeaOrmUsersRepository::new(conn);
        let service = Service::new(Arc::new(repo), ServiceConfig::from(cfg));
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Local in-process client for other modules.
    pub fn client(&self) -> Arc<dyn UsersInfoApi> {
        Arc::new(UsersInfoLocalClient::new(self.service.clone()))
    }
}

#[async_trait]
impl DbModule for UsersInfo {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running users_info database migrations");
        crate::infra::storage::migrations::Migrator::up(db.seaorm(), None).await?;
        info!("Users database migrations completed successfully");
        Ok(())
    }
}

impl RestfulModule for UsersInfo {
    fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering users_info REST routes");
        let router = routes::register_routes(router, self.service.clone())?;
        info!("Users REST routes registered successfully");
        Ok(router)
    }
}
