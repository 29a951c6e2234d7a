use std::sync::Arc;

use async_trait::async_trait;
use modkit::{DbModule, RestfulModule};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};
use users_info::contract::UsersInfoApi;

use crate::api::rest::routes;
use crate::config::ShiftsConfig;
use crate::contract::client::ShiftsApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::ShiftsLocalClient;
use crate::gateways::users::UsersIdentityResolver;
use crate::infra::storage::SeaOrmShiftsRepository;

/// Shifts module: owns the `shifts` table and the scheduling endpoints.
/// Callers are resolved through the users_info client.
#[derive(Clone)]
pub struct Shifts {
    service: Arc<Service>,
}

impl Shifts {
    pub fn new(conn: DatabaseConnection, cfg: &ShiftsConfig, users: Arc<dyn UsersInfoApi>) -> Self {
        debug!(
            "Loaded shifts config: max_break={}, max_excluded_weekdays={}",
            cfg.max_break, cfg.max_excluded_weekdays
        );
        let repo = SeaOrmShiftsRepository::new(conn);
        let identity = UsersIdentityResolver::new(users);
        let service = Service::new(Arc::new(repo), Arc::new(identity), ServiceConfig::from(cfg));
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn client(&self) -> Arc<dyn ShiftsApi> {
        Arc::new(ShiftsLocalClient::new(self.service.clone()))
    }
}

#[async_trait]
impl DbModule for Shifts {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running shifts database migrations");
        crate::infra::storage::migrations::Migrator::up(db.seaorm(), None).await?;
        info!("Shifts database migrations completed successfully");
        Ok(())
    }
}

impl RestfulModule for Shifts {
    fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering shifts REST routes");
        let router = routes::register_routes(router, self.service.clone())?;
        info!("Shifts REST routes registered successfully");
        Ok(router)
    }
}
