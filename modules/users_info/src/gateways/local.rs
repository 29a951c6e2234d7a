use std::sync::Arc;

use async_trait::async_trait;
use modkit_db::{Page, QueryParams};

use crate::contract::{
    client::UsersInfoApi,
    error::UsersInfoError,
    model::{NewUser, User},
};
use crate::domain::service::Service;

/// In-process implementation of `UsersInfoApi` that delegates to the domain service.
pub struct UsersInfoLocalClient {
    service: Arc<Service>,
}

impl UsersInfoLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UsersInfoApi for UsersInfoLocalClient {
    async fn register(&self, new_user: NewUser) -> Result<User, UsersInfoError> {
        self.service.register(new_user).await.map_err(Into::into)
    }

    async fn resolve_active(&self, email: Option<&str>) -> Result<User, UsersInfoError> {
        self.service.resolve_active(email).await.map_err(Into::into)
    }

    async fn get_profile(&self, email: &str) -> Result<User, UsersInfoError> {
        self.service.get_profile(email).await.map_err(Into::into)
    }

    async fn list_users(&self, params: QueryParams) -> Result<Page<User>, UsersInfoError> {
        self.service.list_users(params).await.map_err(Into::into)
    }
}
