use std::sync::Arc;

use async_trait::async_trait;
use modkit_db::{Page, QueryParams};
use uuid::Uuid;

use crate::contract::{
    client::ShiftsApi,
    error::ShiftsError,
    model::{NewBulkShift, NewShift, Shift, ShiftPatch, UserShiftsSummary},
};
use crate::domain::service::Service;

/// In-process implementation of `ShiftsApi` that delegates to the domain service.
pub struct ShiftsLocalClient {
    service: Arc<Service>,
}

impl ShiftsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ShiftsApi for ShiftsLocalClient {
    async fn create_shift(&self, email: Option<&str>, new: NewShift) -> Result<Shift, ShiftsError> {
        self.service.create_shift(email, new).await.map_err(Into::into)
    }

    async fn create_bulk_shifts(
        &self,
        email: Option<&str>,
        new: NewBulkShift,
    ) -> Result<Vec<Shift>, ShiftsError> {
        self.service
            .create_bulk_shifts(email, new)
            .await
            .map_err(Into::into)
    }

    async fn update_shift(
        &self,
        email: Option<&str>,
        id: Uuid,
        patch: ShiftPatch,
    ) -> Result<Shift, ShiftsError> {
        self.service
            .update_shift(email, id, patch)
            .await
            .map_err(Into::into)
    }

    async fn delete_shift(&self, email: Option<&str>, id: Uuid) -> Result<Shift, ShiftsError> {
        self.service.delete_shift(email, id).await.map_err(Into::into)
    }

    async fn list_user_shifts(
        &self,
        email: Option<&str>,
        params: QueryParams,
    ) -> Result<UserShiftsSummary, ShiftsError> {
        self.service
            .list_user_shifts(email, params)
            .await
            .map_err(Into::into)
    }

    async fn list_all_shifts(
        &self,
        email: Option<&str>,
        params: QueryParams,
    ) -> Result<Page<Shift>, ShiftsError> {
        self.service
            .list_all_shifts(email, params)
            .await
            .map_err(Into::into)
    }
}
