use async_trait::async_trait;
use modkit_db::{Page, QueryParams};
use uuid::Uuid;

use crate::contract::{
    error::ShiftsError,
    model::{NewBulkShift, NewShift, Shift, ShiftPatch, UserShiftsSummary},
};

/// Public API of the shifts module. `email` is the caller's verified identity.
#[async_trait]
pub trait ShiftsApi: Send + Sync {
    async fn create_shift(&self, email: Option<&str>, new: NewShift) -> Result<Shift, ShiftsError>;

    async fn create_bulk_shifts(
        &self,
        email: Option<&str>,
        new: NewBulkShift,
    ) -> Result<Vec<Shift>, ShiftsError>;

    async fn update_shift(
        &self,
        email: Option<&str>,
        id: Uuid,
        patch: ShiftPatch,
    ) -> Result<Shift, ShiftsError>;

    async fn delete_shift(&self, email: Option<&str>, id: Uuid) -> Result<Shift, ShiftsError>;

    async fn list_user_shifts(
        &self,
        email: Option<&str>,
        params: QueryParams,
    ) -> Result<UserShiftsSummary, ShiftsError>;

    async fn list_all_shifts(
        &self,
        email: Option<&str>,
        params: QueryParams,
    ) -> Result<Page<Shift>, ShiftsError>;
}
