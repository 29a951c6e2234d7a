use async_trait::async_trait;
use chrono::NaiveDate;
use modkit_db::{LimitCfg, Page, PageError, QueryParams};
use uuid::Uuid;

use crate::contract::Shift;
use crate::domain::overlap::Slot;

/// Count and sums over every shift matching a list query, ignoring pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftTotals {
    pub total_shifts: u64,
    pub total_break_mins: u64,
    pub total_working_mins: u64,
}

/// Port for the domain layer: persistence operations the domain needs.
#[async_trait]
pub trait ShiftsRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Shift>>;

    /// Slots of `user_id` on any of `dates`.
    async fn slots_on(&self, user_id: Uuid, dates: &[NaiveDate]) -> anyhow::Result<Vec<Slot>>;

    async fn insert(&self, shift: &Shift) -> anyhow::Result<()>;

    /// All-or-nothing: either every shift is stored or none is.
    async fn insert_many(&self, shifts: &[Shift]) -> anyhow::Result<()>;

    async fn update(&self, shift: &Shift) -> anyhow::Result<()>;

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// A page of `user_id`'s shifts and the totals over the same predicate.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &QueryParams,
        limits: LimitCfg,
    ) -> Result<(Page<Shift>, ShiftTotals), PageError>;

    async fn list_all(&self, params: &QueryParams, limits: LimitCfg)
        -> Result<Page<Shift>, PageError>;
}
