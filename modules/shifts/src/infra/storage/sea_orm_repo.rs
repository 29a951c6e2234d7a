//! SeaORM-backed implementation of the shifts repository port.

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use modkit_db::{FieldMap, LimitCfg, Page, PageError, QueryBuilder, QueryParams, Sum};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use crate::contract::Shift;
use crate::domain::date_range::day_start;
use crate::domain::overlap::Slot;
use crate::domain::repo::{ShiftTotals, ShiftsRepository};
use crate::infra::storage::entity::{self, ActiveModel as ShiftAM, Column, Entity as ShiftEntity};

/// Rows per `INSERT`; each row binds 11 parameters.
const INSERT_CHUNK: usize = 64;
/// Dates per `IN (...)` lookup.
const LOOKUP_CHUNK: usize = 500;

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    total_break_mins: i64,
    total_working_mins: i64,
}

pub struct SeaOrmShiftsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
    fields: FieldMap<ShiftEntity>,
}

impl<C> SeaOrmShiftsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            fields: entity::list_fields(),
        }
    }
}

fn into_shifts(page: Page<entity::Model>) -> Result<Page<Shift>, DbErr> {
    let items = page
        .items
        .into_iter()
        .map(Shift::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page {
        items,
        page_info: page.page_info,
    })
}

#[async_trait]
impl<C> ShiftsRepository for SeaOrmShiftsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Shift>> {
        let found = ShiftEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Shift::try_from).transpose()?)
    }

    async fn slots_on(&self, user_id: Uuid, dates: &[NaiveDate]) -> anyhow::Result<Vec<Slot>> {
        let mut slots = Vec::new();
        for chunk in dates.chunks(LOOKUP_CHUNK) {
            let rows = ShiftEntity::find()
                .filter(Column::UserId.eq(user_id))
                .filter(Column::Date.is_in(chunk.iter().copied().map(day_start)))
                .all(&self.conn)
                .await
                .context("slots_on failed")?;
            for row in rows {
                slots.push(Slot::try_from(row)?);
            }
        }
        Ok(slots)
    }

    async fn insert(&self, shift: &Shift) -> anyhow::Result<()> {
        ShiftAM::from(shift)
            .insert(&self.conn)
            .await
            .context("insert failed")?;
        Ok(())
    }

    async fn insert_many(&self, shifts: &[Shift]) -> anyhow::Result<()> {
        if shifts.is_empty() {
            return Ok(());
        }
        // Chunks share one transaction so the batch stays all-or-nothing.
        let txn = self.conn.begin().await.context("begin failed")?;
        for chunk in shifts.chunks(INSERT_CHUNK) {
            let inserted = ShiftEntity::insert_many(chunk.iter().map(ShiftAM::from))
                .exec(&txn)
                .await;
            if let Err(e) = inserted {
                txn.rollback().await.context("rollback failed")?;
                return Err(e).context("insert_many failed");
            }
        }
        txn.commit().await.context("commit failed")?;
        Ok(())
    }

    async fn update(&self, shift: &Shift) -> anyhow::Result<()> {
        ShiftAM::from(shift)
            .update(&self.conn)
            .await
            .context("update failed")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = ShiftEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &QueryParams,
        limits: LimitCfg,
    ) -> Result<(Page<Shift>, ShiftTotals), PageError> {
        let query = QueryBuilder::new(&self.fields, params)
            .scope(Condition::all().add(Column::UserId.eq(user_id)))
            .filter()?
            .sort()?
            .paginate(limits)?;

        let page = into_shifts(query.page(&self.conn).await?)?;
        let sums: TotalsRow = query
            .aggregate(
                &self.conn,
                &[
                    Sum::of(Column::BreakMins, "total_break_mins"),
                    Sum::of(Column::WorkingMins, "total_working_mins"),
                ],
            )
            .await?;

        let totals = ShiftTotals {
            total_shifts: page.page_info.total,
            total_break_mins: sums.total_break_mins.max(0) as u64,
            total_working_mins: sums.total_working_mins.max(0) as u64,
        };
        Ok((page, totals))
    }

    async fn list_all(
        &self,
        params: &QueryParams,
        limits: LimitCfg,
    ) -> Result<Page<Shift>, PageError> {
        let page = QueryBuilder::new(&self.fields, params)
            .filter()?
            .sort()?
            .paginate(limits)?
            .page(&self.conn)
            .await?;
        Ok(into_shifts(page)?)
    }
}
