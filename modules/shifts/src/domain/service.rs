use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use modkit_db::errors::{is_unique_violation, parse_duplicate_key};
use modkit_db::{LimitCfg, Page, QueryParams};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::{NewBulkShift, NewShift, Shift, ShiftPatch, UserShiftsSummary};
use crate::domain::clock::{format_total_hours, ClockTime};
use crate::domain::date_range::{day_start, expand};
use crate::domain::duration::{self, Durations};
use crate::domain::error::DomainError;
use crate::domain::overlap;
use crate::domain::ports::{IdentityResolver, Owner};
use crate::domain::repo::ShiftsRepository;

/// Domain service for shift scheduling.
/// Depends only on ports; the pure core modules do the arithmetic.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn ShiftsRepository>,
    identity: Arc<dyn IdentityResolver>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    /// Longest accepted break.
    pub max_break: ClockTime,
    pub max_excluded_weekdays: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 1000,
            max_break: ClockTime::EIGHT_HOURS,
            max_excluded_weekdays: 6,
        }
    }
}

impl ServiceConfig {
    pub fn limits(&self) -> LimitCfg {
        LimitCfg {
            default: self.default_page_size,
            max: self.max_page_size,
        }
    }

    pub fn check_break(&self, break_hours: ClockTime) -> Result<ClockTime, DomainError> {
        if break_hours > self.max_break {
            return Err(DomainError::validation(
                "shift.break_hours",
                format!("Break-time cannot be more than {} hours ({})", self.max_break.minutes() / 60, self.max_break),
            ));
        }
        Ok(break_hours)
    }

    /// Unique weekdays, no more than the configured maximum.
    pub fn check_weekends(&self, weekends: &[Weekday]) -> Result<HashSet<Weekday>, DomainError> {
        let set: HashSet<Weekday> = weekends.iter().copied().collect();
        if set.len() != weekends.len() {
            return Err(DomainError::validation("shift.weekends", "Weekends must be unique!"));
        }
        if set.len() > self.max_excluded_weekdays {
            return Err(DomainError::validation(
                "shift.weekends",
                format!("Weekends cannot be more than {} days!", self.max_excluded_weekdays),
            ));
        }
        Ok(set)
    }
}

/// Map a repository failure: unique violations become `Duplicate` through the
/// duplicate-key adapter, anything else is a database error.
pub fn storage_error(e: anyhow::Error) -> DomainError {
    match e.downcast_ref::<sea_orm::DbErr>() {
        Some(db) if is_unique_violation(db) => {
            let key = parse_duplicate_key(&db.to_string());
            DomainError::Duplicate {
                path: key.path(),
                message: key.message(),
            }
        }
        _ => DomainError::database(format!("{e:#}")),
    }
}

fn build_shift(owner: &Owner, date: NaiveDate, start: ClockTime, end: ClockTime, d: Durations) -> Shift {
    let now = Utc::now();
    Shift {
        id: Uuid::new_v4(),
        user_id: owner.id,
        date: day_start(date),
        start_time: start,
        end_time: end,
        break_hours: d.break_hours,
        break_mins: d.break_mins,
        working_hours: d.working_hours,
        working_mins: d.working_mins,
        created_at: now,
        updated_at: now,
    }
}

impl Service {
    pub fn new(
        repo: Arc<dyn ShiftsRepository>,
        identity: Arc<dyn IdentityResolver>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            identity,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn owned_shift(&self, owner: &Owner, id: Uuid) -> Result<Shift, DomainError> {
        let shift = self
            .repo
            .find_by_id(id)
            .await
            .map_err(storage_error)?
            .ok_or(DomainError::ShiftNotFound { id })?;
        if shift.user_id != owner.id {
            warn!(shift_id = %id, owner = %owner.id, "caller does not own the shift");
            return Err(DomainError::Forbidden { id: Some(id) });
        }
        Ok(shift)
    }

    #[instrument(name = "shifts.service.create_shift", skip(self, new), fields(date = %new.date))]
    pub async fn create_shift(&self, email: Option<&str>, new: NewShift) -> Result<Shift, DomainError> {
        info!("Creating shift");
        let owner = self.identity.resolve(email).await?;

        let break_hours = new.break_hours.map(|b| self.config.check_break(b)).transpose()?;
        let durations = duration::compute(new.start_time, new.end_time, break_hours, None)?;

        let existing = self
            .repo
            .slots_on(owner.id, &[new.date])
            .await
            .map_err(storage_error)?;
        overlap::check(&existing, new.date, new.start_time, new.end_time, None)?;

        let shift = build_shift(&owner, new.date, new.start_time, new.end_time, durations);
        self.repo.insert(&shift).await.map_err(storage_error)?;

        info!(shift_id = %shift.id, working_mins = shift.working_mins, "Shift created");
        Ok(shift)
    }

    #[instrument(
        name = "shifts.service.create_bulk_shifts",
        skip(self, new),
        fields(from = %new.from, to = %new.to)
    )]
    pub async fn create_bulk_shifts(
        &self,
        email: Option<&str>,
        new: NewBulkShift,
    ) -> Result<Vec<Shift>, DomainError> {
        info!("Creating shifts for a date range");
        let owner = self.identity.resolve(email).await?;

        let break_hours = new.break_hours.map(|b| self.config.check_break(b)).transpose()?;
        let excluded = self.config.check_weekends(&new.weekends)?;
        let durations = duration::compute(new.start_time, new.end_time, break_hours, None)?;

        let dates = expand(new.from, new.to, &excluded)?;
        if dates.is_empty() {
            return Err(DomainError::validation(
                "shift.weekends",
                "No dates left in the range after excluding weekends!",
            ));
        }
        debug!(dates = dates.len(), "expanded date range");

        let existing = self
            .repo
            .slots_on(owner.id, &dates)
            .await
            .map_err(storage_error)?;
        overlap::check_dates(&existing, &dates, new.start_time, new.end_time)?;

        let shifts: Vec<Shift> = dates
            .iter()
            .map(|date| build_shift(&owner, *date, new.start_time, new.end_time, durations))
            .collect();
        self.repo.insert_many(&shifts).await.map_err(storage_error)?;

        info!(count = shifts.len(), "Shifts created");
        Ok(shifts)
    }

    #[instrument(name = "shifts.service.update_shift", skip(self, patch), fields(shift_id = %id))]
    pub async fn update_shift(
        &self,
        email: Option<&str>,
        id: Uuid,
        patch: ShiftPatch,
    ) -> Result<Shift, DomainError> {
        info!("Updating shift");
        let owner = self.identity.resolve(email).await?;
        let stored = self.owned_shift(&owner, id).await?;

        let date = patch.date.unwrap_or_else(|| stored.date.date_naive());
        let start = patch.start_time.unwrap_or(stored.start_time);
        let end = patch.end_time.unwrap_or(stored.end_time);
        let break_hours = patch.break_hours.map(|b| self.config.check_break(b)).transpose()?;
        let durations = duration::compute(start, end, break_hours, Some(stored.break_hours))?;

        let existing = self
            .repo
            .slots_on(owner.id, &[date])
            .await
            .map_err(storage_error)?;
        overlap::check(&existing, date, start, end, Some(id))?;

        let updated = Shift {
            date: day_start(date),
            start_time: start,
            end_time: end,
            break_hours: durations.break_hours,
            break_mins: durations.break_mins,
            working_hours: durations.working_hours,
            working_mins: durations.working_mins,
            updated_at: Utc::now(),
            ..stored
        };
        self.repo.update(&updated).await.map_err(storage_error)?;

        info!(weekday = %date.weekday(), "Shift updated");
        Ok(updated)
    }

    #[instrument(name = "shifts.service.delete_shift", skip(self), fields(shift_id = %id))]
    pub async fn delete_shift(&self, email: Option<&str>, id: Uuid) -> Result<Shift, DomainError> {
        info!("Deleting shift");
        let owner = self.identity.resolve(email).await?;
        let stored = self.owned_shift(&owner, id).await?;

        if !self.repo.delete(id).await.map_err(storage_error)? {
            // Removed concurrently between the lookup and the delete.
            return Err(DomainError::ShiftNotFound { id });
        }
        info!("Shift deleted");
        Ok(stored)
    }

    #[instrument(name = "shifts.service.list_user_shifts", skip(self, params))]
    pub async fn list_user_shifts(
        &self,
        email: Option<&str>,
        params: QueryParams,
    ) -> Result<UserShiftsSummary, DomainError> {
        debug!(?params, "Listing caller shifts");
        let owner = self.identity.resolve(email).await?;

        let (page, totals) = self
            .repo
            .list_for_user(owner.id, &params, self.config.limits())
            .await?;

        debug!(
            count = page.items.len(),
            total = totals.total_shifts,
            "Listed caller shifts"
        );
        Ok(UserShiftsSummary {
            total_shifts: totals.total_shifts,
            total_break_mins: totals.total_break_mins,
            total_break_hours: format_total_hours(totals.total_break_mins),
            total_working_mins: totals.total_working_mins,
            total_working_hours: format_total_hours(totals.total_working_mins),
            shifts: page.items,
            page: page.page_info,
        })
    }

    #[instrument(name = "shifts.service.list_all_shifts", skip(self, params))]
    pub async fn list_all_shifts(
        &self,
        email: Option<&str>,
        params: QueryParams,
    ) -> Result<Page<Shift>, DomainError> {
        let owner = self.identity.resolve(email).await?;
        if !owner.is_admin {
            warn!(owner = %owner.id, "non-admin asked for every shift");
            return Err(DomainError::Forbidden { id: None });
        }

        let page = self.repo.list_all(&params, self.config.limits()).await?;
        debug!(count = page.items.len(), total = page.page_info.total, "Listed all shifts");
        Ok(page)
    }
}
