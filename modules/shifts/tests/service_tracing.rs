//! The service layer emits its spans and events through `tracing`.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use modkit_db::{LimitCfg, Page, PageError, PageInfo, QueryParams};
use parking_lot::Mutex;
use tracing_test::traced_test;
use uuid::Uuid;

use shifts::contract::{ClockTime, NewShift, Shift, ShiftPatch};
use shifts::domain::error::DomainError;
use shifts::domain::overlap::Slot;
use shifts::domain::ports::{IdentityResolver, Owner};
use shifts::domain::repo::{ShiftTotals, ShiftsRepository};
use shifts::domain::service::{Service, ServiceConfig};

#[derive(Default)]
struct MockShiftsRepository {
    shifts: Mutex<Vec<Shift>>,
}

#[async_trait::async_trait]
impl ShiftsRepository for MockShiftsRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Shift>> {
        Ok(self.shifts.lock().iter().find(|s| s.id == id).cloned())
    }

    async fn slots_on(&self, user_id: Uuid, dates: &[NaiveDate]) -> Result<Vec<Slot>> {
        Ok(self
            .shifts
            .lock()
            .iter()
            .filter(|s| s.user_id == user_id && dates.contains(&s.date.date_naive()))
            .map(|s| Slot {
                id: s.id,
                date: s.date.date_naive(),
                start: s.start_time,
                end: s.end_time,
            })
            .collect())
    }

    async fn insert(&self, shift: &Shift) -> Result<()> {
        self.shifts.lock().push(shift.clone());
        Ok(())
    }

    async fn insert_many(&self, shifts: &[Shift]) -> Result<()> {
        self.shifts.lock().extend_from_slice(shifts);
        Ok(())
    }

    async fn update(&self, shift: &Shift) -> Result<()> {
        let mut all = self.shifts.lock();
        if let Some(slot) = all.iter_mut().find(|s| s.id == shift.id) {
            *slot = shift.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut all = self.shifts.lock();
        let before = all.len();
        all.retain(|s| s.id != id);
        Ok(all.len() < before)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        _params: &QueryParams,
        limits: LimitCfg,
    ) -> std::result::Result<(Page<Shift>, ShiftTotals), PageError> {
        let items: Vec<Shift> = self
            .shifts
            .lock()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        let totals = ShiftTotals {
            total_shifts: items.len() as u64,
            total_break_mins: items.iter().map(|s| u64::from(s.break_mins)).sum(),
            total_working_mins: items.iter().map(|s| u64::from(s.working_mins)).sum(),
        };
        let page = Page {
            page_info: PageInfo {
                page: 1,
                limit: limits.default,
                total: items.len() as u64,
            },
            items,
        };
        Ok((page, totals))
    }

    async fn list_all(
        &self,
        _params: &QueryParams,
        limits: LimitCfg,
    ) -> std::result::Result<Page<Shift>, PageError> {
        let items = self.shifts.lock().clone();
        let total = items.len() as u64;
        Ok(Page {
            items,
            page_info: PageInfo {
                page: 1,
                limit: limits.default,
                total,
            },
        })
    }
}

/// Resolves one fixed caller; anything else is unauthenticated.
struct FixedIdentity(Owner);

#[async_trait::async_trait]
impl IdentityResolver for FixedIdentity {
    async fn resolve(&self, email: Option<&str>) -> std::result::Result<Owner, DomainError> {
        match email {
            Some(e) if e == self.0.email => Ok(self.0.clone()),
            _ => Err(DomainError::unauthenticated("Please provide a valid email!")),
        }
    }
}

const EMAIL: &str = "jane@example.com";

fn service(is_admin: bool) -> Service {
    let owner = Owner {
        id: Uuid::new_v4(),
        email: EMAIL.to_string(),
        is_admin,
    };
    Service::new(
        Arc::new(MockShiftsRepository::default()),
        Arc::new(FixedIdentity(owner)),
        ServiceConfig::default(),
    )
}

fn shift(date: &str, start: &str, end: &str) -> NewShift {
    NewShift {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        start_time: ClockTime::parse(start).unwrap(),
        end_time: ClockTime::parse(end).unwrap(),
        break_hours: None,
    }
}

#[traced_test]
#[tokio::test]
async fn create_shift_emits_spans() {
    let svc = service(false);

    let created = svc
        .create_shift(Some(EMAIL), shift("2024-01-06", "09:00", "17:00"))
        .await
        .unwrap();

    assert_eq!(created.working_mins, 480);
    assert!(logs_contain("shifts.service.create_shift"));
    assert!(logs_contain("Shift created"));
}

#[traced_test]
#[tokio::test]
async fn update_and_delete_emit_spans() {
    let svc = service(false);
    let created = svc
        .create_shift(Some(EMAIL), shift("2024-01-06", "09:00", "17:00"))
        .await
        .unwrap();

    let updated = svc
        .update_shift(
            Some(EMAIL),
            created.id,
            ShiftPatch {
                break_hours: Some(ClockTime::parse("00:45").unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.working_mins, 435);
    assert!(logs_contain("shifts.service.update_shift"));
    assert!(logs_contain("Shift updated"));

    svc.delete_shift(Some(EMAIL), created.id).await.unwrap();
    assert!(logs_contain("shifts.service.delete_shift"));
    assert!(logs_contain("Shift deleted"));
}

#[traced_test]
#[tokio::test]
async fn admin_listing_logs_rejection() {
    let svc = service(false);

    let err = svc
        .list_all_shifts(Some(EMAIL), QueryParams::new())
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::Forbidden { id: None });
    assert!(logs_contain("shifts.service.list_all_shifts"));
    assert!(logs_contain("non-admin asked for every shift"));
}

#[traced_test]
#[tokio::test]
async fn user_listing_reports_totals() {
    let svc = service(true);
    for date in ["2024-01-01", "2024-01-02"] {
        svc.create_shift(Some(EMAIL), shift(date, "08:00", "20:00"))
            .await
            .unwrap();
    }

    let summary = svc
        .list_user_shifts(Some(EMAIL), QueryParams::new())
        .await
        .unwrap();

    assert_eq!(summary.total_working_hours, "24:00");
    assert!(logs_contain("shifts.service.list_user_shifts"));
    assert!(logs_contain("Listed caller shifts"));
}
