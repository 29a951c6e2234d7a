//! The service layer emits its spans and events through `tracing`.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use modkit_db::{LimitCfg, Page, PageError, PageInfo, QueryParams};
use parking_lot::Mutex;
use tracing_test::traced_test;
use uuid::Uuid;

use users_info::contract::model::{NewUser, Role, User};
use users_info::domain::repo::UsersRepository;
use users_info::domain::service::{Service, ServiceConfig};

#[derive(Default)]
struct MockUsersRepository {
    users: Mutex<Vec<User>>,
}

impl MockUsersRepository {
    fn with_user(email: &str, is_active: bool) -> Self {
        let now = Utc::now();
        let repo = Self::default();
        repo.users.lock().push(User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            user_name: email.split('@').next().unwrap_or(email).to_string(),
            role: Role::User,
            is_active,
            created_at: now,
            updated_at: now,
        });
        repo
    }
}

#[async_trait::async_trait]
impl UsersRepository for MockUsersRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.lock().iter().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.users.lock().iter().any(|u| u.email == email))
    }

    async fn user_names_with_prefix(&self, base: &str) -> Result<Vec<String>> {
        Ok(self
            .users
            .lock()
            .iter()
            .filter(|u| u.user_name.starts_with(base))
            .map(|u| u.user_name.clone())
            .collect())
    }

    async fn insert(&self, user: &User, _password_hash: &str) -> Result<()> {
        self.users.lock().push(user.clone());
        Ok(())
    }

    async fn list_page(
        &self,
        _params: &QueryParams,
        limits: LimitCfg,
    ) -> std::result::Result<Page<User>, PageError> {
        let items = self.users.lock().clone();
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

fn service(repo: MockUsersRepository) -> Service {
    Service::new(Arc::new(repo), ServiceConfig::default())
}

#[traced_test]
#[tokio::test]
async fn register_emits_spans() {
    let svc = service(MockUsersRepository::with_user("jane@example.com", true));

    let user = svc
        .register(NewUser {
            email: "jane@other.io".to_string(),
            password: "secret123".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(user.user_name, "jane1");
    assert!(logs_contain("users_info.service.register"));
    assert!(logs_contain("User registered"));
}

#[traced_test]
#[tokio::test]
async fn resolve_active_logs_inactive_rejection() {
    let svc = service(MockUsersRepository::with_user("idle@example.com", false));

    let result = svc.resolve_active(Some("idle@example.com")).await;

    assert!(result.is_err());
    assert!(logs_contain("users_info.service.resolve_active"));
    assert!(logs_contain("rejecting inactive user"));
}

#[traced_test]
#[tokio::test]
async fn list_users_emits_spans() {
    let svc = service(MockUsersRepository::with_user("jane@example.com", true));

    let page = svc.list_users(QueryParams::new()).await.unwrap();

    assert_eq!(page.page_info.total, 1);
    assert!(logs_contain("users_info.service.list_users"));
    assert!(logs_contain("Listed users"));
}
