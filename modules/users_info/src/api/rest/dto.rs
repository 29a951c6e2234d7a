use chrono::{DateTime, Utc};
use modkit::{FieldError, Violations};
use modkit_db::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{NewUser, User};
use crate::domain::service::{validate_email, validate_password, ServiceConfig};

/// REST DTO for user representation. Never exposes the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub user_name: String,
    /// One of `user`, `admin`, `super_admin`.
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterReq {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// One page of users.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListDto {
    pub users: Vec<UserDto>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            user_name: user.user_name,
            role: user.role.as_str().to_string(),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<Page<User>> for UserListDto {
    fn from(page: Page<User>) -> Self {
        Self {
            page: page.page_info.page,
            limit: page.page_info.limit,
            total: page.page_info.total,
            users: page.items.into_iter().map(UserDto::from).collect(),
        }
    }
}

impl RegisterReq {
    /// Check every field and report all failures at once.
    pub fn validate(&self, cfg: &ServiceConfig) -> Result<NewUser, Vec<FieldError>> {
        let mut v = Violations::new();

        let email = match self.email.as_deref() {
            Some(raw) => v.check("email", validate_email(raw)),
            None => {
                v.push("email", "Email is required");
                None
            }
        };
        let password = match self.password.as_deref() {
            Some(raw) => v.check("password", validate_password(raw, cfg)),
            None => {
                v.push("password", "Password is required");
                None
            }
        };

        match (email, password) {
            (Some(email), Some(password)) if v.is_empty() => Ok(NewUser { email, password }),
            _ => Err(v.into_errors()),
        }
    }
}
