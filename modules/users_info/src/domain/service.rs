use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use chrono::Utc;
use modkit_db::errors::is_unique_violation;
use modkit_db::{LimitCfg, Page, QueryParams};
use regex::Regex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::{NewUser, Role, User};
use crate::domain::error::DomainError;
use crate::domain::password::hash_password_blocking;
use crate::domain::repo::UsersRepository;
use crate::domain::user_name::{derive_user_name, user_name_base};

/// Concurrent registrations can race for the same derived user name.
const USER_NAME_ATTEMPTS: u32 = 3;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Domain service with business rules for user identities.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub min_password_len: usize,
    pub max_password_len: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 1000,
            min_password_len: 6,
            max_password_len: 20,
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
}

/// Trimmed, lowercased email. Emails are compared in this form everywhere.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub fn validate_email(email: &str) -> Result<String, DomainError> {
    let email = normalize_email(email);
    if EMAIL_RE.is_match(&email) {
        Ok(email)
    } else {
        Err(DomainError::invalid_email(email))
    }
}

/// Length is checked on the trimmed password, which is also what gets hashed.
pub fn validate_password(password: &str, cfg: &ServiceConfig) -> Result<String, DomainError> {
    let trimmed = password.trim();
    let len = trimmed.chars().count();
    if len < cfg.min_password_len {
        return Err(DomainError::invalid_password(format!(
            "Password must be at least {} characters long",
            cfg.min_password_len
        )));
    }
    if len > cfg.max_password_len {
        return Err(DomainError::invalid_password(format!(
            "Password cannot be more than {} characters long",
            cfg.max_password_len
        )));
    }
    Ok(trimmed.to_string())
}

fn db_error(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

fn is_duplicate(e: &anyhow::Error) -> bool {
    e.downcast_ref::<sea_orm::DbErr>()
        .is_some_and(is_unique_violation)
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Validate, derive the user name and hash the password, then insert.
    #[instrument(name = "users_info.service.register", skip(self, new_user), fields(email = %new_user.email))]
    pub async fn register(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Registering new user");

        let email = validate_email(&new_user.email)?;
        let password = validate_password(&new_user.password, &self.config)?;

        if self.repo.email_exists(&email).await.map_err(db_error)? {
            return Err(DomainError::email_already_exists(email));
        }

        let password_hash = hash_password_blocking(password).await?;

        for attempt in 1..=USER_NAME_ATTEMPTS {
            let taken: HashSet<String> = self
                .repo
                .user_names_with_prefix(user_name_base(&email))
                .await
                .map_err(db_error)?
                .into_iter()
                .collect();

            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                email: email.clone(),
                user_name: derive_user_name(&email, &taken),
                role: Role::User,
                is_active: true,
                created_at: now,
                updated_at: now,
            };

            match self.repo.insert(&user, &password_hash).await {
                Ok(()) => {
                    info!(user_id = %user.id, user_name = %user.user_name, "User registered");
                    return Ok(user);
                }
                Err(e) if is_duplicate(&e) => {
                    if self.repo.email_exists(&email).await.map_err(db_error)? {
                        return Err(DomainError::email_already_exists(email));
                    }
                    debug!(attempt, user_name = %user.user_name, "user name taken concurrently");
                }
                Err(e) => return Err(db_error(e)),
            }
        }

        warn!("Gave up allocating a unique user name");
        Err(DomainError::database("could not allocate a unique user name"))
    }

    /// Map the caller's email to an existing, active user.
    #[instrument(name = "users_info.service.resolve_active", skip(self))]
    pub async fn resolve_active(&self, email: Option<&str>) -> Result<User, DomainError> {
        let email = email
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .ok_or(DomainError::MissingIdentity)?;

        let user = self
            .repo
            .find_by_email(&email)
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::user_not_found(&email))?;

        if !user.is_active {
            debug!(user_id = %user.id, "rejecting inactive user");
            return Err(DomainError::inactive(email));
        }
        Ok(user)
    }

    #[instrument(name = "users_info.service.get_profile", skip(self))]
    pub async fn get_profile(&self, email: &str) -> Result<User, DomainError> {
        debug!("Loading profile");
        self.resolve_active(Some(email)).await
    }

    #[instrument(name = "users_info.service.list_users", skip(self, params))]
    pub async fn list_users(&self, params: QueryParams) -> Result<Page<User>, DomainError> {
        debug!(?params, "Listing users");
        let page = self.repo.list_page(&params, self.config.limits()).await?;
        debug!(
            count = page.items.len(),
            total = page.page_info.total,
            "Listed users"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized_before_validation() {
        assert_eq!(validate_email("  Jane@Example.COM ").unwrap(), "jane@example.com");
        for bad in ["", "jane", "jane@", "@example.com", "ja ne@example.com", "jane@example"] {
            assert!(
                matches!(validate_email(bad), Err(DomainError::InvalidEmail { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn password_length_counts_trimmed_chars() {
        let cfg = ServiceConfig::default();
        assert_eq!(validate_password("  secret  ", &cfg).unwrap(), "secret");
        assert!(validate_password("  abc  ", &cfg).is_err());
        assert!(validate_password(&"x".repeat(21), &cfg).is_err());
        assert!(validate_password(&"x".repeat(20), &cfg).is_ok());
    }
}
