use serde::{Deserialize, Serialize};

/// Configuration for the users_info module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersInfoConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
    #[serde(default = "default_max_password_len")]
    pub max_password_len: usize,
}

impl Default for UsersInfoConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            min_password_len: default_min_password_len(),
            max_password_len: default_max_password_len(),
        }
    }
}

fn default_page_size() -> u64 {
    50
}

fn default_max_page_size() -> u64 {
    1000
}

fn default_min_password_len() -> usize {
    6
}

fn default_max_password_len() -> usize {
    20
}

impl From<&UsersInfoConfig> for crate::domain::service::ServiceConfig {
    fn from(cfg: &UsersInfoConfig) -> Self {
        Self {
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
            min_password_len: cfg.min_password_len,
            max_password_len: cfg.max_password_len,
        }
    }
}
