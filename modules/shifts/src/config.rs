use serde::{Deserialize, Serialize};

use crate::contract::ClockTime;
use crate::domain::service::ServiceConfig;

/// Configuration for the shifts module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShiftsConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Longest accepted break, `HH:MM`.
    #[serde(default = "default_max_break")]
    pub max_break: ClockTime,
    #[serde(default = "default_max_excluded_weekdays")]
    pub max_excluded_weekdays: usize,
}

impl Default for ShiftsConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_break: default_max_break(),
            max_excluded_weekdays: default_max_excluded_weekdays(),
        }
    }
}

fn default_page_size() -> u64 {
    50
}

fn default_max_page_size() -> u64 {
    1000
}

fn default_max_break() -> ClockTime {
    ClockTime::EIGHT_HOURS
}

fn default_max_excluded_weekdays() -> usize {
    6
}

impl From<&ShiftsConfig> for ServiceConfig {
    fn from(cfg: &ShiftsConfig) -> Self {
        Self {
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
            max_break: cfg.max_break,
            // Excluding all seven weekdays would leave nothing to schedule.
            max_excluded_weekdays: cfg.max_excluded_weekdays.min(6),
        }
    }
}
