//! Client configuration.

use anyhow::Context;
use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use tillbook_core::Settings;
use tillbook_observability::LogOptions;
use tillbook_reports::DEFAULT_CURRENCY;

/// Largest UTC offset accepted, in minutes (±18h).
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Label prefixed to formatted amounts.
    pub currency: String,
    /// Offset used to place sales and expenses in days and months for reports.
    pub utc_offset_minutes: i32,
    /// Cached values older than this count as stale. `None` disables expiry.
    pub cache_max_age_secs: Option<u64>,
    pub log_filter: String,
    pub log_json: bool,
    /// Shown in place of the ledger settings while no session exists.
    pub fallback_settings: Settings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            utc_offset_minutes: 0,
            cache_max_age_secs: None,
            log_filter: "info".to_string(),
            log_json: true,
            fallback_settings: Settings {
                owner_name: "Owner".to_string(),
                business_name: "My Business".to_string(),
                logo_url: String::new(),
            },
        }
    }
}

impl ClientConfig {
    /// Read `TILLBOOK_*` variables; missing or malformed values keep their
    /// defaults (with a warning for malformed ones).
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(currency) = lookup("TILLBOOK_CURRENCY") {
            let currency = currency.trim();
            if !currency.is_empty() {
                config.currency = currency.to_string();
            }
        }
        if let Some(raw) = lookup("TILLBOOK_UTC_OFFSET_MINUTES") {
            match raw.trim().parse::<i32>() {
                Ok(minutes) if minutes.abs() <= MAX_OFFSET_MINUTES => {
                    config.utc_offset_minutes = minutes;
                }
                _ => tracing::warn!(value = %raw, "ignoring invalid TILLBOOK_UTC_OFFSET_MINUTES"),
            }
        }
        if let Some(raw) = lookup("TILLBOOK_CACHE_MAX_AGE_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.cache_max_age_secs = Some(secs),
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid TILLBOOK_CACHE_MAX_AGE_SECS"),
            }
        }
        if let Some(filter) = lookup("TILLBOOK_LOG") {
            config.log_filter = filter;
        }
        if let Some(raw) = lookup("TILLBOOK_LOG_JSON") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.log_json = true,
                "0" | "false" | "no" => config.log_json = false,
                _ => tracing::warn!(value = %raw, "ignoring invalid TILLBOOK_LOG_JSON"),
            }
        }
        config
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("failed to parse client config")?;
        if config.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            anyhow::bail!(
                "utcOffsetMinutes {} is outside ±{MAX_OFFSET_MINUTES}",
                config.utc_offset_minutes
            );
        }
        Ok(config)
    }

    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn cache_max_age(&self) -> Option<Duration> {
        self.cache_max_age_secs
            .and_then(|secs| Duration::try_seconds(i64::try_from(secs).ok()?))
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            default_filter: self.log_filter.clone(),
            json: self.log_json,
        }
    }
}
