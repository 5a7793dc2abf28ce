use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::window::TimeRange;
use crate::errors::CoreError;

/// Shortest allowed poll period.
pub const MIN_POLL_INTERVAL_SECS: u64 = 30;
/// Longest allowed poll period.
pub const MAX_POLL_INTERVAL_SECS: u64 = 60;

/// Runtime configuration for the dashboard core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Analysis service base URLs, tried in order.
    pub service_urls: Vec<String>,

    /// History requested from `/analyze` (the `days` parameter).
    pub history_days: u32,

    /// Re-fetch period while a ticker is selected. Clamped to 30-60s.
    pub poll_interval_secs: u64,

    /// Bounded wait for a single fetch before it counts as failed.
    pub fetch_timeout_secs: u64,

    /// How long a fired alert stays displayed before it re-arms.
    pub alert_cooldown_secs: u64,

    /// Chart range selected at start-up.
    pub default_range: TimeRange,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_urls: vec!["http://127.0.0.1:8000".to_string()],
            history_days: 90,
            poll_interval_secs: MAX_POLL_INTERVAL_SECS,
            fetch_timeout_secs: 10,
            alert_cooldown_secs: 5,
            default_range: TimeRange::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults overridden by `STOCK_*` environment variables.
    pub fn from_env() -> Result<Self, CoreError> {
        let mut settings = Settings::default();
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply overrides from a key lookup (the environment in production).
    ///
    /// `STOCK_SERVICE_URL` may hold several comma-separated URLs.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(urls) = lookup("STOCK_SERVICE_URL") {
            self.service_urls = urls
                .split(',')
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect();
        }
        if let Some(days) = lookup("STOCK_HISTORY_DAYS") {
            self.history_days = parse_env("STOCK_HISTORY_DAYS", &days)?;
        }
        if let Some(secs) = lookup("STOCK_POLL_SECS") {
            self.poll_interval_secs = parse_env("STOCK_POLL_SECS", &secs)?;
        }
        if let Some(secs) = lookup("STOCK_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = parse_env("STOCK_FETCH_TIMEOUT_SECS", &secs)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.service_urls.is_empty() {
            return Err(CoreError::ValidationError(
                "At least one analysis service URL is required".into(),
            ));
        }
        if self.history_days == 0 {
            return Err(CoreError::ValidationError(
                "history_days must be greater than zero".into(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(CoreError::ValidationError(
                "fetch_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// The configured poll period, clamped into the supported cadence.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.poll_interval_secs
                .clamp(MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS),
        )
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn alert_cooldown(&self) -> chrono::Duration {
        chrono::Duration::from_std(Duration::from_secs(self.alert_cooldown_secs))
            .unwrap_or(chrono::Duration::MAX)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CoreError> {
    value.trim().parse().map_err(|_| {
        CoreError::ValidationError(format!("{key} has an invalid value: '{value}'"))
    })
}
