use chrono::{Duration, NaiveDateTime};

use crate::errors::CoreError;
use crate::models::alert::{Alert, AlertEvent};
use crate::models::ticker::normalize_ticker;

/// Arms and evaluates upward price alerts.
///
/// An alert fires once when the close reaches its threshold, stays
/// `triggered` for the cool-down, then re-arms and may fire again.
pub struct AlertService {
    cooldown: Duration,
}

impl AlertService {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Build an alert for `ticker`. The threshold must lie strictly above
    /// the current price: an alert describes a breach that has not happened.
    pub fn create(
        &self,
        ticker: &str,
        threshold_price: f64,
        current_price: Option<f64>,
    ) -> Result<Alert, CoreError> {
        let ticker = normalize_ticker(ticker)?;
        if !threshold_price.is_finite() || threshold_price <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Alert threshold must be a positive number, got {threshold_price}"
            )));
        }
        let current = current_price.ok_or_else(|| CoreError::PriceNotAvailable(ticker.clone()))?;
        if threshold_price <= current {
            return Err(CoreError::ValidationError(format!(
                "Alert threshold {threshold_price:.2} must be above the current price {current:.2}"
            )));
        }
        Ok(Alert::new(ticker, threshold_price))
    }

    /// Clear `triggered` once the cool-down has elapsed.
    /// Returns true when this call re-armed the alert.
    ///
    /// A `now` earlier than the firing time (clock stepped back) counts
    /// as elapsed.
    pub fn expire(&self, alert: &mut Alert, now: NaiveDateTime) -> bool {
        let elapsed = alert
            .triggered_at
            .map_or(true, |fired| now < fired || now - fired >= self.cooldown);
        if alert.triggered && elapsed {
            alert.triggered = false;
            return true;
        }
        false
    }

    /// Compare `latest_close` to the threshold. Fires at most once per
    /// cool-down window.
    pub fn evaluate(&self, alert: &mut Alert, latest_close: f64, now: NaiveDateTime) -> Option<AlertEvent> {
        self.expire(alert, now);
        if alert.triggered || latest_close < alert.threshold_price {
            return None;
        }

        alert.triggered = true;
        alert.triggered_at = Some(now);
        Some(AlertEvent {
            ticker: alert.ticker.clone(),
            threshold_price: alert.threshold_price,
            price: latest_close,
            at: now,
        })
    }
}
