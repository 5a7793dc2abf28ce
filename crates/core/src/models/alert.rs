use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Upward price alert for one ticker.
///
/// `triggered` goes true once when the close reaches the threshold and
/// falls back to false after the cool-down, re-arming the alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub ticker: String,
    pub threshold_price: f64,
    pub triggered: bool,

    /// When the alert last fired
    #[serde(default)]
    pub triggered_at: Option<NaiveDateTime>,
}

impl Alert {
    pub fn new(ticker: impl Into<String>, threshold_price: f64) -> Self {
        Self {
            ticker: ticker.into().to_uppercase(),
            threshold_price,
            triggered: false,
            triggered_at: None,
        }
    }
}

/// Emitted the moment an alert fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub ticker: String,
    pub threshold_price: f64,
    pub price: f64,
    pub at: NaiveDateTime,
}
