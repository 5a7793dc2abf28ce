use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::analytics::QuoteSummary;
use super::signal::{Recommendation, Volatility};
use super::window::{ChangePoint, RsiPoint, TimeRange};

// ── Analysis service wire types ─────────────────────────────────────

/// `GET /latest?ticker=<SYM>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestQuote {
    pub latest_price: f64,

    /// Service-side timestamp, passed through as received
    #[serde(default)]
    pub latest_time: Option<String>,
}

/// `GET /analyze?ticker=<SYM>&days=<N>`
///
/// `data` is kept loosely typed; it is normalized by the series validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub ticker: Option<String>,

    #[serde(default)]
    pub data: Vec<serde_json::Value>,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub accuracy: Option<f64>,

    #[serde(default, alias = "predicted_price")]
    pub prediction: Option<f64>,

    #[serde(default)]
    pub trade_action: Option<String>,

    #[serde(default)]
    pub sentiment: Option<f64>,

    #[serde(default)]
    pub mse: Option<f64>,

    /// Highest-scoring recent bars, as reported
    #[serde(default)]
    pub top_signals: Vec<serde_json::Value>,

    /// Trailing backtest entries, as reported
    #[serde(default)]
    pub backtest: Vec<serde_json::Value>,

    /// Broker confirmation attached when the model proposed a trade
    #[serde(default)]
    pub trade_status: Option<String>,
}

impl AnalysisResponse {
    /// The service-reported error, if the `error` field is non-empty.
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|msg| !msg.is_empty())
    }
}

/// Both endpoint payloads for one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedAnalysis {
    pub quote: LatestQuote,
    pub response: AnalysisResponse,
}

// ── Derived state ───────────────────────────────────────────────────

/// Model outputs reported by the service, carried without local computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOutlook {
    pub accuracy: Option<f64>,
    pub prediction: Option<f64>,
    pub trade_action: Option<String>,
    pub sentiment: Option<f64>,
    pub mse: Option<f64>,
    pub top_signals: Vec<serde_json::Value>,
    pub backtest: Vec<serde_json::Value>,
    pub trade_status: Option<String>,
}

impl From<&AnalysisResponse> for ModelOutlook {
    fn from(resp: &AnalysisResponse) -> Self {
        Self {
            accuracy: resp.accuracy,
            prediction: resp.prediction,
            trade_action: resp.trade_action.clone(),
            sentiment: resp.sentiment,
            mse: resp.mse,
            top_signals: resp.top_signals.clone(),
            backtest: resp.backtest.clone(),
            trade_status: resp.trade_status.clone(),
        }
    }
}

/// Everything the dashboard renders for the selected ticker, re-derived
/// each time a fresh series is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub ticker: String,

    /// Generation of the fetch this snapshot was derived from
    pub generation: u64,

    pub applied_at: NaiveDateTime,

    /// Number of valid records in the underlying series
    pub record_count: usize,

    pub summary: QuoteSummary,

    /// Range the chart was derived for
    pub range: TimeRange,
    pub chart: Vec<ChangePoint>,

    pub rsi_trail: Vec<RsiPoint>,
    pub recommendation: Recommendation,
    pub volatility: Volatility,
    pub outlook: ModelOutlook,
}
