use serde::{Deserialize, Serialize};

use super::portfolio::Position;

/// Valuation of every position against the latest known prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    /// Σ quantity × latest price over priced positions
    pub total_value: f64,

    /// Σ quantity × buy price over priced positions
    pub total_cost: f64,

    /// total_value - total_cost
    pub total_gain_loss: f64,

    /// Percentage return: (total_gain_loss / total_cost) * 100
    pub total_return_pct: f64,

    /// Per-position breakdown, in insertion order
    pub positions: Vec<PositionValuation>,

    /// Tickers held for which no latest price was supplied
    pub unpriced: Vec<String>,
}

/// Valuation of a single position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionValuation {
    pub position: Position,

    /// `None` when no price is known for the ticker
    pub latest_price: Option<f64>,

    /// quantity × latest price (0 when unpriced)
    pub current_value: f64,

    /// quantity × (latest - buy price) (0 when unpriced)
    pub gain_loss: f64,

    /// Percentage return against the buy price
    pub return_pct: f64,
}

/// Metric-card figures for the selected ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummary {
    /// Live price from the quote endpoint, or the last close
    pub price: f64,

    /// price - last close
    pub change: f64,

    /// change / last close × 100
    pub change_pct: f64,

    pub volume: u64,
    pub rsi: f64,
    pub ma20: f64,
    pub ma50: f64,
    pub support: f64,
    pub resistance: f64,
    pub score: f64,
}
