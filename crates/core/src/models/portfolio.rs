use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A holding entered by the user.
///
/// Positions are created explicitly and only re-valued afterwards;
/// the buy side is never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Unique identifier
    pub id: Uuid,

    /// Ticker symbol, uppercased
    pub ticker: String,

    /// Number of shares (always positive)
    pub quantity: u32,

    /// Price paid per share
    pub buy_price: f64,

    /// When the position was entered
    pub opened_at: NaiveDateTime,
}

impl Position {
    pub fn new(ticker: impl Into<String>, quantity: u32, buy_price: f64, opened_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: ticker.into().to_uppercase(),
            quantity,
            buy_price,
            opened_at,
        }
    }

    /// Amount paid for the whole position.
    pub fn cost_basis(&self) -> f64 {
        f64::from(self.quantity) * self.buy_price
    }
}

/// All positions held in the current session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub positions: Vec<Position>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Distinct tickers held, sorted.
    pub fn tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<&str> = self.positions.iter().map(|p| p.ticker.as_str()).collect();
        tickers.sort_unstable();
        tickers.dedup();
        tickers
    }
}
