use chrono::NaiveDateTime;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::analytics::{PortfolioValuation, PositionValuation};
use crate::models::portfolio::{Portfolio, Position};
use crate::models::ticker::normalize_ticker;

/// Manages positions and values them against the latest prices.
///
/// Pure business logic: no I/O, no API calls. Prices come in as a
/// `ticker → latest price` map owned by the caller.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Add a position. The ticker must have a known current price.
    pub fn add_position(
        &self,
        portfolio: &mut Portfolio,
        ticker: &str,
        quantity: u32,
        buy_price: f64,
        latest_prices: &HashMap<String, f64>,
        opened_at: NaiveDateTime,
    ) -> Result<Uuid, CoreError> {
        let ticker = normalize_ticker(ticker)?;
        if quantity == 0 {
            return Err(CoreError::ValidationError(
                "Position quantity must be positive".into(),
            ));
        }
        if !buy_price.is_finite() || buy_price <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Buy price must be a positive number, got {buy_price}"
            )));
        }
        if !latest_prices.contains_key(&ticker) {
            return Err(CoreError::PriceNotAvailable(ticker));
        }

        let position = Position::new(ticker, quantity, buy_price, opened_at);
        let id = position.id;
        portfolio.positions.push(position);
        Ok(id)
    }

    /// Remove a position by its UUID, returning it.
    pub fn remove_position(&self, portfolio: &mut Portfolio, id: Uuid) -> Result<Position, CoreError> {
        let idx = portfolio
            .positions
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::PositionNotFound(id.to_string()))?;
        Ok(portfolio.positions.remove(idx))
    }

    /// Value every position against `latest_prices`.
    ///
    /// Positions without a price are reported with `latest_price: None`,
    /// contribute nothing to the totals and are listed in `unpriced`.
    pub fn valuation(
        &self,
        portfolio: &Portfolio,
        latest_prices: &HashMap<String, f64>,
    ) -> PortfolioValuation {
        let mut total_value = 0.0;
        let mut total_cost = 0.0;
        let mut unpriced: Vec<String> = Vec::new();

        let positions = portfolio
            .positions
            .iter()
            .map(|position| {
                let latest_price = latest_prices.get(&position.ticker).copied();
                let quantity = f64::from(position.quantity);

                let (current_value, gain_loss, return_pct) = match latest_price {
                    Some(price) => {
                        let value = quantity * price;
                        let gain = quantity * (price - position.buy_price);
                        total_value += value;
                        total_cost += position.cost_basis();
                        (value, gain, pct(gain, position.cost_basis()))
                    }
                    None => {
                        if !unpriced.contains(&position.ticker) {
                            unpriced.push(position.ticker.clone());
                        }
                        (0.0, 0.0, 0.0)
                    }
                };

                PositionValuation {
                    position: position.clone(),
                    latest_price,
                    current_value,
                    gain_loss,
                    return_pct,
                }
            })
            .collect();

        let total_gain_loss = total_value - total_cost;
        PortfolioValuation {
            total_value,
            total_cost,
            total_gain_loss,
            total_return_pct: pct(total_gain_loss, total_cost),
            positions,
            unpriced,
        }
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}

fn pct(gain: f64, cost: f64) -> f64 {
    if cost > 0.0 {
        gain / cost * 100.0
    } else {
        0.0
    }
}
