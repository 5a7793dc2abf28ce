use crate::models::signal::{Volatility, VolatilityTier};

/// ATR above this is HIGH.
pub const HIGH_ATR: f64 = 5.0;
/// ATR above this (and not HIGH) is MEDIUM.
pub const MEDIUM_ATR: f64 = 2.0;

/// Maps ATR onto a display risk tier. Not used for decisions.
pub struct VolatilityService;

impl VolatilityService {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, atr: f64) -> Volatility {
        let tier = if atr > HIGH_ATR {
            VolatilityTier::High
        } else if atr > MEDIUM_ATR {
            VolatilityTier::Medium
        } else {
            VolatilityTier::Low
        };
        Volatility {
            atr,
            tier,
            gauge: tier.gauge(),
        }
    }
}

impl Default for VolatilityService {
    fn default() -> Self {
        Self::new()
    }
}
