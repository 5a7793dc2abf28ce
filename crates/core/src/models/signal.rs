use serde::{Deserialize, Serialize};

/// Aggregate decision derived from the trailing average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Buy,
    DoNotBuy,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Buy => write!(f, "BUY"),
            Decision::DoNotBuy => write!(f, "DO NOT BUY"),
        }
    }
}

/// Per-indicator narrative signal. Distinct from [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// The indicator family a rationale line speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
    Rsi,
    Bollinger,
    MovingAverages,
}

/// One line of the recommendation narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rationale {
    /// `None` only for the "no strong signals" fallback line
    pub indicator: Option<Indicator>,
    pub signal: Signal,
    pub message: String,
}

/// Aggregate decision plus the per-indicator narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub decision: Decision,

    /// Trailing score sum divided by the fixed window size
    pub average_score: f64,

    /// Rationale lines in fixed order: RSI, Bollinger, moving averages
    pub rationale: Vec<Rationale>,
}

/// Risk tier derived from ATR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityTier {
    Low,
    Medium,
    High,
}

impl VolatilityTier {
    /// Gauge fill (out of 100) used to weight the display.
    pub fn gauge(self) -> u8 {
        match self {
            VolatilityTier::Low => 25,
            VolatilityTier::Medium => 50,
            VolatilityTier::High => 85,
        }
    }
}

impl std::fmt::Display for VolatilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolatilityTier::Low => write!(f, "LOW"),
            VolatilityTier::Medium => write!(f, "MEDIUM"),
            VolatilityTier::High => write!(f, "HIGH"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volatility {
    pub atr: f64,
    pub tier: VolatilityTier,
    pub gauge: u8,
}
