use crate::models::record::{DailyRecord, Series};
use crate::models::signal::{Decision, Indicator, Rationale, Recommendation, Signal};

/// Trailing records averaged for the aggregate decision.
pub const SCORE_WINDOW: usize = 5;
/// Average score at or above which the decision is BUY.
pub const BUY_SCORE_THRESHOLD: f64 = 3.0;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

pub const NO_SIGNAL_MESSAGE: &str = "No strong signals detected";

/// Turns the latest indicators into a decision and a rationale.
///
/// Two independent outputs:
/// - the aggregate [`Decision`] from the trailing average score
/// - one [`Rationale`] line per indicator family (RSI, Bollinger, MAs)
pub struct RecommendationService;

impl RecommendationService {
    pub fn new() -> Self {
        Self
    }

    pub fn recommend(&self, series: &Series) -> Recommendation {
        let average_score = self.average_score(series.last_n(SCORE_WINDOW));
        Recommendation {
            decision: Self::decide(average_score),
            average_score,
            rationale: self.rationale(series.latest()),
        }
    }

    /// Sum of the trailing scores divided by [`SCORE_WINDOW`].
    ///
    /// The divisor stays fixed even when fewer records exist: two records
    /// scoring 5 average to 2.0, not 5.0.
    pub fn average_score(&self, trailing: &[DailyRecord]) -> f64 {
        let start = trailing.len().saturating_sub(SCORE_WINDOW);
        let sum: f64 = trailing[start..].iter().map(|r| r.score).sum();
        sum / SCORE_WINDOW as f64
    }

    pub fn decide(average_score: f64) -> Decision {
        if average_score >= BUY_SCORE_THRESHOLD {
            Decision::Buy
        } else {
            Decision::DoNotBuy
        }
    }

    /// Rationale lines in fixed order. Without a record, a single
    /// "no strong signals" line.
    pub fn rationale(&self, latest: Option<&DailyRecord>) -> Vec<Rationale> {
        match latest {
            Some(r) => vec![Self::rsi_rule(r), Self::bollinger_rule(r), Self::moving_average_rule(r)],
            None => vec![Rationale {
                indicator: None,
                signal: Signal::Hold,
                message: NO_SIGNAL_MESSAGE.to_string(),
            }],
        }
    }

    fn rsi_rule(r: &DailyRecord) -> Rationale {
        let (signal, message) = if r.rsi > RSI_OVERBOUGHT {
            (Signal::Sell, format!("RSI {:.1} is overbought, consider SELL", r.rsi))
        } else if r.rsi < RSI_OVERSOLD {
            (Signal::Buy, format!("RSI {:.1} is oversold, consider BUY", r.rsi))
        } else {
            (Signal::Hold, format!("RSI {:.1} is neutral", r.rsi))
        };
        Rationale {
            indicator: Some(Indicator::Rsi),
            signal,
            message,
        }
    }

    fn bollinger_rule(r: &DailyRecord) -> Rationale {
        let (signal, message) = if r.close > r.bollinger_upper {
            (Signal::Sell, "Price above upper Bollinger Band, SELL signal")
        } else if r.close < r.bollinger_lower {
            (Signal::Buy, "Price below lower Bollinger Band, BUY signal")
        } else {
            (Signal::Hold, "Price within Bollinger Bands, HOLD")
        };
        Rationale {
            indicator: Some(Indicator::Bollinger),
            signal,
            message: message.to_string(),
        }
    }

    fn moving_average_rule(r: &DailyRecord) -> Rationale {
        let (signal, message) = if r.ma20 > r.ma50 && r.close > r.ma20 {
            (Signal::Buy, "MA20 above MA50 with price above MA20, BUY signal")
        } else if r.ma20 < r.ma50 && r.close < r.ma20 {
            (Signal::Sell, "MA20 below MA50 with price below MA20, SELL signal")
        } else {
            (Signal::Hold, "Moving averages mixed, HOLD")
        };
        Rationale {
            indicator: Some(Indicator::MovingAverages),
            signal,
            message: message.to_string(),
        }
    }
}

impl Default for RecommendationService {
    fn default() -> Self {
        Self::new()
    }
}
