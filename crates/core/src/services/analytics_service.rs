use chrono::NaiveDateTime;

use crate::models::analysis::{AnalysisSnapshot, LatestQuote, ModelOutlook};
use crate::models::analytics::QuoteSummary;
use crate::models::record::Series;
use crate::models::window::{ChangePoint, TimeRange};
use crate::services::change_service::ChangeService;
use crate::services::recommendation_service::RecommendationService;
use crate::services::volatility_service::VolatilityService;
use crate::services::window_service::WindowService;

/// Records shown in the RSI strip.
pub const RSI_TRAIL_LEN: usize = 5;

/// Derives everything the dashboard renders from one validated series.
///
/// Chains the pure services: window → change decomposition for the chart,
/// recommendation and volatility from the latest record, plus the
/// metric-card summary against the live quote.
pub struct AnalyticsService {
    window_service: WindowService,
    change_service: ChangeService,
    recommendation_service: RecommendationService,
    volatility_service: VolatilityService,
}

impl AnalyticsService {
    pub fn new() -> Self {
        Self {
            window_service: WindowService::new(),
            change_service: ChangeService::new(),
            recommendation_service: RecommendationService::new(),
            volatility_service: VolatilityService::new(),
        }
    }

    /// Build a full snapshot. `outlook` is passed through untouched.
    pub fn derive_snapshot(
        &self,
        series: &Series,
        quote: Option<&LatestQuote>,
        outlook: ModelOutlook,
        range: TimeRange,
        generation: u64,
        now: NaiveDateTime,
    ) -> AnalysisSnapshot {
        let atr = series.latest().map_or(0.0, |r| r.atr);
        AnalysisSnapshot {
            ticker: series.ticker().to_string(),
            generation,
            applied_at: now,
            record_count: series.len(),
            summary: self.summarize(series, quote),
            range,
            chart: self.chart(series, range, now),
            rsi_trail: self.window_service.rsi_trail(series, RSI_TRAIL_LEN),
            recommendation: self.recommendation_service.recommend(series),
            volatility: self.volatility_service.classify(atr),
            outlook,
        }
    }

    /// Windowed and change-decomposed chart series for `range`.
    pub fn chart(&self, series: &Series, range: TimeRange, now: NaiveDateTime) -> Vec<ChangePoint> {
        let points = self.window_service.select(series, range, now);
        self.change_service.decompose(&points)
    }

    /// Metric-card figures. The live quote price wins over the last close;
    /// the change is measured against the last close.
    pub fn summarize(&self, series: &Series, quote: Option<&LatestQuote>) -> QuoteSummary {
        let last_close = series.latest_close().unwrap_or(0.0);
        let price = quote.map_or(last_close, |q| q.latest_price);
        let change = if series.is_empty() { 0.0 } else { price - last_close };
        let change_pct = if last_close != 0.0 {
            change / last_close * 100.0
        } else {
            0.0
        };

        let latest = series.latest();
        QuoteSummary {
            price,
            change,
            change_pct,
            volume: latest.map_or(0, |r| r.volume),
            rsi: latest.map_or(0.0, |r| r.rsi),
            ma20: latest.map_or(0.0, |r| r.ma20),
            ma50: latest.map_or(0.0, |r| r.ma50),
            support: latest.map_or(0.0, |r| r.support),
            resistance: latest.map_or(0.0, |r| r.resistance),
            score: latest.map_or(0.0, |r| r.score),
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
