use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::analysis::{AnalysisResponse, LatestQuote};

/// Trait abstraction over the external analysis service.
///
/// The service computes all indicators; implementations only move its
/// payloads across the wire. Tests substitute in-memory sources.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Latest traded price for `ticker`.
    async fn get_latest(&self, ticker: &str) -> Result<LatestQuote, CoreError>;

    /// Per-day records with indicators for the last `days` days.
    ///
    /// A response whose `error` field is non-empty must be returned as
    /// `CoreError::Service`, whatever the transport status was.
    async fn get_analysis(&self, ticker: &str, days: u32) -> Result<AnalysisResponse, CoreError>;
}
