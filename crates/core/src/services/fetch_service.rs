use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::analysis::FetchedAnalysis;
use crate::models::settings::Settings;
use crate::models::ticker::normalize_ticker;
use crate::providers::registry::ProviderRegistry;
use crate::providers::traits::AnalysisProvider;

/// Fetches quote + analysis for a ticker from the registered providers.
///
/// Providers are tried in registration order; the first complete answer
/// wins. The whole attempt is bounded by `timeout`.
pub struct FetchService {
    registry: ProviderRegistry,
    history_days: u32,
    timeout: Duration,
}

impl FetchService {
    pub fn new(registry: ProviderRegistry, history_days: u32, timeout: Duration) -> Self {
        Self {
            registry,
            history_days,
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            ProviderRegistry::from_settings(settings),
            settings.history_days,
            settings.fetch_timeout(),
        )
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch both payloads for `ticker`. A timeout counts as a failure.
    pub async fn fetch(&self, ticker: &str) -> Result<FetchedAnalysis, CoreError> {
        let ticker = normalize_ticker(ticker)?;
        match tokio::time::timeout(self.timeout, self.fetch_with_fallback(&ticker)).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout {
                ticker,
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    async fn fetch_with_fallback(&self, ticker: &str) -> Result<FetchedAnalysis, CoreError> {
        let providers = self.registry.providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;
        for provider in providers {
            match self.fetch_from(provider.as_ref(), ticker).await {
                Ok(fetched) => {
                    debug!(
                        provider = provider.name(),
                        ticker,
                        records = fetched.response.data.len(),
                        "fetched analysis"
                    );
                    return Ok(fetched);
                }
                Err(e) => {
                    warn!(provider = provider.name(), ticker, error = %e, "provider failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }

    async fn fetch_from(
        &self,
        provider: &dyn AnalysisProvider,
        ticker: &str,
    ) -> Result<FetchedAnalysis, CoreError> {
        let quote = provider.get_latest(ticker).await?;
        if !quote.latest_price.is_finite() || quote.latest_price < 0.0 {
            return Err(CoreError::Service {
                provider: provider.name().to_string(),
                message: format!(
                    "Invalid price returned for {ticker}: {} (must be finite and non-negative)",
                    quote.latest_price
                ),
            });
        }

        let response = provider.get_analysis(ticker, self.history_days).await?;
        if let Some(msg) = response.error_message() {
            return Err(CoreError::Service {
                provider: provider.name().to_string(),
                message: msg.to_string(),
            });
        }

        Ok(FetchedAnalysis { quote, response })
    }
}
