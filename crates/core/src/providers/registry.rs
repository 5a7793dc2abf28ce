use std::sync::Arc;

use super::http::HttpAnalysisProvider;
use super::traits::AnalysisProvider;
use crate::models::settings::Settings;

/// Ordered set of analysis sources.
///
/// The first registered provider is the primary; the rest are fallbacks
/// tried in registration order when the primary fails.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn AnalysisProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// One HTTP provider per configured service URL, in configured order.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut registry = Self::new();
        for url in &settings.service_urls {
            registry.register(Arc::new(HttpAnalysisProvider::new(
                url.clone(),
                settings.fetch_timeout(),
            )));
        }
        registry
    }

    /// Register a provider at the lowest priority.
    pub fn register(&mut self, provider: Arc<dyn AnalysisProvider>) {
        self.providers.push(provider);
    }

    /// All providers, primary first.
    pub fn providers(&self) -> &[Arc<dyn AnalysisProvider>] {
        &self.providers
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
