use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::traits::AnalysisProvider;
use crate::errors::CoreError;
use crate::models::analysis::{AnalysisResponse, LatestQuote};

/// HTTP client for the stock analysis service.
///
/// - **Endpoints**: `GET /latest?ticker=` and `GET /analyze?ticker=&days=`.
/// - **Auth**: none.
/// - **Errors**: the service reports failures in an `error` field, often
///   with a 200 status; that field wins over the HTTP status.
pub struct HttpAnalysisProvider {
    client: Client,
    base_url: String,
    name: String,
}

impl HttpAnalysisProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            name: format!("analysis service ({base_url})"),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the body, surfacing an `error` field first.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CoreError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).query(query).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        debug!(provider = %self.name, path, %status, bytes = body.len(), "analysis service responded");

        decode_body(&self.name, status, &body)
    }
}

/// Shape shared by every service payload for error reporting.
#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
}

fn decode_body<T: DeserializeOwned>(
    provider: &str,
    status: StatusCode,
    body: &[u8],
) -> Result<T, CoreError> {
    if let Ok(ErrorEnvelope { error: Some(msg) }) = serde_json::from_slice::<ErrorEnvelope>(body) {
        if !msg.trim().is_empty() {
            return Err(CoreError::Service {
                provider: provider.to_string(),
                message: msg.trim().to_string(),
            });
        }
    }

    if !status.is_success() {
        return Err(CoreError::Service {
            provider: provider.to_string(),
            message: format!("HTTP {status}"),
        });
    }

    serde_json::from_slice(body).map_err(|e| CoreError::Service {
        provider: provider.to_string(),
        message: format!("Failed to parse response: {e}"),
    })
}

#[async_trait]
impl AnalysisProvider for HttpAnalysisProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_latest(&self, ticker: &str) -> Result<LatestQuote, CoreError> {
        self.get_json("/latest", &[("ticker", ticker.to_string())])
            .await
    }

    async fn get_analysis(&self, ticker: &str, days: u32) -> Result<AnalysisResponse, CoreError> {
        self.get_json(
            "/analyze",
            &[("ticker", ticker.to_string()), ("days", days.to_string())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_wins_over_ok_status() {
        let body = br#"{"error": "Failed to fetch stock data"}"#;
        let result: Result<AnalysisResponse, _> = decode_body("svc", StatusCode::OK, body);
        match result {
            Err(CoreError::Service { message, .. }) => {
                assert_eq!(message, "Failed to fetch stock data")
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn error_field_wins_over_server_error_status() {
        let body = br#"{"error": "boom"}"#;
        let result: Result<AnalysisResponse, _> =
            decode_body("svc", StatusCode::INTERNAL_SERVER_ERROR, body);
        assert!(matches!(result, Err(CoreError::Service { message, .. }) if message == "boom"));
    }

    #[test]
    fn empty_error_field_is_not_a_failure() {
        let body = br#"{"error": "", "data": []}"#;
        let result: AnalysisResponse = decode_body("svc", StatusCode::OK, body).unwrap();
        assert!(result.data.is_empty());
    }

    #[test]
    fn non_success_status_without_body() {
        let result: Result<LatestQuote, _> = decode_body("svc", StatusCode::BAD_GATEWAY, b"");
        assert!(matches!(result, Err(CoreError::Service { message, .. }) if message.contains("502")));
    }

    #[test]
    fn latest_quote_decodes() {
        let body = br#"{"latest_price": 189.5, "latest_time": "2025-01-15 15:59:00"}"#;
        let quote: LatestQuote = decode_body("svc", StatusCode::OK, body).unwrap();
        assert_eq!(quote.latest_price, 189.5);
        assert_eq!(quote.latest_time.as_deref(), Some("2025-01-15 15:59:00"));
    }

    #[test]
    fn predicted_price_alias() {
        let body = br#"{"data": [], "predicted_price": 201.25, "trade_action": "buy"}"#;
        let resp: AnalysisResponse = decode_body("svc", StatusCode::OK, body).unwrap();
        assert_eq!(resp.prediction, Some(201.25));
        assert_eq!(resp.trade_action.as_deref(), Some("buy"));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let p = HttpAnalysisProvider::new("http://localhost:8000/", Duration::from_secs(1));
        assert_eq!(p.base_url(), "http://localhost:8000");
    }
}
