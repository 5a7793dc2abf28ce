use thiserror::Error;

/// Unified error type for the entire stock-analytics-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// A superseded (stale) response is not an error: it is reported as
/// `FetchOutcome::Superseded`. An empty series is not an error either.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input validation ────────────────────────────────────────────
    #[error("Invalid ticker '{0}': expected 1-5 uppercase letters (e.g., AAPL)")]
    InvalidTicker(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("No ticker is currently selected")]
    NoTickerSelected,

    // ── Analysis service / Network ──────────────────────────────────
    #[error("Service error ({provider}): {message}")]
    Service {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Fetch for {ticker} timed out after {seconds}s")]
    Timeout {
        ticker: String,
        seconds: u64,
    },

    #[error("No analysis provider registered")]
    NoProvider,

    // ── Portfolio ───────────────────────────────────────────────────
    #[error("No current price known for {0}")]
    PriceNotAvailable(String),

    #[error("Position not found: {0}")]
    PositionNotFound(String),

    // ── Export / Serialization ──────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("File I/O error: {0}")]
    FileIO(String),
}

impl CoreError {
    /// Whether this error came from the external analysis service or the
    /// transport to it (as opposed to local input validation).
    #[must_use]
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            CoreError::Service { .. } | CoreError::Network(_) | CoreError::Timeout { .. } | CoreError::NoProvider
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Csv(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query parameters from URLs in the message; the ticker and
        // any service tokens travel in the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
