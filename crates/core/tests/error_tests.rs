// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use stock_analytics_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_ticker() {
        let err = CoreError::InvalidTicker("aapl1".into());
        assert_eq!(
            err.to_string(),
            "Invalid ticker 'aapl1': expected 1-5 uppercase letters (e.g., AAPL)"
        );
    }

    #[test]
    fn validation_error() {
        let err = CoreError::ValidationError("quantity must be positive".into());
        assert_eq!(err.to_string(), "Validation failed: quantity must be positive");
    }

    #[test]
    fn no_ticker_selected() {
        assert_eq!(
            CoreError::NoTickerSelected.to_string(),
            "No ticker is currently selected"
        );
    }

    #[test]
    fn service_error() {
        let err = CoreError::Service {
            provider: "analysis service (http://127.0.0.1:8000)".into(),
            message: "Failed to fetch stock data".into(),
        };
        assert_eq!(
            err.to_string(),
            "Service error (analysis service (http://127.0.0.1:8000)): Failed to fetch stock data"
        );
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn timeout() {
        let err = CoreError::Timeout {
            ticker: "AAPL".into(),
            seconds: 10,
        };
        assert_eq!(err.to_string(), "Fetch for AAPL timed out after 10s");
    }

    #[test]
    fn no_provider() {
        assert_eq!(
            CoreError::NoProvider.to_string(),
            "No analysis provider registered"
        );
    }

    #[test]
    fn price_not_available() {
        let err = CoreError::PriceNotAvailable("MSFT".into());
        assert_eq!(err.to_string(), "No current price known for MSFT");
    }

    #[test]
    fn position_not_found() {
        let err = CoreError::PositionNotFound("abc-123".into());
        assert_eq!(err.to_string(), "Position not found: abc-123");
    }

    #[test]
    fn csv() {
        let err = CoreError::Csv("unequal lengths".into());
        assert_eq!(err.to_string(), "CSV error: unequal lengths");
    }

    #[test]
    fn file_io() {
        let err = CoreError::FileIO("permission denied".into());
        assert_eq!(err.to_string(), "File I/O error: permission denied");
    }
}

// ── Classification ──────────────────────────────────────────────────

mod classification {
    use super::*;

    #[test]
    fn service_side_failures() {
        assert!(CoreError::Service {
            provider: "p".into(),
            message: "m".into()
        }
        .is_service_failure());
        assert!(CoreError::Network("x".into()).is_service_failure());
        assert!(CoreError::Timeout {
            ticker: "AAPL".into(),
            seconds: 10
        }
        .is_service_failure());
        assert!(CoreError::NoProvider.is_service_failure());
    }

    #[test]
    fn local_failures() {
        assert!(!CoreError::InvalidTicker("1".into()).is_service_failure());
        assert!(!CoreError::ValidationError("x".into()).is_service_failure());
        assert!(!CoreError::NoTickerSelected.is_service_failure());
        assert!(!CoreError::PriceNotAvailable("AAPL".into()).is_service_failure());
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: CoreError = io.into();
        match err {
            CoreError::FileIO(msg) => assert!(msg.contains("missing.csv")),
            other => panic!("Expected FileIO, got {:?}", other),
        }
    }

    #[test]
    fn from_serde_json_error() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: CoreError = parse.unwrap_err().into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn question_mark_propagates_io() {
        fn read() -> Result<String, CoreError> {
            Ok(std::fs::read_to_string("/definitely/not/here.csv")?)
        }
        assert!(matches!(read(), Err(CoreError::FileIO(_))));
    }

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<CoreError>();
    }
}
