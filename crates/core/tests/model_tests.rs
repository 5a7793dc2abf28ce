// ═══════════════════════════════════════════════════════════════════
// Model Tests — Series, TimeRange, Settings, signals, portfolio
// ═══════════════════════════════════════════════════════════════════

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::time::Duration;

use stock_analytics_core::errors::CoreError;
use stock_analytics_core::models::alert::Alert;
use stock_analytics_core::models::analysis::{AnalysisResponse, ModelOutlook};
use stock_analytics_core::models::portfolio::{Portfolio, Position};
use stock_analytics_core::models::record::{DailyRecord, Series};
use stock_analytics_core::models::settings::Settings;
use stock_analytics_core::models::signal::{Decision, Signal, VolatilityTier};
use stock_analytics_core::models::ticker::normalize_ticker;
use stock_analytics_core::models::window::{LabelGranularity, TimeRange};

fn make_date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn record(date: NaiveDateTime, close: f64) -> DailyRecord {
    DailyRecord {
        close,
        ..DailyRecord::zeroed(date)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Series
// ═══════════════════════════════════════════════════════════════════

mod series {
    use super::*;

    #[test]
    fn sorts_by_date() {
        let series = Series::new(
            "AAPL",
            vec![
                record(make_date(2025, 1, 17), 3.0),
                record(make_date(2025, 1, 15), 1.0),
                record(make_date(2025, 1, 16), 2.0),
            ],
        );
        let closes: Vec<f64> = series.records().iter().map(|r| r.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.ticker(), "AAPL");
    }

    #[test]
    fn duplicate_dates_keep_later_entry() {
        let series = Series::new(
            "AAPL",
            vec![
                record(make_date(2025, 1, 15), 1.0),
                record(make_date(2025, 1, 16), 2.0),
                record(make_date(2025, 1, 15), 9.0),
            ],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[0].close, 9.0);
    }

    #[test]
    fn dates_strictly_increase() {
        let dates = [5, 1, 3, 3, 2, 5, 4];
        let series = Series::new(
            "MSFT",
            dates
                .iter()
                .enumerate()
                .map(|(i, d)| record(make_date(2025, 2, *d), i as f64))
                .collect(),
        );
        assert!(series
            .records()
            .windows(2)
            .all(|w| w[0].date < w[1].date));
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn empty_series_is_valid() {
        let series = Series::empty("AAPL");
        assert!(series.is_empty());
        assert_eq!(series.latest(), None);
        assert_eq!(series.latest_close(), None);
        assert!(series.last_n(5).is_empty());
    }

    #[test]
    fn deserialized_series_is_sorted_and_deduplicated() {
        let json = serde_json::json!({
            "ticker": "AAPL",
            "records": [
                record(make_date(2025, 1, 3), 3.0),
                record(make_date(2025, 1, 1), 1.0),
                record(make_date(2025, 1, 1), 9.0),
            ],
        });
        let series: Series = serde_json::from_value(json).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[0].close, 9.0);
        assert_eq!(series.latest_close(), Some(3.0));
    }

    #[test]
    fn serialized_series_reads_back_unchanged() {
        let series = Series::new(
            "MSFT",
            vec![
                record(make_date(2025, 1, 2), 2.0),
                record(make_date(2025, 1, 1), 1.0),
            ],
        );
        let text = serde_json::to_string(&series).unwrap();
        assert_eq!(serde_json::from_str::<Series>(&text).unwrap(), series);
    }

    #[test]
    fn last_n_shorter_than_series() {
        let series = Series::new(
            "AAPL",
            (1..=3).map(|d| record(make_date(2025, 1, d), d as f64)).collect(),
        );
        assert_eq!(series.last_n(5).len(), 3);
        assert_eq!(series.last_n(2)[0].close, 2.0);
        assert_eq!(series.latest_close(), Some(3.0));
    }
}

// ═══════════════════════════════════════════════════════════════════
// TimeRange
// ═══════════════════════════════════════════════════════════════════

mod time_range {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("1D".parse::<TimeRange>().unwrap(), TimeRange::OneDay);
        assert_eq!("5d".parse::<TimeRange>().unwrap(), TimeRange::FiveDays);
        assert_eq!("ytd".parse::<TimeRange>().unwrap(), TimeRange::YearToDate);
        assert_eq!(" max ".parse::<TimeRange>().unwrap(), TimeRange::Max);
    }

    #[test]
    fn unknown_range_rejected() {
        match "2W".parse::<TimeRange>() {
            Err(CoreError::ValidationError(msg)) => assert!(msg.contains("2W")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn display_round_trips_every_range() {
        for range in TimeRange::ALL {
            assert_eq!(range.to_string().parse::<TimeRange>().unwrap(), range);
        }
    }

    #[test]
    fn serde_uses_short_names() {
        assert_eq!(serde_json::to_string(&TimeRange::SixMonths).unwrap(), "\"6M\"");
        let parsed: TimeRange = serde_json::from_str("\"5Y\"").unwrap();
        assert_eq!(parsed, TimeRange::FiveYears);
    }

    #[test]
    fn default_is_one_month() {
        assert_eq!(TimeRange::default(), TimeRange::OneMonth);
    }

    #[test]
    fn label_granularity() {
        assert_eq!(TimeRange::OneDay.granularity(), LabelGranularity::TimeOfDay);
        assert_eq!(TimeRange::FiveDays.granularity(), LabelGranularity::Day);
        for range in [
            TimeRange::OneMonth,
            TimeRange::SixMonths,
            TimeRange::YearToDate,
            TimeRange::OneYear,
            TimeRange::FiveYears,
            TimeRange::Max,
        ] {
            assert_eq!(range.granularity(), LabelGranularity::Month);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.service_urls, vec!["http://127.0.0.1:8000".to_string()]);
        assert_eq!(s.history_days, 90);
        assert_eq!(s.poll_interval(), Duration::from_secs(60));
        assert_eq!(s.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(s.alert_cooldown(), chrono::Duration::seconds(5));
        assert_eq!(s.default_range, TimeRange::OneMonth);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{"history_days": 30, "default_range": "YTD"}"#).unwrap();
        assert_eq!(s.history_days, 30);
        assert_eq!(s.default_range, TimeRange::YearToDate);
        assert_eq!(s.fetch_timeout_secs, 10);
    }

    #[test]
    fn invalid_json_rejected() {
        assert!(matches!(
            Settings::from_json("{"),
            Err(CoreError::Deserialization(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{"history_days": 0}"#),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn poll_interval_is_clamped() {
        let mut s = Settings::default();
        s.poll_interval_secs = 5;
        assert_eq!(s.poll_interval(), Duration::from_secs(30));
        s.poll_interval_secs = 45;
        assert_eq!(s.poll_interval(), Duration::from_secs(45));
        s.poll_interval_secs = 3600;
        assert_eq!(s.poll_interval(), Duration::from_secs(60));
    }

    #[test]
    fn env_overrides() {
        let vars = env(&[
            ("STOCK_SERVICE_URL", "http://a:8000, http://b:8000,"),
            ("STOCK_HISTORY_DAYS", "365"),
            ("STOCK_POLL_SECS", "30"),
            ("STOCK_FETCH_TIMEOUT_SECS", "4"),
        ]);
        let mut s = Settings::default();
        s.apply_env(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(s.service_urls, vec!["http://a:8000", "http://b:8000"]);
        assert_eq!(s.history_days, 365);
        assert_eq!(s.poll_interval_secs, 30);
        assert_eq!(s.fetch_timeout(), Duration::from_secs(4));
    }

    #[test]
    fn env_with_bad_number_rejected() {
        let vars = env(&[("STOCK_HISTORY_DAYS", "ninety")]);
        let mut s = Settings::default();
        match s.apply_env(|k| vars.get(k).cloned()) {
            Err(CoreError::ValidationError(msg)) => assert!(msg.contains("STOCK_HISTORY_DAYS")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn empty_service_url_list_rejected() {
        let vars = env(&[("STOCK_SERVICE_URL", " , ")]);
        let mut s = Settings::default();
        assert!(s.apply_env(|k| vars.get(k).cloned()).is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tickers, signals, portfolio, alerts
// ═══════════════════════════════════════════════════════════════════

mod misc {
    use super::*;

    #[test]
    fn ticker_normalization() {
        assert_eq!(normalize_ticker("msft").unwrap(), "MSFT");
        assert!(matches!(
            normalize_ticker("AAPL1"),
            Err(CoreError::InvalidTicker(t)) if t == "AAPL1"
        ));
        assert!(normalize_ticker("ABCDEF").is_err());
    }

    #[test]
    fn decision_and_signal_display() {
        assert_eq!(Decision::Buy.to_string(), "BUY");
        assert_eq!(Decision::DoNotBuy.to_string(), "DO NOT BUY");
        assert_eq!(Signal::Sell.to_string(), "SELL");
        assert_eq!(Signal::Hold.to_string(), "HOLD");
    }

    #[test]
    fn volatility_tier_gauge() {
        assert_eq!(VolatilityTier::Low.gauge(), 25);
        assert_eq!(VolatilityTier::Medium.gauge(), 50);
        assert_eq!(VolatilityTier::High.gauge(), 85);
        assert_eq!(VolatilityTier::High.to_string(), "HIGH");
    }

    #[test]
    fn position_uppercases_and_costs() {
        let p = Position::new("aapl", 10, 150.0, make_date(2025, 1, 15));
        assert_eq!(p.ticker, "AAPL");
        assert_eq!(p.cost_basis(), 1500.0);
    }

    #[test]
    fn portfolio_tickers_are_distinct_and_sorted() {
        let opened = make_date(2025, 1, 15);
        let portfolio = Portfolio {
            positions: vec![
                Position::new("MSFT", 1, 400.0, opened),
                Position::new("AAPL", 2, 150.0, opened),
                Position::new("MSFT", 3, 410.0, opened),
            ],
        };
        assert_eq!(portfolio.tickers(), vec!["AAPL", "MSFT"]);
        assert_eq!(portfolio.len(), 3);
    }

    #[test]
    fn new_alert_is_armed() {
        let alert = Alert::new("aapl", 170.0);
        assert_eq!(alert.ticker, "AAPL");
        assert!(!alert.triggered);
        assert!(alert.triggered_at.is_none());
    }

    #[test]
    fn outlook_passes_model_fields_through() {
        let resp: AnalysisResponse = serde_json::from_str(
            r#"{"data": [], "accuracy": 0.82, "predicted_price": 190.5,
                "trade_action": "Buy", "sentiment": 0.3, "mse": 1.7}"#,
        )
        .unwrap();
        let outlook = ModelOutlook::from(&resp);
        assert_eq!(outlook.accuracy, Some(0.82));
        assert_eq!(outlook.prediction, Some(190.5));
        assert_eq!(outlook.trade_action.as_deref(), Some("Buy"));
        assert_eq!(outlook.sentiment, Some(0.3));
        assert_eq!(outlook.mse, Some(1.7));
        assert!(outlook.top_signals.is_empty());
        assert!(outlook.backtest.is_empty());
        assert_eq!(outlook.trade_status, None);
    }

    #[test]
    fn outlook_carries_signals_backtest_and_trade_status() {
        let resp: AnalysisResponse = serde_json::from_str(
            r#"{"data": [], "trade_action": "buy",
                "top_signals": [{"Date": "2025-03-14", "Close": 171.2, "Score": 5},
                                {"Date": "2025-03-11", "Close": 166.0, "Score": 4}],
                "backtest": [{"Date": "2025-03-14", "Signal": "BUY", "Return": 0.021}],
                "trade_status": "Mock buy of AAPL at $171.20"}"#,
        )
        .unwrap();
        let outlook = ModelOutlook::from(&resp);
        assert_eq!(outlook.top_signals.len(), 2);
        assert_eq!(outlook.top_signals[0]["Score"], 5);
        assert_eq!(outlook.backtest.len(), 1);
        assert_eq!(outlook.backtest[0]["Signal"], "BUY");
        assert_eq!(
            outlook.trade_status.as_deref(),
            Some("Mock buy of AAPL at $171.20")
        );
    }

    #[test]
    fn blank_error_field_is_not_an_error() {
        let resp: AnalysisResponse = serde_json::from_str(r#"{"error": "   "}"#).unwrap();
        assert_eq!(resp.error_message(), None);
        let resp: AnalysisResponse = serde_json::from_str(r#"{"error": " bad ticker "}"#).unwrap();
        assert_eq!(resp.error_message(), Some("bad ticker"));
    }
}
