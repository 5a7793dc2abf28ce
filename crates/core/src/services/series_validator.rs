use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::record::{DailyRecord, Series};

/// Result of normalizing a raw payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValidation {
    /// At least one record survived.
    Valid {
        series: Series,
        /// Records dropped for an unusable date
        dropped: usize,
    },
    /// Input was empty or no record had a usable date.
    EmptySeries {
        ticker: String,
        dropped: usize,
    },
}

impl SeriesValidation {
    pub fn is_empty(&self) -> bool {
        matches!(self, SeriesValidation::EmptySeries { .. })
    }

    pub fn dropped(&self) -> usize {
        match self {
            SeriesValidation::Valid { dropped, .. } | SeriesValidation::EmptySeries { dropped, .. } => *dropped,
        }
    }

    /// The validated series; empty for [`SeriesValidation::EmptySeries`].
    pub fn into_series(self) -> Series {
        match self {
            SeriesValidation::Valid { series, .. } => series,
            SeriesValidation::EmptySeries { ticker, .. } => Series::empty(ticker),
        }
    }
}

/// Normalizes loosely-typed service records into a [`Series`].
///
/// Pure transform: no I/O, no shared state.
/// - Records whose date cannot be parsed are dropped, never fatal.
/// - Missing, null, non-numeric or non-finite numbers become 0.
/// - Output is date-ascending with unique dates (last duplicate wins).
pub struct SeriesValidator;

const DATE_KEYS: &[&str] = &["Date", "date", "Datetime", "datetime", "timestamp"];

impl SeriesValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, ticker: &str, raw: &[Value]) -> SeriesValidation {
        let mut records = Vec::with_capacity(raw.len());
        let mut dropped = 0;

        for (idx, value) in raw.iter().enumerate() {
            match Self::parse_record(value) {
                Some(record) => records.push(record),
                None => {
                    debug!(ticker, index = idx, "dropping record without a usable date");
                    dropped += 1;
                }
            }
        }

        if records.is_empty() {
            return SeriesValidation::EmptySeries {
                ticker: ticker.to_string(),
                dropped,
            };
        }

        SeriesValidation::Valid {
            series: Series::new(ticker, records),
            dropped,
        }
    }

    fn parse_record(value: &Value) -> Option<DailyRecord> {
        let obj = value.as_object()?;
        let date = DATE_KEYS
            .iter()
            .find_map(|key| obj.get(*key))
            .and_then(parse_date)?;

        Some(DailyRecord {
            date,
            close: number(obj, &["Close", "close"]),
            volume: volume(obj),
            rsi: number(obj, &["RSI", "rsi"]),
            ma20: number(obj, &["MA20", "ma20"]),
            ma50: number(obj, &["MA50", "ma50"]),
            bollinger_upper: number(obj, &["BB_upper", "bb_upper", "bollinger_upper", "bollingerUpper"]),
            bollinger_lower: number(obj, &["BB_lower", "bb_lower", "bollinger_lower", "bollingerLower"]),
            volume_spike: number(obj, &["Volume_Spike", "volume_spike", "volumeSpike"]),
            support: number(obj, &["Support", "support"]),
            resistance: number(obj, &["Resistance", "resistance"]),
            atr: number(obj, &["ATR", "atr"]),
            score: number(obj, &["Score", "score"]),
        })
    }
}

impl Default for SeriesValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// First present key wins; anything unusable degrades to 0.
fn number(obj: &Map<String, Value>, keys: &[&str]) -> f64 {
    keys.iter()
        .find_map(|key| obj.get(*key))
        .and_then(as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn volume(obj: &Map<String, Value>) -> u64 {
    let v = number(obj, &["Volume", "volume"]);
    if v > 0.0 {
        // Saturating float-to-int cast
        v.round() as u64
    } else {
        0
    }
}

/// Accepts RFC 3339, ISO-like date-times, plain dates and epoch numbers
/// (milliseconds when large enough, seconds otherwise).
fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            let parsed = if raw.abs() >= 100_000_000_000 {
                DateTime::<Utc>::from_timestamp_millis(raw)
            } else {
                DateTime::<Utc>::from_timestamp(raw, 0)
            };
            parsed.map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_common_date_shapes() {
        let midnight = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date(&json!("2025-01-15")), Some(midnight));
        assert_eq!(parse_date(&json!("2025-01-15T00:00:00")), Some(midnight));
        assert_eq!(parse_date(&json!("2025-01-15 00:00:00")), Some(midnight));
        assert_eq!(parse_date(&json!("2025-01-15T00:00:00+00:00")), Some(midnight));
        assert_eq!(parse_date(&json!(1_736_899_200_000_i64)), Some(midnight));
        assert_eq!(parse_date(&json!(1_736_899_200_i64)), Some(midnight));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_date(&json!("yesterday")), None);
        assert_eq!(parse_date(&json!(null)), None);
        assert_eq!(parse_date(&json!(true)), None);
        assert_eq!(parse_date(&json!("2025-13-40")), None);
    }

    #[test]
    fn numbers_degrade_to_zero() {
        let obj = json!({"a": null, "b": "n/a", "c": "12.5", "d": true, "e": [1]});
        let obj = obj.as_object().unwrap();
        assert_eq!(number(obj, &["a"]), 0.0);
        assert_eq!(number(obj, &["b"]), 0.0);
        assert_eq!(number(obj, &["c"]), 12.5);
        assert_eq!(number(obj, &["d"]), 1.0);
        assert_eq!(number(obj, &["e"]), 0.0);
        assert_eq!(number(obj, &["missing"]), 0.0);
    }

    #[test]
    fn negative_volume_clamps_to_zero() {
        let obj = json!({"Volume": -10});
        assert_eq!(volume(obj.as_object().unwrap()), 0);
        let obj = json!({"Volume": 1234.6});
        assert_eq!(volume(obj.as_object().unwrap()), 1235);
    }
}
