use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One trading day as delivered by the analysis service.
///
/// Indicators are computed externally and consumed as opaque numbers.
/// Every numeric field defaults to 0 when the service omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Timestamp of the bar (daily bars carry midnight)
    pub date: NaiveDateTime,

    pub close: f64,
    pub volume: u64,
    pub rsi: f64,
    pub ma20: f64,
    pub ma50: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,

    /// 1.0 when the service flagged a volume spike, 0.0 otherwise
    pub volume_spike: f64,
    pub support: f64,
    pub resistance: f64,

    /// Average True Range
    pub atr: f64,

    /// Composite signal score from the service (roughly -1..=5)
    pub score: f64,
}

impl DailyRecord {
    /// A record with every value zeroed, stamped at `date`.
    pub fn zeroed(date: NaiveDateTime) -> Self {
        Self {
            date,
            close: 0.0,
            volume: 0,
            rsi: 0.0,
            ma20: 0.0,
            ma50: 0.0,
            bollinger_upper: 0.0,
            bollinger_lower: 0.0,
            volume_spike: 0.0,
            support: 0.0,
            resistance: 0.0,
            atr: 0.0,
            score: 0.0,
        }
    }
}

/// Validated, date-ascending sequence of records for one ticker.
///
/// Dates are unique. Construction always sorts and de-duplicates, so a
/// `Series` never violates ordering regardless of the source order.
/// An empty series is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSeries")]
pub struct Series {
    ticker: String,
    records: Vec<DailyRecord>,
}

/// Wire shape of a [`Series`]; deserialized input is re-validated.
#[derive(Deserialize)]
struct RawSeries {
    ticker: String,
    #[serde(default)]
    records: Vec<DailyRecord>,
}

impl From<RawSeries> for Series {
    fn from(raw: RawSeries) -> Self {
        Series::new(raw.ticker, raw.records)
    }
}

impl Series {
    /// Build a series, sorting by date. When two records share a date the
    /// one appearing later in `records` wins.
    pub fn new(ticker: impl Into<String>, records: Vec<DailyRecord>) -> Self {
        let mut indexed: Vec<(usize, DailyRecord)> = records.into_iter().enumerate().collect();
        // Stable by date, later source position last within a date
        indexed.sort_by(|(ia, a), (ib, b)| a.date.cmp(&b.date).then(ia.cmp(ib)));

        let mut deduped: Vec<DailyRecord> = Vec::with_capacity(indexed.len());
        for (_, record) in indexed {
            match deduped.last_mut() {
                Some(last) if last.date == record.date => *last = record,
                _ => deduped.push(record),
            }
        }

        Self {
            ticker: ticker.into(),
            records: deduped,
        }
    }

    /// An empty series for `ticker`.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self::new(ticker, Vec::new())
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent record, if any.
    pub fn latest(&self) -> Option<&DailyRecord> {
        self.records.last()
    }

    /// Close of the most recent record.
    pub fn latest_close(&self) -> Option<f64> {
        self.latest().map(|r| r.close)
    }

    /// The trailing `n` records (fewer when the series is shorter).
    pub fn last_n(&self, n: usize) -> &[DailyRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }
}
