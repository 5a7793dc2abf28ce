use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};

use crate::models::record::{DailyRecord, Series};
use crate::models::window::{RsiPoint, TimeRange, WindowedPoint, NO_DATA_LABEL};

/// Cuts a series into chart windows.
///
/// "now" is always supplied by the caller; this service never reads the
/// wall clock, so the same input always yields the same window.
pub struct WindowService;

impl WindowService {
    pub fn new() -> Self {
        Self
    }

    /// Date-filtered, labeled subsequence of `series` for `range`.
    ///
    /// Never returns an empty vector: an empty window yields a single
    /// zero-valued point labeled [`NO_DATA_LABEL`].
    pub fn select(&self, series: &Series, range: TimeRange, now: NaiveDateTime) -> Vec<WindowedPoint> {
        let format = range.granularity().format_str();
        let start = self.range_start(range, now);

        let points: Vec<WindowedPoint> = series
            .records()
            .iter()
            .filter(|r| Self::in_range(r, range, start, now))
            .map(|r| WindowedPoint {
                label: r.date.format(format).to_string(),
                record: r.clone(),
            })
            .collect();

        if points.is_empty() {
            return vec![Self::placeholder(now)];
        }
        points
    }

    /// Inclusive lower bound of `range` relative to `now`: midnight of the
    /// first calendar day in the window, so a daily bar on that day counts.
    /// `None` for [`TimeRange::Max`] (and for `1D`, which matches by calendar day).
    pub fn range_start(&self, range: TimeRange, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let today = now.date();
        let months_back = |m: u32| today.checked_sub_months(Months::new(m)).unwrap_or(NaiveDate::MIN);
        let first_day = match range {
            TimeRange::OneDay | TimeRange::Max => return None,
            TimeRange::FiveDays => today
                .checked_sub_signed(Duration::days(5))
                .unwrap_or(NaiveDate::MIN),
            TimeRange::OneMonth => months_back(1),
            TimeRange::SixMonths => months_back(6),
            TimeRange::YearToDate => NaiveDate::from_ymd_opt(now.year(), 1, 1)?,
            TimeRange::OneYear => months_back(12),
            TimeRange::FiveYears => months_back(60),
        };
        first_day.and_hms_opt(0, 0, 0)
    }

    /// RSI of the trailing `n` records, labeled by short weekday (`Mon`).
    pub fn rsi_trail(&self, series: &Series, n: usize) -> Vec<RsiPoint> {
        series
            .last_n(n)
            .iter()
            .map(|r| RsiPoint {
                label: r.date.format("%a").to_string(),
                value: r.rsi,
            })
            .collect()
    }

    fn in_range(
        record: &DailyRecord,
        range: TimeRange,
        start: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> bool {
        match (range, start) {
            (TimeRange::OneDay, _) => record.date.date() == now.date(),
            (TimeRange::Max, _) => true,
            (_, Some(start)) => record.date >= start && record.date <= now,
            (_, None) => record.date <= now,
        }
    }

    fn placeholder(now: NaiveDateTime) -> WindowedPoint {
        WindowedPoint {
            label: NO_DATA_LABEL.to_string(),
            record: DailyRecord::zeroed(now),
        }
    }
}

impl Default for WindowService {
    fn default() -> Self {
        Self::new()
    }
}
