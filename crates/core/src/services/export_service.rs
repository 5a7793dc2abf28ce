use chrono::{NaiveDate, Timelike};
use std::path::Path;

use crate::errors::CoreError;
use crate::models::window::WindowedPoint;

/// Fixed CSV column order.
pub const CSV_HEADER: [&str; 12] = [
    "Date",
    "Close",
    "RSI",
    "MA20",
    "MA50",
    "BB_upper",
    "BB_lower",
    "Volume_Spike",
    "Support",
    "Resistance",
    "ATR",
    "Score",
];

/// Writes windowed points as CSV, one row per real (non-placeholder) point.
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Render `points` as CSV, keeping only rows whose date lies within the
    /// inclusive `[from, to]` bounds when given.
    pub fn to_csv(
        &self,
        points: &[WindowedPoint],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<String, CoreError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(CoreError::ValidationError(format!(
                    "'from' date ({from}) must not be after 'to' date ({to})"
                )));
            }
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        for point in points.iter().filter(|p| !p.is_placeholder()) {
            let day = point.record.date.date();
            if from.is_some_and(|f| day < f) || to.is_some_and(|t| day > t) {
                continue;
            }
            let r = &point.record;
            let date = if r.date.num_seconds_from_midnight() == 0 {
                r.date.format("%Y-%m-%d").to_string()
            } else {
                r.date.format("%Y-%m-%d %H:%M:%S").to_string()
            };
            writer.write_record([
                date,
                r.close.to_string(),
                r.rsi.to_string(),
                r.ma20.to_string(),
                r.ma50.to_string(),
                r.bollinger_upper.to_string(),
                r.bollinger_lower.to_string(),
                r.volume_spike.to_string(),
                r.support.to_string(),
                r.resistance.to_string(),
                r.atr.to_string(),
                r.score.to_string(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CoreError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Same as [`Self::to_csv`], written to `path`. Returns the row count.
    pub fn write_csv_file(
        &self,
        path: impl AsRef<Path>,
        points: &[WindowedPoint],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<usize, CoreError> {
        let csv = self.to_csv(points, from, to)?;
        std::fs::write(path, &csv)?;
        Ok(csv.lines().count().saturating_sub(1))
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}
