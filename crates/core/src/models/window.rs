use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::record::DailyRecord;
use crate::errors::CoreError;

/// Label carried by the synthetic point returned for an empty window.
pub const NO_DATA_LABEL: &str = "No data";

/// Chart ranges offered by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDays,
    #[default]
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "Max")]
    Max,
}

/// How dates are rendered on the chart axis for a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelGranularity {
    /// `14:30`
    TimeOfDay,
    /// `01/15/2025`
    Day,
    /// `01/2025`
    Month,
}

impl LabelGranularity {
    pub fn format_str(self) -> &'static str {
        match self {
            LabelGranularity::TimeOfDay => "%H:%M",
            LabelGranularity::Day => "%m/%d/%Y",
            LabelGranularity::Month => "%m/%Y",
        }
    }
}

impl TimeRange {
    pub const ALL: [TimeRange; 8] = [
        TimeRange::OneDay,
        TimeRange::FiveDays,
        TimeRange::OneMonth,
        TimeRange::SixMonths,
        TimeRange::YearToDate,
        TimeRange::OneYear,
        TimeRange::FiveYears,
        TimeRange::Max,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::OneDay => "1D",
            TimeRange::FiveDays => "5D",
            TimeRange::OneMonth => "1M",
            TimeRange::SixMonths => "6M",
            TimeRange::YearToDate => "YTD",
            TimeRange::OneYear => "1Y",
            TimeRange::FiveYears => "5Y",
            TimeRange::Max => "Max",
        }
    }

    pub fn granularity(self) -> LabelGranularity {
        match self {
            TimeRange::OneDay => LabelGranularity::TimeOfDay,
            TimeRange::FiveDays => LabelGranularity::Day,
            _ => LabelGranularity::Month,
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = CoreError;

    /// Case-insensitive: `1d`, `ytd`, `max` are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TimeRange::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "Unknown range '{s}': expected one of 1D, 5D, 1M, 6M, YTD, 1Y, 5Y, Max"
                ))
            })
    }
}

/// A record projected onto a chart axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowedPoint {
    /// Axis label, formatted per the range granularity
    pub label: String,

    #[serde(flatten)]
    pub record: DailyRecord,
}

impl WindowedPoint {
    /// True for the synthetic point standing in for an empty window.
    pub fn is_placeholder(&self) -> bool {
        self.label == NO_DATA_LABEL
    }
}

/// A windowed point with its move relative to the previous point.
///
/// At most one of `increase` / `decrease` is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    #[serde(flatten)]
    pub point: WindowedPoint,
    pub increase: f64,
    pub decrease: f64,
}

impl ChangePoint {
    /// Signed move from the previous point.
    pub fn delta(&self) -> f64 {
        self.increase - self.decrease
    }
}

/// RSI value labeled by short weekday, for the momentum strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiPoint {
    pub label: String,
    pub value: f64,
}
