use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::alert::Alert;
use super::analysis::{AnalysisSnapshot, LatestQuote, ModelOutlook};
use super::portfolio::Portfolio;
use super::record::Series;
use super::window::TimeRange;

/// All mutable dashboard state, owned by `StockDashboard`.
///
/// Services never hold references into it; they receive the pieces they
/// need as plain parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    /// Last successfully applied series for the selected ticker
    pub series: Series,

    /// Quote that came with `series`
    pub quote: Option<LatestQuote>,

    pub outlook: ModelOutlook,

    /// Derived view of `series`; `None` until the first apply
    pub snapshot: Option<AnalysisSnapshot>,

    /// Chart range currently selected
    pub range: TimeRange,

    /// Latest close per ticker seen this session (portfolio valuation input)
    pub latest_prices: HashMap<String, f64>,

    pub portfolio: Portfolio,

    pub alert: Option<Alert>,

    /// Message of the most recent failed fetch; cleared on the next apply
    pub last_error: Option<String>,
}
