pub mod errors;
pub mod models;
pub mod poller;
pub mod providers;
pub mod services;

use chrono::{NaiveDate, NaiveDateTime};
use models::{
    alert::{Alert, AlertEvent},
    analysis::{AnalysisSnapshot, FetchedAnalysis, ModelOutlook},
    analytics::PortfolioValuation,
    dashboard::DashboardState,
    portfolio::Position,
    record::Series,
    settings::Settings,
    ticker::normalize_ticker,
    window::{ChangePoint, TimeRange, WindowedPoint},
};
use providers::registry::ProviderRegistry;
use services::{
    alert_service::AlertService,
    analytics_service::AnalyticsService,
    export_service::ExportService,
    fetch_service::FetchService,
    poll_scheduler::{FetchOutcome, FetchPhase, FetchTicket, PollScheduler, PollTrigger},
    portfolio_service::PortfolioService,
    series_validator::SeriesValidator,
    window_service::WindowService,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use errors::CoreError;

/// Main entry point for the stock dashboard core.
///
/// Owns every piece of shared mutable state (current series, generation,
/// portfolio, alert) and the services that derive from it. All fetches,
/// whether from the timer or the user, go through the same
/// generation-tagged path: [`Self::request_fetch`] then [`Self::apply_fetch`].
#[must_use]
pub struct StockDashboard {
    settings: Settings,
    state: DashboardState,
    scheduler: PollScheduler,
    fetch_service: Arc<FetchService>,
    validator: SeriesValidator,
    analytics_service: AnalyticsService,
    window_service: WindowService,
    portfolio_service: PortfolioService,
    alert_service: AlertService,
    export_service: ExportService,
}

impl std::fmt::Debug for StockDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockDashboard")
            .field("ticker", &self.scheduler.active_ticker())
            .field("generation", &self.scheduler.generation())
            .field("phase", &self.scheduler.phase())
            .field("records", &self.state.series.len())
            .field("positions", &self.state.portfolio.len())
            .field("alert", &self.state.alert)
            .finish()
    }
}

impl StockDashboard {
    /// Dashboard talking to the HTTP services listed in `settings`.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let fetch_service = FetchService::from_settings(&settings);
        Ok(Self::build(settings, fetch_service))
    }

    /// Dashboard backed by a caller-supplied provider registry.
    pub fn with_registry(settings: Settings, registry: ProviderRegistry) -> Result<Self, CoreError> {
        settings.validate()?;
        let fetch_service = FetchService::new(registry, settings.history_days, settings.fetch_timeout());
        Ok(Self::build(settings, fetch_service))
    }

    // ── Ticker selection & fetch cycle ──────────────────────────────

    /// Select a ticker and issue its first fetch.
    ///
    /// Invalid symbols are rejected before any request exists. Switching
    /// to a different ticker drops the previous ticker's series and
    /// supersedes anything still in flight for it.
    pub fn select_ticker(&mut self, input: &str) -> Result<FetchTicket, CoreError> {
        let ticker = normalize_ticker(input)?;
        if self.scheduler.active_ticker() != Some(ticker.as_str()) {
            self.state.series = Series::empty(ticker.clone());
            self.state.quote = None;
            self.state.outlook = ModelOutlook::default();
            self.state.snapshot = None;
            self.state.last_error = None;
        }
        let ticket = self.scheduler.select(ticker);
        info!(ticker = %ticket.ticker, generation = ticket.generation, "ticker selected");
        Ok(ticket)
    }

    /// Deselect the ticker: polling stops and in-flight responses go stale.
    /// Portfolio, alert and known prices are kept.
    pub fn clear_ticker(&mut self) {
        self.scheduler.clear();
        self.state.series = Series::default();
        self.state.quote = None;
        self.state.outlook = ModelOutlook::default();
        self.state.snapshot = None;
        info!(generation = self.scheduler.generation(), "ticker cleared, polling stopped");
    }

    /// Issue a fetch for the selected ticker. Supersedes any earlier one.
    pub fn request_fetch(&mut self, trigger: PollTrigger) -> Result<FetchTicket, CoreError> {
        let ticket = self.scheduler.issue(trigger)?;
        debug!(ticker = %ticket.ticker, generation = ticket.generation, ?trigger, "fetch issued");
        Ok(ticket)
    }

    /// Shared handle for performing fetches outside `&mut self`.
    pub fn fetch_service(&self) -> Arc<FetchService> {
        Arc::clone(&self.fetch_service)
    }

    /// Feed a completed fetch back in.
    ///
    /// Stale tickets are discarded without touching state. Failures keep
    /// the last applied state and are returned to the caller. A success
    /// re-derives the snapshot, updates the ticker's latest price and
    /// evaluates the alert.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<FetchedAnalysis, CoreError>,
        now: NaiveDateTime,
    ) -> FetchOutcome {
        if !self.scheduler.resolve(&ticket) {
            debug!(
                ticker = %ticket.ticker,
                generation = ticket.generation,
                latest = self.scheduler.generation(),
                "discarding superseded response"
            );
            return FetchOutcome::Superseded { ticket };
        }

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(error) => {
                warn!(ticker = %ticket.ticker, generation = ticket.generation, error = %error, "fetch failed, keeping last state");
                self.state.last_error = Some(error.to_string());
                return FetchOutcome::Failed { ticket, error };
            }
        };

        let validation = self.validator.validate(&ticket.ticker, &fetched.response.data);
        if validation.dropped() > 0 {
            debug!(ticker = %ticket.ticker, dropped = validation.dropped(), "records dropped during validation");
        }
        let series = validation.into_series();
        let latest_price = series.latest_close().unwrap_or(fetched.quote.latest_price);

        self.state.latest_prices.insert(ticket.ticker.clone(), latest_price);
        self.state.outlook = ModelOutlook::from(&fetched.response);
        self.state.quote = Some(fetched.quote);
        self.state.series = series;
        self.state.last_error = None;
        self.rebuild_snapshot(ticket.generation, now);

        let alert = self.evaluate_alert(&ticket.ticker, latest_price, now);

        info!(
            ticker = %ticket.ticker,
            generation = ticket.generation,
            records = self.state.series.len(),
            price = latest_price,
            "analysis applied"
        );
        FetchOutcome::Applied { ticket, alert }
    }

    /// Explicit re-analysis: issue, fetch and apply in one call.
    pub async fn analyze(&mut self, now: NaiveDateTime) -> Result<FetchOutcome, CoreError> {
        let ticket = self.request_fetch(PollTrigger::Manual)?;
        let result = self.fetch_service.fetch(&ticket.ticker).await;
        Ok(self.apply_fetch(ticket, result, now))
    }

    // ── Charts ──────────────────────────────────────────────────────

    /// Change the chart range and re-derive the snapshot's chart.
    pub fn select_range(&mut self, range: TimeRange, now: NaiveDateTime) -> Option<&AnalysisSnapshot> {
        self.state.range = range;
        if let Some(snapshot) = self.state.snapshot.as_mut() {
            snapshot.range = range;
            snapshot.chart = self.analytics_service.chart(&self.state.series, range, now);
        }
        self.state.snapshot.as_ref()
    }

    /// Windowed points of the current series for `range`.
    #[must_use]
    pub fn window(&self, range: TimeRange, now: NaiveDateTime) -> Vec<WindowedPoint> {
        self.window_service.select(&self.state.series, range, now)
    }

    /// Windowed and change-decomposed points for `range`.
    #[must_use]
    pub fn chart(&self, range: TimeRange, now: NaiveDateTime) -> Vec<ChangePoint> {
        self.analytics_service.chart(&self.state.series, range, now)
    }

    // ── Portfolio ───────────────────────────────────────────────────

    /// Add a position. The ticker needs a price seen this session.
    pub fn add_position(
        &mut self,
        ticker: &str,
        quantity: u32,
        buy_price: f64,
        now: NaiveDateTime,
    ) -> Result<uuid::Uuid, CoreError> {
        self.portfolio_service.add_position(
            &mut self.state.portfolio,
            ticker,
            quantity,
            buy_price,
            &self.state.latest_prices,
            now,
        )
    }

    /// Remove a position by its ID.
    pub fn remove_position(&mut self, id: uuid::Uuid) -> Result<Position, CoreError> {
        self.portfolio_service
            .remove_position(&mut self.state.portfolio, id)
    }

    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.state.portfolio.positions
    }

    /// Value all positions against the latest known prices.
    #[must_use]
    pub fn portfolio_valuation(&self) -> PortfolioValuation {
        self.portfolio_service
            .valuation(&self.state.portfolio, &self.state.latest_prices)
    }

    /// Latest close seen for `ticker` this session.
    #[must_use]
    pub fn latest_price(&self, ticker: &str) -> Option<f64> {
        self.state.latest_prices.get(&ticker.to_uppercase()).copied()
    }

    // ── Alerts ──────────────────────────────────────────────────────

    /// Arm an alert for the selected ticker, replacing any previous one.
    pub fn set_alert(&mut self, threshold_price: f64) -> Result<&Alert, CoreError> {
        let ticker = self
            .scheduler
            .active_ticker()
            .ok_or(CoreError::NoTickerSelected)?
            .to_string();
        let current = self.latest_price(&ticker);
        let alert = self.alert_service.create(&ticker, threshold_price, current)?;
        info!(ticker = %alert.ticker, threshold = alert.threshold_price, "alert armed");
        Ok(self.state.alert.insert(alert))
    }

    /// Disarm and return the current alert.
    pub fn clear_alert(&mut self) -> Option<Alert> {
        self.state.alert.take()
    }

    #[must_use]
    pub fn alert(&self) -> Option<&Alert> {
        self.state.alert.as_ref()
    }

    /// Re-arm the alert if its cool-down has elapsed. Returns true when
    /// it was cleared by this call.
    pub fn tick_alert(&mut self, now: NaiveDateTime) -> bool {
        match self.state.alert.as_mut() {
            Some(alert) => self.alert_service.expire(alert, now),
            None => false,
        }
    }

    // ── Export ──────────────────────────────────────────────────────

    /// CSV of the `range` window, optionally bounded by inclusive dates.
    pub fn export_csv(
        &self,
        range: TimeRange,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        now: NaiveDateTime,
    ) -> Result<String, CoreError> {
        let points = self.window(range, now);
        self.export_service.to_csv(&points, from, to)
    }

    /// Write the CSV export to `path`. Returns the number of data rows.
    pub fn export_csv_to_file(
        &self,
        path: impl AsRef<Path>,
        range: TimeRange,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        now: NaiveDateTime,
    ) -> Result<usize, CoreError> {
        let points = self.window(range, now);
        self.export_service.write_csv_file(path, &points, from, to)
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&AnalysisSnapshot> {
        self.state.snapshot.as_ref()
    }

    #[must_use]
    pub fn series(&self) -> &Series {
        &self.state.series
    }

    #[must_use]
    pub fn selected_ticker(&self) -> Option<&str> {
        self.scheduler.active_ticker()
    }

    #[must_use]
    pub fn selected_range(&self) -> TimeRange {
        self.state.range
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.scheduler.generation()
    }

    #[must_use]
    pub fn phase(&self) -> FetchPhase {
        self.scheduler.phase()
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn rebuild_snapshot(&mut self, generation: u64, now: NaiveDateTime) {
        let snapshot = self.analytics_service.derive_snapshot(
            &self.state.series,
            self.state.quote.as_ref(),
            self.state.outlook.clone(),
            self.state.range,
            generation,
            now,
        );
        self.state.snapshot = Some(snapshot);
    }

    fn evaluate_alert(&mut self, ticker: &str, price: f64, now: NaiveDateTime) -> Option<AlertEvent> {
        let alert = self.state.alert.as_mut().filter(|a| a.ticker == ticker)?;
        let event = self.alert_service.evaluate(alert, price, now);
        if let Some(event) = &event {
            info!(ticker = %event.ticker, threshold = event.threshold_price, price = event.price, "alert fired");
        }
        event
    }

    fn build(settings: Settings, fetch_service: FetchService) -> Self {
        let state = DashboardState {
            range: settings.default_range,
            ..DashboardState::default()
        };
        let scheduler = PollScheduler::new(settings.poll_interval());
        let alert_service = AlertService::new(settings.alert_cooldown());

        Self {
            settings,
            state,
            scheduler,
            fetch_service: Arc::new(fetch_service),
            validator: SeriesValidator::new(),
            analytics_service: AnalyticsService::new(),
            window_service: WindowService::new(),
            portfolio_service: PortfolioService::new(),
            alert_service,
            export_service: ExportService::new(),
        }
    }
}
