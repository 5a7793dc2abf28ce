//! Background driver for a [`StockDashboard`].
//!
//! Fetches run on a [`JoinSet`] so the loop keeps accepting commands while
//! a request is in flight. Every response comes back through
//! [`StockDashboard::apply_fetch`], which discards anything superseded.

use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::alert::{Alert, AlertEvent};
use crate::models::analysis::{AnalysisSnapshot, FetchedAnalysis};
use crate::models::window::TimeRange;
use crate::services::fetch_service::FetchService;
use crate::services::poll_scheduler::{FetchOutcome, FetchTicket, PollTrigger};
use crate::StockDashboard;

/// How often a fired alert is checked for cool-down expiry.
const ALERT_CHECK_PERIOD: std::time::Duration = std::time::Duration::from_secs(1);

/// Input to the poll loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PollCommand {
    /// Select (or re-select) a ticker; fetches immediately.
    SelectTicker(String),
    /// Change the chart range of the current snapshot.
    SelectRange(TimeRange),
    /// Re-analyze the selected ticker now.
    Analyze,
    /// Arm a price alert on the selected ticker.
    SetAlert(f64),
    /// Deselect the ticker and stop polling.
    ClearTicker,
    Shutdown,
}

/// Output of the poll loop.
#[derive(Debug)]
pub enum PollEvent {
    /// A fresh series was applied.
    Applied(Box<AnalysisSnapshot>),
    /// The existing series was re-derived for a new range.
    Rederived(Box<AnalysisSnapshot>),
    AlertArmed(Alert),
    AlertFired(AlertEvent),
    /// The alert's cool-down elapsed and it is armed again.
    AlertRearmed { ticker: String },
    /// A current fetch failed; the previous state is still shown.
    Failed { ticker: String, error: CoreError },
    /// A command was refused (invalid ticker, nothing selected, ...).
    Rejected(CoreError),
}

type FetchResult = (FetchTicket, Result<FetchedAnalysis, CoreError>);

/// Local wall time fixed at loop start and advanced by the tokio clock.
/// Never moves backwards, whatever happens to the system clock.
struct LoopClock {
    started: Instant,
    anchor: NaiveDateTime,
}

impl LoopClock {
    fn start() -> Self {
        Self {
            started: Instant::now(),
            anchor: Local::now().naive_local(),
        }
    }

    fn now(&self) -> NaiveDateTime {
        let elapsed = chrono::Duration::from_std(self.started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.anchor.checked_add_signed(elapsed).unwrap_or(self.anchor)
    }
}

fn spawn_fetch(inflight: &mut JoinSet<FetchResult>, service: Arc<FetchService>, ticket: FetchTicket) {
    inflight.spawn(async move {
        let result = service.fetch(&ticket.ticker).await;
        (ticket, result)
    });
}

/// Run until [`PollCommand::Shutdown`] or until either channel closes.
/// Returns the dashboard so its final state can be inspected.
///
/// While a ticker is selected a fetch is issued every poll interval.
/// The first timed fetch comes one full interval after selection.
pub async fn run_poll_loop(
    mut dashboard: StockDashboard,
    mut commands: mpsc::Receiver<PollCommand>,
    events: mpsc::Sender<PollEvent>,
) -> StockDashboard {
    let period = dashboard.poll_interval();
    let mut poll_timer = interval_at(Instant::now() + period, period);
    poll_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut alert_timer = interval_at(Instant::now() + ALERT_CHECK_PERIOD, ALERT_CHECK_PERIOD);
    alert_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut inflight: JoinSet<FetchResult> = JoinSet::new();
    let clock = LoopClock::start();

    info!(interval_secs = period.as_secs(), "poll loop started");

    loop {
        let polling = dashboard.selected_ticker().is_some();
        let alert_pending = dashboard.alert().is_some_and(|a| a.triggered);

        let published: Vec<PollEvent> = tokio::select! {
            cmd = commands.recv() => {
                let Some(cmd) = cmd else {
                    info!("command channel closed, poll loop stopping");
                    break;
                };
                match cmd {
                    PollCommand::SelectTicker(input) => match dashboard.select_ticker(&input) {
                        Ok(ticket) => {
                            poll_timer.reset();
                            spawn_fetch(&mut inflight, dashboard.fetch_service(), ticket);
                            Vec::new()
                        }
                        Err(e) => vec![PollEvent::Rejected(e)],
                    },
                    PollCommand::SelectRange(range) => dashboard
                        .select_range(range, clock.now())
                        .map(|snapshot| PollEvent::Rederived(Box::new(snapshot.clone())))
                        .into_iter()
                        .collect(),
                    PollCommand::Analyze => match dashboard.request_fetch(PollTrigger::Manual) {
                        Ok(ticket) => {
                            spawn_fetch(&mut inflight, dashboard.fetch_service(), ticket);
                            Vec::new()
                        }
                        Err(e) => vec![PollEvent::Rejected(e)],
                    },
                    PollCommand::SetAlert(threshold) => match dashboard.set_alert(threshold) {
                        Ok(alert) => vec![PollEvent::AlertArmed(alert.clone())],
                        Err(e) => vec![PollEvent::Rejected(e)],
                    },
                    PollCommand::ClearTicker => {
                        dashboard.clear_ticker();
                        inflight.abort_all();
                        Vec::new()
                    }
                    PollCommand::Shutdown => {
                        info!("shutdown requested, poll loop stopping");
                        break;
                    }
                }
            }
            _ = poll_timer.tick(), if polling => {
                match dashboard.request_fetch(PollTrigger::Timer) {
                    Ok(ticket) => spawn_fetch(&mut inflight, dashboard.fetch_service(), ticket),
                    Err(e) => debug!(error = %e, "timer tick without a ticker"),
                }
                Vec::new()
            }
            _ = alert_timer.tick(), if alert_pending => {
                if dashboard.tick_alert(clock.now()) {
                    dashboard
                        .alert()
                        .map(|a| PollEvent::AlertRearmed { ticker: a.ticker.clone() })
                        .into_iter()
                        .collect()
                } else {
                    Vec::new()
                }
            }
            Some(joined) = inflight.join_next(), if !inflight.is_empty() => {
                match joined {
                    Ok((ticket, result)) => {
                        let outcome = dashboard.apply_fetch(ticket, result, clock.now());
                        outcome_events(&dashboard, outcome)
                    }
                    Err(e) if e.is_cancelled() => {
                        debug!("in-flight fetch cancelled");
                        Vec::new()
                    }
                    Err(e) => {
                        warn!(error = %e, "fetch task failed");
                        Vec::new()
                    }
                }
            }
        };

        let mut closed = false;
        for event in published {
            if events.send(event).await.is_err() {
                closed = true;
                break;
            }
        }
        if closed {
            info!("event channel closed, poll loop stopping");
            break;
        }
    }

    inflight.abort_all();
    dashboard
}

/// Events to publish for one handled fetch. Superseded fetches are silent.
fn outcome_events(dashboard: &StockDashboard, outcome: FetchOutcome) -> Vec<PollEvent> {
    match outcome {
        FetchOutcome::Applied { alert, .. } => {
            let mut out = Vec::with_capacity(2);
            if let Some(snapshot) = dashboard.snapshot() {
                out.push(PollEvent::Applied(Box::new(snapshot.clone())));
            }
            if let Some(event) = alert {
                out.push(PollEvent::AlertFired(event));
            }
            out
        }
        FetchOutcome::Failed { ticket, error } => vec![PollEvent::Failed {
            ticker: ticket.ticker,
            error,
        }],
        FetchOutcome::Superseded { .. } => Vec::new(),
    }
}
