use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::alert::AlertEvent;

/// Why a fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollTrigger {
    /// The selected ticker changed
    TickerChanged,
    /// Periodic re-fetch
    Timer,
    /// Explicit user re-analysis
    Manual,
}

/// Tag carried by every outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchTicket {
    pub ticker: String,
    pub generation: u64,
    pub trigger: PollTrigger,
}

/// Where the active ticker's fetch cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchPhase {
    Idle,
    Fetching { generation: u64 },
}

/// How a completed fetch was handled.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Fresh series applied and all derived state rebuilt.
    Applied {
        ticket: FetchTicket,
        /// Set when the new price tripped the armed alert
        alert: Option<AlertEvent>,
    },
    /// A newer request exists; the response was discarded untouched.
    Superseded { ticket: FetchTicket },
    /// The fetch failed; prior state is kept.
    Failed { ticket: FetchTicket, error: CoreError },
}

impl FetchOutcome {
    pub fn ticket(&self) -> &FetchTicket {
        match self {
            FetchOutcome::Applied { ticket, .. }
            | FetchOutcome::Superseded { ticket }
            | FetchOutcome::Failed { ticket, .. } => ticket,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied { .. })
    }
}

/// Generation bookkeeping for the fetch/recompute cycle.
///
/// Every request (ticker change, timer, manual) goes through [`Self::issue`]
/// and bumps one monotonic counter. Only the response holding the latest
/// generation for the selected ticker may be applied; anything older is
/// superseded. Clearing the ticker bumps the counter too, so every
/// outstanding response becomes stale.
#[derive(Debug, Clone)]
pub struct PollScheduler {
    generation: u64,
    active: Option<String>,
    phase: FetchPhase,
    interval: Duration,
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            generation: 0,
            active: None,
            phase: FetchPhase::Idle,
            interval,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_ticker(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Periodic polling runs only while a ticker is selected.
    pub fn is_polling(&self) -> bool {
        self.active.is_some()
    }

    /// Make `ticker` (already validated) active and issue its first fetch.
    pub fn select(&mut self, ticker: String) -> FetchTicket {
        self.active = Some(ticker);
        self.next_ticket(PollTrigger::TickerChanged)
    }

    /// Issue a fetch for the active ticker.
    pub fn issue(&mut self, trigger: PollTrigger) -> Result<FetchTicket, CoreError> {
        if self.active.is_none() {
            return Err(CoreError::NoTickerSelected);
        }
        Ok(self.next_ticket(trigger))
    }

    /// Stop polling and invalidate every outstanding fetch.
    pub fn clear(&mut self) {
        self.active = None;
        self.generation += 1;
        self.phase = FetchPhase::Idle;
    }

    /// Whether a response for `ticket` may still be applied.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation && self.active.as_deref() == Some(ticket.ticker.as_str())
    }

    /// Mark a response as received. Returns true when it is current, in
    /// which case the cycle goes back to `Idle`. Stale responses leave the
    /// phase alone: the newer request is still in flight.
    pub fn resolve(&mut self, ticket: &FetchTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = FetchPhase::Idle;
        true
    }

    fn next_ticket(&mut self, trigger: PollTrigger) -> FetchTicket {
        self.generation += 1;
        self.phase = FetchPhase::Fetching {
            generation: self.generation,
        };
        FetchTicket {
            // Callers check `active` before reaching here
            ticker: self.active.clone().unwrap_or_default(),
            generation: self.generation,
            trigger,
        }
    }
}
