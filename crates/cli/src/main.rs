//! Stock dashboard CLI.
//!
//! Commands:
//! - `analyze`: fetch one ticker once and print the derived snapshot
//! - `watch`: keep polling a ticker, printing every refresh and alert
//! - `export`: fetch one ticker and write the windowed series as CSV

mod logger;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stock_analytics_core::models::analysis::AnalysisSnapshot;
use stock_analytics_core::models::settings::Settings;
use stock_analytics_core::models::window::TimeRange;
use stock_analytics_core::poller::{run_poll_loop, PollCommand, PollEvent};
use stock_analytics_core::services::poll_scheduler::FetchOutcome;
use stock_analytics_core::StockDashboard;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "stock-dashboard",
    about = "Stock dashboard: signals, volatility, charts and alerts from an analysis service"
)]
struct Cli {
    /// Analysis service base URL. Repeat to add fallbacks.
    #[arg(long = "service-url", global = true)]
    service_urls: Vec<String>,

    /// Days of history to request.
    #[arg(long, global = true)]
    days: Option<u32>,

    /// Verbose (debug) logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a ticker once and print its snapshot.
    Analyze {
        /// Ticker symbol (e.g., AAPL).
        ticker: String,

        /// Chart range: 1D, 5D, 1M, 6M, YTD, 1Y, 5Y, Max.
        #[arg(long, default_value = "1M")]
        range: TimeRange,

        /// Print the snapshot as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Poll a ticker until Ctrl-C.
    Watch {
        /// Ticker symbol (e.g., AAPL).
        ticker: String,

        /// Chart range: 1D, 5D, 1M, 6M, YTD, 1Y, 5Y, Max.
        #[arg(long, default_value = "1M")]
        range: TimeRange,

        /// Poll period in seconds (clamped to 30-60).
        #[arg(long)]
        poll_secs: Option<u64>,

        /// Alert when the close reaches this price.
        #[arg(long)]
        alert: Option<f64>,
    },
    /// Fetch a ticker and write its windowed series to a CSV file.
    Export {
        /// Ticker symbol (e.g., AAPL).
        ticker: String,

        /// Output file.
        #[arg(long, short)]
        out: PathBuf,

        /// Chart range: 1D, 5D, 1M, 6M, YTD, 1Y, 5Y, Max.
        #[arg(long, default_value = "Max")]
        range: TimeRange,

        /// First date to include (YYYY-MM-DD).
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last date to include (YYYY-MM-DD).
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::setup_logger(cli.verbose)?;

    let mut settings = Settings::from_env().context("invalid STOCK_* environment")?;
    if !cli.service_urls.is_empty() {
        settings.service_urls = cli.service_urls.clone();
    }
    if let Some(days) = cli.days {
        settings.history_days = days;
    }

    match cli.command {
        Commands::Analyze {
            ticker,
            range,
            json,
        } => cmd_analyze(settings, &ticker, range, json).await,
        Commands::Watch {
            ticker,
            range,
            poll_secs,
            alert,
        } => {
            if let Some(secs) = poll_secs {
                settings.poll_interval_secs = secs;
            }
            settings.default_range = range;
            cmd_watch(settings, ticker, alert).await
        }
        Commands::Export {
            ticker,
            out,
            range,
            from,
            to,
        } => cmd_export(settings, &ticker, &out, range, from, to).await,
    }
}

/// Select, fetch once and return the dashboard, failing on a fetch error.
async fn fetch_once(settings: Settings, ticker: &str, range: TimeRange) -> Result<StockDashboard> {
    let mut dashboard = StockDashboard::new(settings)?;
    dashboard.select_ticker(ticker)?;
    let now = Local::now().naive_local();
    dashboard.select_range(range, now);

    match dashboard.analyze(now).await? {
        FetchOutcome::Failed { error, .. } => Err(error.into()),
        _ => Ok(dashboard),
    }
}

async fn cmd_analyze(settings: Settings, ticker: &str, range: TimeRange, json: bool) -> Result<()> {
    let dashboard = fetch_once(settings, ticker, range).await?;
    let snapshot = dashboard
        .snapshot()
        .context("no snapshot was derived")?;

    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        print_snapshot(snapshot);
    }
    Ok(())
}

async fn cmd_watch(settings: Settings, ticker: String, alert: Option<f64>) -> Result<()> {
    let dashboard = StockDashboard::new(settings)?;
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, mut event_rx) = mpsc::channel(64);
    let handle = tokio::spawn(run_poll_loop(dashboard, cmd_rx, event_tx));

    cmd_tx.send(PollCommand::SelectTicker(ticker)).await?;
    let mut alert_pending = alert;

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    PollEvent::Applied(snapshot) => {
                        print_snapshot(&snapshot);
                        // Arming needs a current price
                        if let Some(threshold) = alert_pending.take() {
                            cmd_tx.send(PollCommand::SetAlert(threshold)).await?;
                        }
                    }
                    PollEvent::Rederived(snapshot) => print_snapshot(&snapshot),
                    PollEvent::AlertArmed(a) => {
                        info!(ticker = %a.ticker, threshold = a.threshold_price, "alert armed");
                    }
                    PollEvent::AlertFired(e) => {
                        println!(
                            "*** ALERT {}: close {:.2} reached {:.2} at {}",
                            e.ticker, e.price, e.threshold_price, e.at
                        );
                    }
                    PollEvent::AlertRearmed { ticker } => info!(%ticker, "alert re-armed"),
                    PollEvent::Failed { ticker, error } => {
                        warn!(%ticker, error = %error, "refresh failed, showing last data");
                    }
                    PollEvent::Rejected(error) => {
                        warn!(error = %error, "command rejected");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                let _ = cmd_tx.send(PollCommand::Shutdown).await;
                break;
            }
        }
    }

    // The loop may be blocked publishing; closing both ends unblocks it
    drop(event_rx);
    drop(cmd_tx);
    let dashboard = handle.await?;
    info!(generation = dashboard.generation(), "poll loop finished");
    Ok(())
}

async fn cmd_export(
    settings: Settings,
    ticker: &str,
    out: &Path,
    range: TimeRange,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let dashboard = fetch_once(settings, ticker, range).await?;
    let now = Local::now().naive_local();
    let rows = dashboard
        .export_csv_to_file(out, range, from, to, now)
        .with_context(|| format!("failed to export to {}", out.display()))?;
    println!("Wrote {rows} rows to {}", out.display());
    Ok(())
}

fn print_snapshot(snapshot: &AnalysisSnapshot) {
    let s = &snapshot.summary;
    println!("── {} ({} records, {}) ──", snapshot.ticker, snapshot.record_count, snapshot.range);
    println!(
        "Price {:.2}  Change {:+.2} ({:+.2}%)  Volume {}",
        s.price, s.change, s.change_pct, s.volume
    );
    println!(
        "RSI {:.1}  MA20 {:.2}  MA50 {:.2}  Support {:.2}  Resistance {:.2}  Score {:.1}",
        s.rsi, s.ma20, s.ma50, s.support, s.resistance, s.score
    );

    let rec = &snapshot.recommendation;
    println!("Recommendation: {} (avg score {:.2})", rec.decision, rec.average_score);
    for line in &rec.rationale {
        println!("  [{}] {}", line.signal, line.message);
    }

    let vol = &snapshot.volatility;
    println!("Volatility: {} (ATR {:.2}, gauge {})", vol.tier, vol.atr, vol.gauge);

    if !snapshot.rsi_trail.is_empty() {
        let trail: Vec<String> = snapshot
            .rsi_trail
            .iter()
            .map(|p| format!("{} {:.1}", p.label, p.value))
            .collect();
        println!("RSI trail: {}", trail.join(" | "));
    }

    if let Some(last) = snapshot.chart.last() {
        println!(
            "Chart: {} points, last {} close {:.2} ({:+.2})",
            snapshot.chart.len(),
            last.point.label,
            last.point.record.close,
            last.delta()
        );
    }

    let outlook = &snapshot.outlook;
    if let Some(action) = &outlook.trade_action {
        println!("Model: {action}");
    }
    if let Some(prediction) = outlook.prediction {
        println!("Predicted price: {prediction:.2}");
    }
    if let Some(status) = &outlook.trade_status {
        println!("Trade: {status}");
    }
    if !outlook.top_signals.is_empty() {
        println!("Top signals: {}", outlook.top_signals.len());
    }
}
