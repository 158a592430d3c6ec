//! # marathon_watch
//!
//! Watches marathon event pages and emits a one-time Markdown alert the first
//! time online registration for a given year looks open.
//!
//! ## Usage
//!
//! ```sh
//! marathon_watch
//! marathon_watch --year 2027 --targets targets.yaml
//! ```
//!
//! ## Pipeline
//!
//! 1. **State**: load `status.json` (fresh state if missing or corrupt)
//! 2. **Fetch**: download each candidate URL of every target not yet notified
//! 3. **Analyze**: year, positive/negative keywords and registration links
//! 4. **Alert**: write `alert.md` when something new opened
//! 5. **Persist**: save the updated `status.json`
//!
//! Scheduling and sending the alert are left to the caller (e.g. a cron job
//! that mails `alert.md` when it exists).

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analyzer;
mod cli;
mod fetcher;
mod models;
mod monitor;
mod outputs;
mod registry;
mod state;
#[cfg(test)]
mod testing;
mod utils;

use cli::Cli;
use fetcher::HttpFetcher;
use monitor::RunOptions;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("marathon_watch starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let targets = registry::load_targets(args.targets.as_deref()).await?;
    info!(count = targets.len(), year = %args.year, "Watching targets");

    let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout_secs))?;
    let options = RunOptions {
        state_file: args.state_file,
        alert_file: args.alert_file,
        year: args.year,
    };

    let summary = monitor::run(&options, &targets, &fetcher).await?;
    if summary.alerts > 0 {
        info!(
            alerts = summary.alerts,
            path = %options.alert_file.display(),
            "Alerts generated"
        );
    } else {
        info!("Nothing open yet");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        checked = summary.checked,
        skipped = summary.skipped,
        alerts = summary.alerts,
        "Execution complete"
    );

    Ok(())
}
