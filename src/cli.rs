//! Command-line interface definitions.
//!
//! Every option has a compiled-in default, so running with no arguments
//! watches the built-in targets. Each option can also come from an
//! environment variable.

use crate::registry::{DEFAULT_ALERT_FILE, DEFAULT_STATE_FILE, DEFAULT_TIMEOUT_SECS, DEFAULT_YEAR};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for marathon_watch.
///
/// # Examples
///
/// ```sh
/// # Watch the built-in targets with default files
/// marathon_watch
///
/// # Watch another year and keep state elsewhere
/// marathon_watch --year 2027 --state-file /var/lib/marathon_watch/status.json
///
/// # Use a YAML target list instead of the built-in one
/// marathon_watch --targets targets.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON file recording which years were already notified per target
    #[arg(short, long, env = "MARATHON_WATCH_STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Markdown file written when registration opens
    #[arg(short, long, env = "MARATHON_WATCH_ALERT_FILE", default_value = DEFAULT_ALERT_FILE)]
    pub alert_file: PathBuf,

    /// Registration year to watch for
    #[arg(short, long, env = "MARATHON_WATCH_YEAR", default_value = DEFAULT_YEAR)]
    pub year: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "MARATHON_WATCH_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Optional YAML file replacing the built-in target list
    #[arg(short, long, env = "MARATHON_WATCH_TARGETS")]
    pub targets: Option<PathBuf>,
}
