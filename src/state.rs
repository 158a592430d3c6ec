//! Persistence of the notified-years ledger.
//!
//! Loading never fails: a missing or unreadable file falls back to a fresh
//! state. Saving writes a sibling temp file and renames it into place so a
//! crash mid-write leaves the previous file intact.

use crate::models::{State, Target};
use std::error::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// Read and parse the state file.
async fn read_state(path: &Path) -> Result<State, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// Load the state at `path`, or a fresh one for `targets` if that fails.
///
/// There are exactly two outcomes: the file parses and is used, or anything
/// goes wrong (missing, unreadable, not valid JSON, wrong shape) and a fresh
/// state is built instead. A missing file is logged at info, anything else
/// at warn.
///
/// # Arguments
///
/// * `path` - Location of the JSON state file
/// * `targets` - The configured targets; each gets a record if absent
///
/// # Returns
///
/// The loaded state with every target present. Targets missing from a
/// parsed file get an empty record; records for unknown ids are kept.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_state(path: &Path, targets: &[Target]) -> State {
    match read_state(path).await {
        Ok(mut state) => {
            state.ensure_targets(targets);
            info!(targets = state.targets.len(), "Loaded state");
            state
        }
        Err(e) => {
            let missing = e
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == ErrorKind::NotFound);
            if missing {
                info!("No state file yet; starting fresh");
            } else {
                warn!(error = %e, "Unreadable state file; starting fresh");
            }
            State::fresh(targets)
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize `state` (sorted keys, two-space indent) and replace the file at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn save_state(path: &Path, state: &State) -> Result<(), Box<dyn Error>> {
    let mut json = serde_json::to_string_pretty(state)?;
    json.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, json).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    info!(targets = state.targets.len(), "Saved state");
    Ok(())
}
