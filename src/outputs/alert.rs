//! Markdown alert document.
//!
//! The notifier sends the file verbatim whenever it exists and is non-empty,
//! so it is only written for runs with new detections and removed otherwise.

use crate::models::Alert;
use crate::utils::host_of;
use itertools::Itertools;
use std::error::Error;
use std::fmt::Write;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Render one section per alert, or `None` for an empty batch.
pub fn compose_alert(alerts: &[Alert]) -> Option<String> {
    if alerts.is_empty() {
        return None;
    }

    let years = alerts.iter().map(|a| a.year.as_str()).unique().join(", ");

    let mut md = String::new();
    let _ = writeln!(md, "# Inscrições abertas {years}\n");
    for alert in alerts {
        let _ = writeln!(md, "## {} - detectado em {}", alert.target_name, alert.result.url);
        let _ = writeln!(md);
        let _ = writeln!(md, "- Ano: **{}**", alert.year);
        let _ = writeln!(md, "- Página analisada: `{}`", host_of(&alert.result.url));
        let _ = writeln!(
            md,
            "- Critérios: termos de abertura + {} e link de inscrição presente",
            alert.year
        );
        let _ = writeln!(md);
    }
    Some(md)
}

/// Replace the alert document at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_alert(path: &Path, document: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, document).await?;
    info!(bytes = document.len(), "Wrote alert document");
    Ok(())
}

/// Remove an alert document left over from an earlier run.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn clear_stale_alert(path: &Path) -> Result<(), Box<dyn Error>> {
    match fs::remove_file(path).await {
        Ok(()) => {
            info!("Removed stale alert document");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
