//! One monitoring pass over every target.
//!
//! Targets already notified for the year are skipped without any request.
//! The alert document is written before the state is saved, so a crash in
//! between re-sends the alert on the next run instead of losing it.

use crate::analyzer::analyze_target;
use crate::fetcher::PageSource;
use crate::models::{Alert, State, Target};
use crate::outputs::alert::{clear_stale_alert, compose_alert, write_alert};
use crate::state::{load_state, save_state};
use itertools::Itertools;
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Where a run reads and writes, and which year it watches.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub state_file: PathBuf,
    pub alert_file: PathBuf,
    pub year: String,
}

/// Counters for the end-of-run log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Targets that were analyzed.
    pub checked: usize,
    /// Targets skipped because they were already notified.
    pub skipped: usize,
    /// New detections.
    pub alerts: usize,
}

/// Analyze every target not yet notified for `year`, recording new detections in `state`.
#[instrument(level = "info", skip_all, fields(%year))]
pub async fn check_targets<S: PageSource>(
    targets: &[Target],
    state: &mut State,
    source: &S,
    year: &str,
) -> (Vec<Alert>, RunSummary) {
    let mut alerts = Vec::new();
    let mut summary = RunSummary::default();

    for target in targets {
        if state.is_notified(&target.id, year) {
            info!(target_id = %target.id, "Already notified; skipping");
            summary.skipped += 1;
            continue;
        }

        summary.checked += 1;
        let Some(result) = analyze_target(source, target, year).await else {
            info!(target_id = %target.id, "Nothing open yet");
            continue;
        };

        info!(
            target_id = %target.id,
            url = %result.url,
            detected_at = %result.detected_at,
            "New opening detected"
        );
        state.mark_notified(&target.id, year);
        alerts.push(Alert {
            target_id: target.id.clone(),
            target_name: target.name.clone(),
            year: year.to_string(),
            result,
        });
    }

    summary.alerts = alerts.len();
    (alerts, summary)
}

/// Load state, check targets, emit the alert document and persist state.
#[instrument(level = "info", skip_all, fields(year = %options.year))]
pub async fn run<S: PageSource>(
    options: &RunOptions,
    targets: &[Target],
    source: &S,
) -> Result<RunSummary, Box<dyn Error>> {
    let mut state = load_state(&options.state_file, targets).await;
    let (alerts, summary) = check_targets(targets, &mut state, source, &options.year).await;

    if !alerts.is_empty() {
        let ids = alerts.iter().map(|a| a.target_id.as_str()).join(", ");
        info!(targets = %ids, "Writing alert document");
    }
    match compose_alert(&alerts) {
        Some(document) => write_alert(&options.alert_file, &document).await?,
        None => clear_stale_alert(&options.alert_file).await?,
    }
    save_state(&options.state_file, &state).await?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSource, OPEN_PAGE, sample_target};
    use std::path::Path;

    const MENDOZA: &str = "https://maratondemendoza.com/";
    const PATAGONIA: &str = "https://www.patagonianinternationalmarathon.com/en/registration";

    fn options(dir: &Path) -> RunOptions {
        RunOptions {
            state_file: dir.join("status.json"),
            alert_file: dir.join("alert.md"),
            year: "2026".to_string(),
        }
    }

    fn targets() -> Vec<Target> {
        vec![sample_target("mendoza", MENDOZA), sample_target("patagonia", PATAGONIA)]
    }

    #[tokio::test]
    async fn test_open_page_alerts_and_records_year() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let source = FakeSource::new().with_page(MENDOZA, OPEN_PAGE);

        let summary = run(&opts, &targets(), &source).await.unwrap();
        assert_eq!(summary, RunSummary { checked: 2, skipped: 0, alerts: 1 });

        let state = load_state(&opts.state_file, &targets()).await;
        assert_eq!(state.targets["mendoza"].notified_years, vec!["2026"]);
        assert!(state.targets["patagonia"].notified_years.is_empty());

        let doc = std::fs::read_to_string(&opts.alert_file).unwrap();
        assert!(doc.contains("Maratón de mendoza"));
        assert!(doc.contains("`maratondemendoza.com`"));
    }

    #[tokio::test]
    async fn test_closed_page_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let closed = format!("{OPEN_PAGE}<p>Inscripciones cerradas</p>");
        let source = FakeSource::new().with_page(MENDOZA, &closed);

        let summary = run(&opts, &targets(), &source).await.unwrap();
        assert_eq!(summary.alerts, 0);

        let state = load_state(&opts.state_file, &targets()).await;
        assert_eq!(state, State::fresh(&targets()));
        assert!(!opts.alert_file.exists());
    }

    #[tokio::test]
    async fn test_keywords_without_link_are_not_confirmed() {
        let mut state = State::fresh(&targets());
        let source = FakeSource::new().with_page(MENDOZA, "<p>inscripciones 2026</p>");

        let (alerts, _) = check_targets(&targets()[..1], &mut state, &source, "2026").await;
        assert!(alerts.is_empty());
        assert!(!state.is_notified("mendoza", "2026"));
    }

    #[tokio::test]
    async fn test_already_notified_target_is_not_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        std::fs::write(
            &opts.state_file,
            r#"{"mendoza": {"notified_years": ["2026"]}, "patagonia": {"notified_years": []}}"#,
        )
        .unwrap();
        let source = FakeSource::new().with_page(MENDOZA, OPEN_PAGE);

        let summary = run(&opts, &targets(), &source).await.unwrap();
        assert_eq!(summary, RunSummary { checked: 1, skipped: 1, alerts: 0 });
        assert_eq!(source.requested(), vec![PATAGONIA]);
        assert!(!opts.alert_file.exists());

        let state = load_state(&opts.state_file, &targets()).await;
        assert_eq!(state.targets["mendoza"].notified_years, vec!["2026"]);
    }

    #[tokio::test]
    async fn test_second_run_never_duplicates_year() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let source = FakeSource::new().with_page(MENDOZA, OPEN_PAGE);

        run(&opts, &targets(), &source).await.unwrap();
        assert!(opts.alert_file.exists());

        let summary = run(&opts, &targets(), &source).await.unwrap();
        assert_eq!(summary.alerts, 0);
        assert!(!opts.alert_file.exists());

        let state = load_state(&opts.state_file, &targets()).await;
        assert_eq!(state.targets["mendoza"].notified_years, vec!["2026"]);
    }

    #[tokio::test]
    async fn test_two_openings_make_two_sections() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let source = FakeSource::new()
            .with_page(MENDOZA, OPEN_PAGE)
            .with_page(PATAGONIA, OPEN_PAGE);

        let summary = run(&opts, &targets(), &source).await.unwrap();
        assert_eq!(summary.alerts, 2);

        let doc = std::fs::read_to_string(&opts.alert_file).unwrap();
        assert_eq!(doc.lines().filter(|l| l.starts_with("## ")).count(), 2);
        assert!(doc.contains("`www.patagonianinternationalmarathon.com`"));
    }

    #[tokio::test]
    async fn test_new_year_alerts_again() {
        let mut state = State::fresh(&targets());
        state.mark_notified("mendoza", "2025");
        let page = OPEN_PAGE.replace("2026", "2027");
        let source = FakeSource::new().with_page(MENDOZA, &page);

        let (alerts, _) = check_targets(&targets()[..1], &mut state, &source, "2027").await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(state.targets["mendoza"].notified_years, vec!["2025", "2027"]);
    }

    #[tokio::test]
    async fn test_corrupt_state_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        std::fs::write(&opts.state_file, "not json at all").unwrap();
        let source = FakeSource::new();

        let summary = run(&opts, &targets(), &source).await.unwrap();
        assert_eq!(summary.checked, 2);

        let state = load_state(&opts.state_file, &targets()).await;
        assert_eq!(state, State::fresh(&targets()));
    }
}
