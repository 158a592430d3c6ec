//! Data models for monitored targets, detections and the persisted state.
//!
//! - [`Target`]: one monitored event with its detection rules
//! - [`AnalysisResult`]: the URL that qualified and when
//! - [`Alert`]: a new detection waiting to be rendered
//! - [`State`] / [`TargetState`]: the durable notified-years ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A monitored event page group.
///
/// The `id` is the key in the state file, so it must stay stable across runs.
/// URLs are tried in order and the first qualifying page wins.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Target {
    /// Stable identifier used as the state key.
    pub id: String,
    /// Display name used in the alert document.
    pub name: String,
    /// Candidate URLs, checked in order.
    pub urls: Vec<String>,
    /// Case-insensitive substrings signalling that registration is open.
    pub positive_keywords: Vec<String>,
    /// Case-insensitive substrings signalling that registration is closed.
    /// Any match vetoes the page.
    #[serde(default)]
    pub negative_keywords: Vec<String>,
    /// Whether the literal year must appear in the page text.
    #[serde(default = "default_require_year")]
    pub require_year: bool,
    /// Regexes of which at least one must match some anchor `href`.
    #[serde(default)]
    pub must_have_link_patterns: Option<Vec<String>>,
}

fn default_require_year() -> bool {
    true
}

impl Target {
    /// Configured link patterns, treating an empty list as "no requirement".
    pub fn link_patterns(&self) -> Option<&[String]> {
        self.must_have_link_patterns
            .as_deref()
            .filter(|patterns| !patterns.is_empty())
    }
}

/// A page that passed every check for a target.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// The candidate URL that qualified.
    pub url: String,
    /// When the detection happened.
    pub detected_at: DateTime<Utc>,
}

/// A new opening detected during this run.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub target_id: String,
    pub target_name: String,
    pub year: String,
    pub result: AnalysisResult,
}

/// Per-target record in the state file.
///
/// Keys other than `notified_years` are kept so that saving never drops
/// data written by a newer version.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TargetState {
    #[serde(default)]
    pub notified_years: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// The persisted notification ledger, keyed by target id.
///
/// Backed by a `BTreeMap` so serialization has a stable key order.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct State {
    pub targets: BTreeMap<String, TargetState>,
}

impl State {
    /// A state with every target present and nothing notified yet.
    pub fn fresh(targets: &[Target]) -> Self {
        let mut state = State::default();
        state.ensure_targets(targets);
        state
    }

    /// Add an empty record for any target missing from the state.
    ///
    /// Entries for ids that are no longer configured are left alone.
    pub fn ensure_targets(&mut self, targets: &[Target]) {
        for target in targets {
            self.targets.entry(target.id.clone()).or_default();
        }
    }

    /// Whether an alert was already emitted for `(target_id, year)`.
    pub fn is_notified(&self, target_id: &str, year: &str) -> bool {
        self.targets
            .get(target_id)
            .is_some_and(|t| t.notified_years.iter().any(|y| y == year))
    }

    /// Record `year` for `target_id`. Returns `false` if it was already there.
    pub fn mark_notified(&mut self, target_id: &str, year: &str) -> bool {
        let entry = self.targets.entry(target_id.to_string()).or_default();
        if entry.notified_years.iter().any(|y| y == year) {
            return false;
        }
        entry.notified_years.push(year.to_string());
        true
    }
}
