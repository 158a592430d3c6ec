//! Registration detection rules.
//!
//! A page qualifies for a target when its text carries the year (if
//! required), at least one positive keyword and no negative keyword, and,
//! when the target lists link patterns, at least one anchor `href` matches
//! one of them.

use crate::fetcher::PageSource;
use crate::models::{AnalysisResult, Target};
use crate::utils::truncate_for_log;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::RegexBuilder;
use scraper::{Html, Node, Selector};
use tracing::{debug, info, instrument, warn};

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static selector parses"));

/// Elements whose text is code or inert markup, not something a visitor reads.
const NON_VISIBLE_ELEMENTS: [&str; 3] = ["script", "style", "template"];

/// Text and link view of a fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageView {
    /// Every non-empty text node outside `script`/`style`/`template`,
    /// trimmed and joined with a single space.
    pub text: String,
    /// Non-empty `href` of every anchor, in document order.
    pub hrefs: Vec<String>,
}

impl PageView {
    /// Parse HTML leniently; broken markup just yields less text or fewer links.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let text = document
            .root_element()
            .descendants()
            .filter_map(|node| {
                let Node::Text(text) = node.value() else {
                    return None;
                };
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| NON_VISIBLE_ELEMENTS.contains(&el.name()))
                });
                (!hidden).then(|| text.trim())
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let hrefs = document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|a| a.value().attr("href"))
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();

        Self { text, hrefs }
    }
}

/// Whether the page text reads as "registration for `year` is open".
///
/// Negative keywords always win over positive ones.
pub fn text_signals_open(text: &str, target: &Target, year: &str) -> bool {
    let text = text.to_lowercase();

    if target.require_year && !text.contains(year) {
        return false;
    }
    if !target
        .positive_keywords
        .iter()
        .any(|k| text.contains(&k.to_lowercase()))
    {
        return false;
    }
    if target
        .negative_keywords
        .iter()
        .any(|k| text.contains(&k.to_lowercase()))
    {
        return false;
    }
    true
}

/// Whether any pattern (case-insensitive) matches any href.
///
/// Patterns that fail to compile are logged and skipped.
pub fn links_match_patterns(hrefs: &[String], patterns: &[String]) -> bool {
    for pattern in patterns {
        let rx = match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(rx) => rx,
            Err(e) => {
                warn!(%pattern, error = %e, "Skipping invalid link pattern");
                continue;
            }
        };
        if hrefs.iter().any(|h| rx.is_match(h)) {
            return true;
        }
    }
    false
}

/// Check a target's candidate URLs in order and return the first that qualifies.
///
/// Each URL is fetched, parsed into a [`PageView`] and run through
/// [`text_signals_open`] and, when the target has link patterns,
/// [`links_match_patterns`]. A page whose text qualifies but whose links do
/// not is "not yet confirmed": the next candidate URL is still tried.
///
/// # Arguments
///
/// * `source` - Where pages are fetched from
/// * `target` - The target whose URLs and rules are used
/// * `year` - The registration year to look for
///
/// # Returns
///
/// The first qualifying URL with the detection time, or `None` when no
/// candidate qualifies (including when the target has no URLs).
#[instrument(level = "info", skip_all, fields(target_id = %target.id, %year))]
pub async fn analyze_target<S: PageSource>(
    source: &S,
    target: &Target,
    year: &str,
) -> Option<AnalysisResult> {
    for url in &target.urls {
        let Some(html) = source.fetch(url).await else {
            debug!(%url, "No content; trying next URL");
            continue;
        };

        let page = PageView::parse(&html);
        if !text_signals_open(&page.text, target, year) {
            debug!(%url, preview = %truncate_for_log(&page.text, 200), "No open signals in text");
            continue;
        }

        if let Some(patterns) = target.link_patterns() {
            if !links_match_patterns(&page.hrefs, patterns) {
                info!(%url, links = page.hrefs.len(), "Open signals but no registration link yet");
                continue;
            }
        }

        info!(%url, "Registration looks open");
        return Some(AnalysisResult {
            url: url.clone(),
            detected_at: Utc::now(),
        });
    }
    None
}
