//! Test doubles shared across module tests.

use crate::fetcher::PageSource;
use crate::models::Target;
use std::cell::RefCell;
use std::collections::HashMap;

/// Serves canned pages by URL and records every URL requested.
#[derive(Debug, Default)]
pub struct FakeSource {
    pages: HashMap<String, String>,
    requested: RefCell<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl PageSource for FakeSource {
    async fn fetch(&self, url: &str) -> Option<String> {
        self.requested.borrow_mut().push(url.to_string());
        self.pages.get(url).filter(|body| !body.is_empty()).cloned()
    }
}

/// A Mendoza-like target with a single candidate URL.
pub fn sample_target(id: &str, url: &str) -> Target {
    Target {
        id: id.to_string(),
        name: format!("Maratón de {id}"),
        urls: vec![url.to_string()],
        positive_keywords: vec!["inscripciones".to_string(), "registration".to_string()],
        negative_keywords: vec!["cerradas".to_string(), "sold out".to_string()],
        require_year: true,
        must_have_link_patterns: Some(vec![r"eventick\.com\.ar".to_string(), "/register".to_string()]),
    }
}

/// An "open registration" page that satisfies [`sample_target`].
pub const OPEN_PAGE: &str = r#"<html><body>
<h1>Maratón 2026</h1>
<p>Ya están abiertas las inscripciones.</p>
<a href="https://www.eventick.com.ar/maraton-2026">Inscribite</a>
</body></html>"#;
