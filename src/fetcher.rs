//! Best-effort page fetching.
//!
//! [`PageSource`] is the seam between the analyzer and the network. A fetch
//! either yields the page body or nothing; failures never cross into the
//! analyzer as errors.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; GH-RegistrationsBot/1.0; +https://github.com/)";
const ACCEPT_LANGUAGE_VALUE: &str = "es-ES,es;q=0.9,en;q=0.8,pt-BR;q=0.7";

/// Something that can fetch a page body by URL.
pub trait PageSource {
    /// Fetch `url`, returning `None` when there is no usable content.
    async fn fetch(&self, url: &str) -> Option<String>;
}

/// [`PageSource`] backed by a single `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

/// Client settings shared by every fetch: timeout, User-Agent and Accept-Language.
fn client_builder(timeout: Duration) -> reqwest::ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .default_headers(headers)
}

impl HttpFetcher {
    /// Build a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let client = client_builder(timeout).build()?;
        Ok(Self { client })
    }
}

impl PageSource for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Request failed");
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%status, "Unexpected status");
            return None;
        }

        match response.text().await {
            Ok(body) if !body.is_empty() => {
                debug!(bytes = body.len(), "Fetched page");
                Some(body)
            }
            Ok(_) => {
                warn!("Empty body");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed reading body");
                None
            }
        }
    }
}
