//! Async HTTP fetcher wrapping reqwest.
//!
//! Not a browser, just HTTP requests. One client follows redirects for the
//! page fetch; a second never follows them so the redirect re-check sees the
//! raw 3xx response.

use crate::config::ExtractorConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Status codes reqwest (and browsers) treat as redirects.
const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// Whether a fetch may follow redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Follow,
    Manual,
}

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers (selected subset, lower-case names).
    pub headers: Vec<(String, String)>,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// A redirect is a 3xx status that also carries a `Location` header.
    pub fn is_redirect(&self) -> bool {
        REDIRECT_STATUSES.contains(&self.status) && self.header("location").is_some()
    }
}

/// Page fetcher used by context acquisition.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` once. Any HTTP status is a successful fetch; only transport
    /// failures are errors.
    async fn fetch(&self, url: &str, redirects: RedirectMode) -> Result<HttpResponse>;
}

/// reqwest-backed [`Fetcher`].
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    /// Never follows redirects.
    manual_client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.fetch_timeout_ms);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build HTTP client")?;

        let manual_client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build non-redirecting HTTP client")?;

        Ok(Self {
            client,
            manual_client,
            timeout,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, redirects: RedirectMode) -> Result<HttpResponse> {
        let client = match redirects {
            RedirectMode::Follow => &self.client,
            RedirectMode::Manual => &self.manual_client,
        };

        let r = client.get(url).timeout(self.timeout).send().await?;
        let status = r.status().as_u16();
        let final_url = r.url().to_string();

        let headers: Vec<(String, String)> = r
            .headers()
            .iter()
            .filter(|(k, _)| {
                matches!(
                    k.as_str(),
                    "content-type" | "content-language" | "location" | "server"
                )
            })
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = r.text().await.context("failed to read response body")?;

        Ok(HttpResponse {
            final_url,
            status,
            headers,
            body,
        })
    }
}

/// True when `err` (or its cause chain) is a reqwest timeout.
pub fn is_timeout(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<reqwest::Error>()
            .is_some_and(|e| e.is_timeout())
    })
}
