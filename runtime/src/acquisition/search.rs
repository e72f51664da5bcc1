//! Web-search reputation client.
//!
//! Counts how many results a search engine returns for the exact URL. The
//! count is a weak index-presence proxy; any failure (network, rate limiting,
//! unexpected markup) is reported as a [`ProbeError`] and the reputation
//! columns fall back to their sentinel.

use crate::config::ExtractorConfig;
use crate::error::ProbeError;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;

/// Queries an external search engine for a URL.
#[async_trait]
pub trait ReputationClient: Send + Sync {
    /// Number of results returned for `url`.
    async fn query(&self, url: &str) -> Result<u64, ProbeError>;
}

/// Reputation client used when searching is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledReputation;

#[async_trait]
impl ReputationClient for DisabledReputation {
    async fn query(&self, _url: &str) -> Result<u64, ProbeError> {
        Err(ProbeError::Unavailable("search disabled".to_string()))
    }
}

/// Scrapes an HTML search results page.
#[derive(Clone)]
pub struct HttpSearchClient {
    client: reqwest::Client,
    endpoint: String,
    result_selector: String,
    timeout: Duration,
}

impl HttpSearchClient {
    pub fn new(config: &ExtractorConfig) -> anyhow::Result<Self> {
        // Fail at construction instead of on every query.
        Selector::parse(&config.search_result_selector).map_err(|e| {
            anyhow::anyhow!(
                "invalid search_result_selector {:?}: {e:?}",
                config.search_result_selector
            )
        })?;

        let timeout = Duration::from_millis(config.search_timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.search_endpoint.clone(),
            result_selector: config.search_result_selector.clone(),
            timeout,
        })
    }
}

#[async_trait]
impl ReputationClient for HttpSearchClient {
    async fn query(&self, url: &str) -> Result<u64, ProbeError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", url)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout(self.timeout)
                } else {
                    ProbeError::Network(e.to_string())
                }
            })?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(ProbeError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProbeError::Network(format!("search returned HTTP {status}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ProbeError::Network(e.to_string()))?;
        count_results(&body, &self.result_selector)
    }
}

/// Count elements matching `selector` in a results page.
pub fn count_results(body: &str, selector: &str) -> Result<u64, ProbeError> {
    let selector = Selector::parse(selector)
        .map_err(|e| ProbeError::Malformed(format!("selector {selector:?}: {e:?}")))?;
    let document = Html::parse_document(body);
    Ok(document.select(&selector).count() as u64)
}
