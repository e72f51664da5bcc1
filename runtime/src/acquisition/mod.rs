//! Context acquisition: turn a URL into an [`ExtractionContext`].
//!
//! The page fetch is mandatory evidence; if it fails, acquisition fails.
//! WHOIS, the redirect re-check and the search query are corroborating
//! evidence: they run concurrently, each under its own timeout, and their
//! failures are recorded in the context instead of aborting.

pub mod context;
pub mod document;
pub mod http_client;
pub mod search;
pub mod url_parts;
pub mod whois;

pub use context::{ContextBuilder, ExtractionContext};
pub use document::PageDocument;
pub use url_parts::UrlParts;
pub use whois::RegistrationRecord;

use crate::config::ExtractorConfig;
use crate::error::{AcquisitionError, ProbeError};
use anyhow::Result;
use http_client::{Fetcher, HttpFetcher, RedirectMode};
use search::{DisabledReputation, HttpSearchClient, ReputationClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use whois::{RegistrationResolver, WhoisResolver};

/// Upper bound on WHOIS exchanges per lookup (root, registry, registrar).
const WHOIS_EXCHANGES: u32 = 3;

/// Bundles the external collaborators used to build contexts.
#[derive(Clone)]
pub struct Acquirer {
    config: ExtractorConfig,
    fetcher: Arc<dyn Fetcher>,
    resolver: Arc<dyn RegistrationResolver>,
    reputation: Arc<dyn ReputationClient>,
}

impl Acquirer {
    pub fn new(
        config: ExtractorConfig,
        fetcher: Arc<dyn Fetcher>,
        resolver: Arc<dyn RegistrationResolver>,
        reputation: Arc<dyn ReputationClient>,
    ) -> Self {
        Self {
            config,
            fetcher,
            resolver,
            reputation,
        }
    }

    /// Wire up the default network-backed collaborators.
    pub fn from_config(config: ExtractorConfig) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config)?);
        let resolver: Arc<dyn RegistrationResolver> = Arc::new(WhoisResolver::new(&config));
        let reputation: Arc<dyn ReputationClient> = if config.search_enabled {
            Arc::new(HttpSearchClient::new(&config)?)
        } else {
            Arc::new(DisabledReputation)
        };
        Ok(Self::new(config, fetcher, resolver, reputation))
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Fetch and probe `url`, producing a frozen context.
    pub async fn acquire(&self, url: &str) -> Result<ExtractionContext, AcquisitionError> {
        let parts = UrlParts::parse(url)?;
        if !parts.is_http() {
            return Err(AcquisitionError::UnsupportedScheme(parts.scheme().to_string()));
        }

        info!(url, "acquiring extraction context");
        let page = self.fetch_page(url).await?;

        let (registration, redirect_probe, search_probe) = tokio::join!(
            self.resolve_registration(&parts),
            self.probe_redirect(url),
            self.probe_reputation(url),
        );

        if let Err(e) = &registration {
            warn!(url, "registration lookup degraded: {e}");
        }
        if let Err(e) = &redirect_probe {
            warn!(url, "redirect re-check degraded: {e}");
        }
        if let Err(e) = &search_probe {
            warn!(url, "reputation query degraded: {e}");
        }

        // Parsed last: the document is !Send and must not live across an await.
        let document = PageDocument::parse(&page.body);
        info!(
            url,
            final_url = %page.final_url,
            status = page.status,
            bytes = page.body.len(),
            "context acquired"
        );

        Ok(ExtractionContext::new(
            parts,
            document,
            registration,
            redirect_probe,
            search_probe,
        ))
    }

    async fn fetch_page(&self, url: &str) -> Result<http_client::HttpResponse, AcquisitionError> {
        let timeout_ms = self.config.fetch_timeout_ms;
        let outcome = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.fetcher.fetch(url, RedirectMode::Follow),
        )
        .await;

        match outcome {
            Ok(Ok(page)) => Ok(page),
            Ok(Err(e)) if http_client::is_timeout(&e) => Err(AcquisitionError::Timeout {
                url: url.to_string(),
                timeout_ms,
            }),
            Ok(Err(e)) => Err(AcquisitionError::Fetch {
                url: url.to_string(),
                source: e,
            }),
            Err(_) => Err(AcquisitionError::Timeout {
                url: url.to_string(),
                timeout_ms,
            }),
        }
    }

    async fn resolve_registration(
        &self,
        parts: &UrlParts,
    ) -> Result<RegistrationRecord, ProbeError> {
        if parts.host_is_ip() {
            return Err(ProbeError::Unavailable("literal IP host".to_string()));
        }
        let limit = Duration::from_millis(self.config.whois_timeout_ms) * WHOIS_EXCHANGES;
        tokio::time::timeout(limit, self.resolver.resolve(parts.domain()))
            .await
            .map_err(|_| ProbeError::Timeout(limit))?
    }

    async fn probe_redirect(&self, url: &str) -> Result<bool, ProbeError> {
        let limit = Duration::from_millis(self.config.fetch_timeout_ms);
        match tokio::time::timeout(limit, self.fetcher.fetch(url, RedirectMode::Manual)).await {
            Ok(Ok(resp)) => Ok(resp.is_redirect()),
            Ok(Err(e)) if http_client::is_timeout(&e) => Err(ProbeError::Timeout(limit)),
            Ok(Err(e)) => Err(ProbeError::Network(format!("{e:#}"))),
            Err(_) => Err(ProbeError::Timeout(limit)),
        }
    }

    async fn probe_reputation(&self, url: &str) -> Result<u64, ProbeError> {
        let limit = Duration::from_millis(self.config.search_timeout_ms);
        tokio::time::timeout(limit, self.reputation.query(url))
            .await
            .map_err(|_| ProbeError::Timeout(limit))?
    }
}
