//! End-to-end extraction: URL in, feature vector out.

use crate::acquisition::Acquirer;
use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::features::{self, FeatureReport, FeatureVector};
use tracing::info;

/// Primary entry point. Every call re-fetches and re-resolves; nothing is
/// cached between URLs.
#[derive(Clone)]
pub struct Extractor {
    acquirer: Acquirer,
    strict: bool,
}

impl Extractor {
    pub fn new(acquirer: Acquirer) -> Self {
        Self {
            acquirer,
            strict: false,
        }
    }

    pub fn from_config(config: ExtractorConfig) -> anyhow::Result<Self> {
        Ok(Self::new(Acquirer::from_config(config)?))
    }

    /// Treat any detector fault as an error instead of the sentinel.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        self.acquirer.config()
    }

    /// Acquire `url` and run every detector over it.
    pub async fn report(&self, url: &str) -> Result<FeatureReport, ExtractionError> {
        let ctx = self.acquirer.acquire(url).await?;
        let report = features::assemble(&ctx);
        info!(
            url,
            faults = report.faults().len(),
            "feature vector assembled"
        );
        Ok(report)
    }

    pub async fn extract(&self, url: &str) -> Result<FeatureVector, ExtractionError> {
        let report = self.report(url).await?;
        if self.strict {
            report.into_strict()
        } else {
            Ok(report.into_vector())
        }
    }
}
