//! The immutable snapshot every detector reads.

use super::document::PageDocument;
use super::url_parts::UrlParts;
use super::whois::RegistrationRecord;
use crate::error::{AcquisitionError, ProbeError};

/// Everything known about one URL at extraction time.
///
/// Built once by [`Acquirer::acquire`](super::Acquirer::acquire) (or
/// [`ContextBuilder`] for pre-fetched inputs) and never mutated afterwards.
/// The corroborating probes (WHOIS, redirect re-check, search) are kept as
/// outcomes, so a failed probe is visible to the detector that needs it and
/// to nobody else.
#[derive(Debug)]
pub struct ExtractionContext {
    url: UrlParts,
    document: PageDocument,
    registration: Result<RegistrationRecord, ProbeError>,
    redirect_probe: Result<bool, ProbeError>,
    search_probe: Result<u64, ProbeError>,
}

impl ExtractionContext {
    pub(crate) fn new(
        url: UrlParts,
        document: PageDocument,
        registration: Result<RegistrationRecord, ProbeError>,
        redirect_probe: Result<bool, ProbeError>,
        search_probe: Result<u64, ProbeError>,
    ) -> Self {
        Self {
            url,
            document,
            registration,
            redirect_probe,
            search_probe,
        }
    }

    /// Start a frozen context from a URL and an already-fetched body.
    pub fn builder(url: &str, body: &str) -> ContextBuilder {
        ContextBuilder {
            url: url.to_string(),
            body: body.to_string(),
            registration: Err(not_probed()),
            redirect_probe: Err(not_probed()),
            search_probe: Err(not_probed()),
        }
    }

    pub fn url(&self) -> &UrlParts {
        &self.url
    }

    pub fn document(&self) -> &PageDocument {
        &self.document
    }

    /// The registration record, if WHOIS resolution succeeded.
    pub fn registration(&self) -> Option<&RegistrationRecord> {
        self.registration.as_ref().ok()
    }

    pub fn registration_outcome(&self) -> Result<&RegistrationRecord, &ProbeError> {
        self.registration.as_ref()
    }

    /// Whether a non-following re-request answered with a redirect.
    pub fn redirect_probe(&self) -> Result<bool, &ProbeError> {
        self.redirect_probe.as_ref().copied()
    }

    /// Result count of the reputation search query.
    pub fn search_probe(&self) -> Result<u64, &ProbeError> {
        self.search_probe.as_ref().copied()
    }
}

fn not_probed() -> ProbeError {
    ProbeError::Unavailable("not probed".to_string())
}

/// Builds an [`ExtractionContext`] without touching the network.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    url: String,
    body: String,
    registration: Result<RegistrationRecord, ProbeError>,
    redirect_probe: Result<bool, ProbeError>,
    search_probe: Result<u64, ProbeError>,
}

impl ContextBuilder {
    pub fn registration(mut self, record: RegistrationRecord) -> Self {
        self.registration = Ok(record);
        self
    }

    pub fn registration_error(mut self, err: ProbeError) -> Self {
        self.registration = Err(err);
        self
    }

    pub fn redirect(mut self, is_redirect: bool) -> Self {
        self.redirect_probe = Ok(is_redirect);
        self
    }

    pub fn redirect_error(mut self, err: ProbeError) -> Self {
        self.redirect_probe = Err(err);
        self
    }

    pub fn search_results(mut self, count: u64) -> Self {
        self.search_probe = Ok(count);
        self
    }

    pub fn search_error(mut self, err: ProbeError) -> Self {
        self.search_probe = Err(err);
        self
    }

    /// Fails only if the URL cannot be parsed.
    pub fn build(self) -> Result<ExtractionContext, AcquisitionError> {
        let url = UrlParts::parse(&self.url)?;
        Ok(ExtractionContext::new(
            url,
            PageDocument::parse(&self.body),
            self.registration,
            self.redirect_probe,
            self.search_probe,
        ))
    }
}
