//! Error taxonomy for the extraction engine.
//!
//! Two tiers. [`AcquisitionError`] is fatal: the URL could not be parsed or
//! the page could not be fetched, so no vector is produced. Everything else
//! ([`ProbeError`], [`DetectorFault`]) is recoverable and ends up as the
//! sentinel value of a single column.

use crate::acquisition::document::QueryError;
use std::time::Duration;

/// Fatal failure while building an [`ExtractionContext`](crate::acquisition::ExtractionContext).
#[derive(thiserror::Error, Debug)]
pub enum AcquisitionError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported scheme {0:?} (only http and https can be fetched)")]
    UnsupportedScheme(String),

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("fetching {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },
}

/// Failure of a corroborating collaborator (WHOIS, redirect re-check, search).
///
/// Stored inside the context instead of being propagated.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("probe unavailable: {0}")]
    Unavailable(String),

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited by upstream")]
    RateLimited,

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Why a single detector could not compute its real signal.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorFault {
    #[error("registration field `{0}` missing or unparseable")]
    MissingField(&'static str),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Document(#[from] QueryError),

    #[error("detector panicked: {0}")]
    Panicked(String),
}

/// Error returned to callers of the full extraction pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ExtractionError {
    /// Could not reach or parse the target.
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    /// A detector faulted and the caller asked for strict evaluation.
    #[error("detector {feature} faulted: {fault}")]
    DetectorFault {
        feature: &'static str,
        fault: DetectorFault,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_error_wraps_into_extraction_error() {
        let err: ExtractionError = AcquisitionError::UnsupportedScheme("ftp".into()).into();
        assert!(matches!(err, ExtractionError::Acquisition(_)));
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_probe_error_is_transparent_in_fault() {
        let fault = DetectorFault::from(ProbeError::RateLimited);
        assert_eq!(fault.to_string(), "rate limited by upstream");
    }
}
