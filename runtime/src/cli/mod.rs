//! CLI subcommand implementations for the urlsense binary.

pub mod config_cmd;
pub mod extract_cmd;
pub mod features_cmd;
pub mod output;

use crate::error::ExtractionError;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so stdout stays
/// machine-readable.
pub fn init_tracing(verbose: bool, json: bool) -> Result<()> {
    let directive = if verbose {
        "urlsense=debug"
    } else {
        "urlsense=info"
    };
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

/// Classify a command failure for JSON error output.
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<ExtractionError>() {
        Some(ExtractionError::Acquisition(_)) => "acquisition",
        Some(ExtractionError::DetectorFault { .. }) => "detector_fault",
        None => "internal",
    }
}
