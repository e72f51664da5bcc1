//! Detectors over the WHOIS registration record.

use super::{DetectorOutcome, Signal};
use crate::acquisition::{ExtractionContext, RegistrationRecord};
use crate::error::DetectorFault;
use chrono::Datelike;

fn record(ctx: &ExtractionContext) -> Result<&RegistrationRecord, DetectorFault> {
    ctx.registration_outcome()
        .map_err(|e| DetectorFault::Probe(e.clone()))
}

/// Whole months between creation and expiration, ignoring days.
pub fn registration_months(record: &RegistrationRecord) -> Result<i64, DetectorFault> {
    let created = record
        .creation_date
        .ok_or(DetectorFault::MissingField("creation_date"))?;
    let expires = record
        .expiration_date
        .ok_or(DetectorFault::MissingField("expiration_date"))?;
    Ok(i64::from(expires.year() - created.year()) * 12 + i64::from(expires.month())
        - i64::from(created.month()))
}

/// #9: registered for at least a year.
pub fn domain_registration_length(ctx: &ExtractionContext) -> DetectorOutcome {
    let months = registration_months(record(ctx)?)?;
    Ok(Signal::vouch(months >= 12))
}

/// #24: registered for at least six months.
pub fn age_of_domain(ctx: &ExtractionContext) -> DetectorOutcome {
    let months = registration_months(record(ctx)?)?;
    Ok(Signal::vouch(months >= 6))
}

/// #25: the record names the domain.
pub fn dns_recording(ctx: &ExtractionContext) -> DetectorOutcome {
    let named = record(ctx)?
        .domain_name
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    Ok(Signal::vouch(named))
}

/// #26: traffic proxy. Reads the same signal as [`dns_recording`]; the column
/// exists separately because trained models expect it.
pub fn website_traffic(ctx: &ExtractionContext) -> DetectorOutcome {
    dns_recording(ctx)
}
