//! Detectors over the network probes captured during acquisition.
//!
//! The probes themselves run in [`Acquirer`](crate::acquisition::Acquirer);
//! these functions only read their recorded outcomes.

use super::{DetectorOutcome, Signal};
use crate::acquisition::ExtractionContext;
use crate::error::DetectorFault;

/// #19: re-requesting without following redirects yields a redirect.
pub fn website_forwarding(ctx: &ExtractionContext) -> DetectorOutcome {
    let redirected = ctx
        .redirect_probe()
        .map_err(|e| DetectorFault::Probe(e.clone()))?;
    Ok(Signal::flag(redirected))
}

fn indexed(ctx: &ExtractionContext) -> Result<bool, DetectorFault> {
    ctx.search_probe()
        .map(|count| count > 0)
        .map_err(|e| DetectorFault::Probe(e.clone()))
}

/// #27: the search engine knows the URL.
pub fn page_rank(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::vouch(indexed(ctx)?))
}

/// #28: index presence. Reads the same query as [`page_rank`]; kept as its
/// own column for trained models.
pub fn google_index(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::vouch(indexed(ctx)?))
}
