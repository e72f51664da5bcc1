//! Detectors over the structure of the fetched page.
//!
//! "Foreign" throughout means: the reference contains neither the full URL
//! nor the domain under inspection.

use super::{bucket, percentage, DetectorOutcome, Signal};
use crate::acquisition::ExtractionContext;
use regex::Regex;
use std::sync::OnceLock;

/// Media elements whose `src` counts towards #13.
const MEDIA_TAGS: [&str; 4] = ["img", "audio", "embed", "iframe"];
/// Elements whose `src` counts towards #15.
const SCRIPT_TAGS: [&str; 2] = ["link", "script"];

fn references_self(ctx: &ExtractionContext, target: &str) -> bool {
    let domain = ctx.url().domain();
    target.contains(ctx.url().url()) || (!domain.is_empty() && target.contains(domain))
}

/// #10: a `<link>` in `<head>` points back at this site.
pub fn favicon(ctx: &ExtractionContext) -> DetectorOutcome {
    let links = ctx.document().elements_within("head", "link")?;
    let found = links
        .iter()
        .filter_map(|link| link.attr("href"))
        .any(|href| references_self(ctx, href));
    Ok(Signal::vouch(found))
}

/// #13: share of embedded media loaded from elsewhere.
pub fn request_url(ctx: &ExtractionContext) -> DetectorOutcome {
    let mut total = 0;
    let mut foreign = 0;
    for tag in MEDIA_TAGS {
        for src in ctx.document().attr_values(tag, "src")? {
            total += 1;
            // A single dot marks a bare relative file name like `logo.png`.
            let relative = src.matches('.').count() == 1;
            if !(references_self(ctx, src) || relative) {
                foreign += 1;
            }
        }
    }
    Ok(bucket(percentage(foreign, total), 22.0, 61.0))
}

/// #14: share of anchors that go nowhere or somewhere else.
pub fn anchor_url(ctx: &ExtractionContext) -> DetectorOutcome {
    let hrefs = ctx.document().attr_values("a", "href")?;
    if hrefs.is_empty() {
        return Ok(Signal::Phishing);
    }
    let unsafe_count = hrefs
        .iter()
        .filter(|href| {
            let lower = href.to_lowercase();
            href.contains('#')
                || lower.contains("javascript")
                || lower.contains("mailto")
                || !references_self(ctx, href)
        })
        .count();
    Ok(bucket(percentage(unsafe_count, hrefs.len()), 31.0, 67.0))
}

/// #15: share of `<link>`/`<script>` sources served from elsewhere.
pub fn links_in_script_tags(ctx: &ExtractionContext) -> DetectorOutcome {
    let mut total = 0;
    let mut foreign = 0;
    for tag in SCRIPT_TAGS {
        for src in ctx.document().attr_values(tag, "src")? {
            total += 1;
            if !references_self(ctx, src) {
                foreign += 1;
            }
        }
    }
    Ok(bucket(percentage(foreign, total), 17.0, 81.0))
}

/// #16: the page has a form.
pub fn server_form_handler(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::vouch(ctx.document().has("form")?))
}

/// #17: an email address embedded in script code.
pub fn info_email(ctx: &ExtractionContext) -> DetectorOutcome {
    let re = email_pattern();
    let found = ctx
        .document()
        .inline_scripts()?
        .iter()
        .any(|body| re.is_match(body));
    Ok(Signal::flag(found))
}

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+").expect("email regex is valid")
    })
}

/// #23: the page embeds an iframe.
pub fn iframe_redirection(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::flag(ctx.document().has("iframe")?))
}

/// #29: the page has any anchors at all.
pub fn links_pointing_to_page(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::vouch(ctx.document().has("a")?))
}
