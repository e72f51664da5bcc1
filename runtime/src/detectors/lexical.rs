//! Detectors over the URL string alone.
//!
//! These never fault and ignore the document and registration entirely, so
//! two contexts with the same URL always agree on them.

use super::{DetectorOutcome, Signal};
use crate::acquisition::ExtractionContext;
use regex::Regex;
use std::sync::OnceLock;

/// URLs shorter than this are unremarkable.
const SHORT_URL_LIMIT: usize = 54;
/// URLs longer than this are phishing-like.
const LONG_URL_LIMIT: usize = 75;

/// Known URL-shortening services.
const SHORTENERS: &[&str] = &[
    "bit.ly", "goo.gl", "shorte.st", "go2l.ink", "x.co", "ow.ly", "t.co", "tinyurl.com", "tr.im",
    "is.gd", "cli.gs", "yfrog.com", "migre.me", "ff.im", "tiny.cc", "url4.eu", "twit.ac", "su.pr",
    "twurl.nl", "snipurl.com", "short.to", "budurl.com", "ping.fm", "post.ly", "just.as",
    "bkite.com", "snipr.com", "fic.kr", "loopt.us", "doiop.com", "short.ie", "kl.am", "wp.me",
    "rubyurl.com", "om.ly", "to.ly", "bit.do", "lnkd.in", "db.tt", "qr.ae", "adf.ly", "bitly.com",
    "cur.lv", "ity.im", "q.gs", "po.st", "bc.vc", "twitthis.com", "u.to", "j.mp", "buzurl.com",
    "cutt.us", "u.bb", "yourls.org", "prettylinkpro.com", "scrnch.me", "filoops.info",
    "vzturl.com", "qr.net", "1url.com", "tweez.me", "v.gd", "link.zip.net",
];

/// #1: host is a literal IP address.
pub fn using_ip(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::flag(ctx.url().host_is_ip()))
}

/// #2: overall URL length in characters.
pub fn long_url(ctx: &ExtractionContext) -> DetectorOutcome {
    let len = ctx.url().url().chars().count();
    Ok(if len < SHORT_URL_LIMIT {
        Signal::Legitimate
    } else if len <= LONG_URL_LIMIT {
        Signal::Suspicious
    } else {
        Signal::Phishing
    })
}

/// #3: host belongs to a URL shortener.
pub fn short_url(ctx: &ExtractionContext) -> DetectorOutcome {
    let host = ctx.url().host().unwrap_or_default();
    Ok(Signal::flag(is_shortener(host)))
}

fn is_shortener(host: &str) -> bool {
    SHORTENERS.iter().any(|s| {
        host == *s
            || host
                .strip_suffix(s)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// #4: `@` anywhere in the URL.
pub fn at_symbol(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::flag(ctx.url().url().contains('@')))
}

/// #5: a `//` past the scheme separator.
pub fn double_slash_redirect(ctx: &ExtractionContext) -> DetectorOutcome {
    let last = ctx.url().url().rfind("//");
    Ok(Signal::flag(last.is_some_and(|pos| pos > 6)))
}

/// #6: hyphenated domain.
pub fn prefix_suffix(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::flag(ctx.url().domain().contains('-')))
}

/// #7: number of dots in the URL.
pub fn sub_domains(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(match ctx.url().url().matches('.').count() {
        1 => Signal::Legitimate,
        2 => Signal::Suspicious,
        _ => Signal::Phishing,
    })
}

/// #8: served over https.
pub fn https_scheme(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::vouch(ctx.url().scheme() == "https"))
}

/// #11: explicit port in the authority.
pub fn non_standard_port(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::flag(ctx.url().domain().contains(':')))
}

/// #12: `https` spelled inside the domain itself.
pub fn https_in_domain(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::flag(ctx.url().domain().contains("https")))
}

/// #18: deeply nested or hyphenated host structure.
pub fn abnormal_url(ctx: &ExtractionContext) -> DetectorOutcome {
    let url = ctx.url().url();
    Ok(Signal::flag(
        abnormal_patterns().iter().any(|re| re.is_match(url)),
    ))
}

fn abnormal_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(\w+)\.\w+\.(\w+)\.(\w+)").expect("abnormal pattern 1 is valid"),
            Regex::new(r"(\w+)\.(\w+)\.\w+\.\w+").expect("abnormal pattern 2 is valid"),
            Regex::new(r"(\w+)-(\w+)\.(\w+)").expect("abnormal pattern 3 is valid"),
        ]
    })
}
