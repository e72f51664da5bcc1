//! The 30 phishing detectors and their fixed column order.
//!
//! Every detector is a plain `fn(&ExtractionContext) -> DetectorOutcome`:
//! synchronous, side-effect free and blind to the other detectors. A detector
//! that cannot compute its signal returns a [`DetectorFault`]; the assembler
//! turns that into the sentinel for the column.

pub mod content;
pub mod document;
pub mod lexical;
pub mod network;
pub mod registration;

use crate::acquisition::ExtractionContext;
use crate::error::DetectorFault;
use crate::features::FEATURE_DIM;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One detector result. Serialised as `-1`, `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    /// Evidence favours phishing (`-1`).
    Phishing,
    /// Borderline (`0`).
    Suspicious,
    /// Evidence favours legitimacy (`1`).
    Legitimate,
}

impl Signal {
    /// Value substituted when a detector faults.
    pub const SENTINEL: Signal = Signal::Phishing;

    pub fn value(self) -> i8 {
        match self {
            Signal::Phishing => -1,
            Signal::Suspicious => 0,
            Signal::Legitimate => 1,
        }
    }

    /// `Phishing` when the red flag is raised, `Legitimate` otherwise.
    pub fn flag(raised: bool) -> Self {
        if raised {
            Signal::Phishing
        } else {
            Signal::Legitimate
        }
    }

    /// `Legitimate` when the reassuring evidence is present.
    pub fn vouch(present: bool) -> Self {
        Self::flag(!present)
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> i8 {
        signal.value()
    }
}

impl TryFrom<i8> for Signal {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Phishing),
            0 => Ok(Signal::Suspicious),
            1 => Ok(Signal::Legitimate),
            other => Err(format!("signal out of range: {other}")),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

pub type DetectorOutcome = Result<Signal, DetectorFault>;

pub type DetectorFn = fn(&ExtractionContext) -> DetectorOutcome;

/// What a detector looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// The URL string only.
    Lexical,
    /// The WHOIS registration record.
    Whois,
    /// Structure of the parsed document.
    Document,
    /// Raw page text.
    Content,
    /// The no-follow redirect re-check.
    Network,
    /// The search-engine query.
    Reputation,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Family::Lexical => "lexical",
            Family::Whois => "whois",
            Family::Document => "document",
            Family::Content => "content",
            Family::Network => "network",
            Family::Reputation => "reputation",
        };
        f.write_str(s)
    }
}

/// A column of the feature vector.
#[derive(Clone, Copy)]
pub struct DetectorSpec {
    /// Feature name used by the training data.
    pub name: &'static str,
    pub family: Family,
    pub run: DetectorFn,
}

const fn spec(name: &'static str, family: Family, run: DetectorFn) -> DetectorSpec {
    DetectorSpec { name, family, run }
}

/// All detectors in column order. Downstream classifiers are trained on this
/// exact order; never reorder or deduplicate.
pub static DETECTORS: [DetectorSpec; FEATURE_DIM] = [
    spec("UsingIp", Family::Lexical, lexical::using_ip),
    spec("LongUrl", Family::Lexical, lexical::long_url),
    spec("ShortUrl", Family::Lexical, lexical::short_url),
    spec("Symbol@", Family::Lexical, lexical::at_symbol),
    spec("Redirecting//", Family::Lexical, lexical::double_slash_redirect),
    spec("PrefixSuffix-", Family::Lexical, lexical::prefix_suffix),
    spec("SubDomains", Family::Lexical, lexical::sub_domains),
    spec("HTTPS", Family::Lexical, lexical::https_scheme),
    spec("DomainRegLen", Family::Whois, registration::domain_registration_length),
    spec("Favicon", Family::Document, document::favicon),
    spec("NonStdPort", Family::Lexical, lexical::non_standard_port),
    spec("HTTPSDomainURL", Family::Lexical, lexical::https_in_domain),
    spec("RequestURL", Family::Document, document::request_url),
    spec("AnchorURL", Family::Document, document::anchor_url),
    spec("LinksInScriptTags", Family::Document, document::links_in_script_tags),
    spec("ServerFormHandler", Family::Document, document::server_form_handler),
    spec("InfoEmail", Family::Document, document::info_email),
    spec("AbnormalURL", Family::Lexical, lexical::abnormal_url),
    spec("WebsiteForwarding", Family::Network, network::website_forwarding),
    spec("StatusBarCust", Family::Content, content::status_bar_customization),
    spec("DisableRightClick", Family::Content, content::disable_right_click),
    spec("UsingPopupWindow", Family::Content, content::popup_window),
    spec("IframeRedirection", Family::Document, document::iframe_redirection),
    spec("AgeofDomain", Family::Whois, registration::age_of_domain),
    spec("DNSRecording", Family::Whois, registration::dns_recording),
    spec("WebsiteTraffic", Family::Whois, registration::website_traffic),
    spec("PageRank", Family::Reputation, network::page_rank),
    spec("GoogleIndex", Family::Reputation, network::google_index),
    spec("LinksPointingToPage", Family::Document, document::links_pointing_to_page),
    spec("StatsReport", Family::Content, content::stats_report),
];

/// Bucket a percentage: below `low` is legitimate, `low..high` suspicious,
/// `high` and above phishing.
pub(crate) fn bucket(percentage: f64, low: f64, high: f64) -> Signal {
    if percentage < low {
        Signal::Legitimate
    } else if percentage < high {
        Signal::Suspicious
    } else {
        Signal::Phishing
    }
}

/// `part / total` as a percentage; zero when there is nothing to count.
pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_values() {
        assert_eq!(Signal::Phishing.value(), -1);
        assert_eq!(Signal::Suspicious.value(), 0);
        assert_eq!(Signal::Legitimate.value(), 1);
        assert_eq!(Signal::SENTINEL, Signal::Phishing);
        assert_eq!(Signal::flag(true), Signal::Phishing);
        assert_eq!(Signal::vouch(true), Signal::Legitimate);
    }

    #[test]
    fn test_signal_serde() {
        let json = serde_json::to_string(&[Signal::Phishing, Signal::Legitimate]).unwrap();
        assert_eq!(json, "[-1,1]");
        let back: Signal = serde_json::from_str("0").unwrap();
        assert_eq!(back, Signal::Suspicious);
        assert!(serde_json::from_str::<Signal>("2").is_err());
    }

    #[test]
    fn test_bucket_is_half_open() {
        assert_eq!(bucket(21.99, 22.0, 61.0), Signal::Legitimate);
        assert_eq!(bucket(22.0, 22.0, 61.0), Signal::Suspicious);
        assert_eq!(bucket(60.99, 22.0, 61.0), Signal::Suspicious);
        assert_eq!(bucket(61.0, 22.0, 61.0), Signal::Phishing);
    }

    #[test]
    fn test_percentage_of_nothing_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }

    #[test]
    fn test_table_names_are_unique() {
        let mut names: Vec<&str> = DETECTORS.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_DIM);
    }
}
