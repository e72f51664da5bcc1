//! Domain registration lookup over the WHOIS protocol (RFC 3912).
//!
//! The root server (IANA by default) names the registry WHOIS server for a
//! TLD; the registry answer may in turn point at a registrar server, which is
//! queried once more. Every exchange is a fresh TCP connection bounded by a
//! timeout, closed when the stream drops.
//!
//! ## Field normalisation
//!
//! Registries disagree on field names and may repeat a field, so each field
//! collects every candidate line. [`RegistrationRecord::from_raw`] collapses
//! them: the first non-empty domain name and the first date that parses.

use crate::config::ExtractorConfig;
use crate::error::ProbeError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::net::IpAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Replies larger than this are truncated.
const MAX_REPLY_BYTES: u64 = 512 * 1024;

const DOMAIN_KEYS: &[&str] = &["domain name", "domain", "domainname", "domain_name"];

const CREATION_KEYS: &[&str] = &[
    "creation date",
    "created",
    "created on",
    "created date",
    "creation time",
    "registered",
    "registered on",
    "registration date",
    "registration time",
    "domain registration date",
    "domain create date",
];

const EXPIRATION_KEYS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiration time",
    "expiry date",
    "expires",
    "expires on",
    "expire date",
    "paid-till",
    "renewal date",
    "domain expiration date",
];

const REGISTRAR_SERVER_KEYS: &[&str] = &["registrar whois server", "whois server"];

/// Registration facts consumed by the WHOIS detectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationRecord {
    pub domain_name: Option<String>,
    pub creation_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
}

/// Unnormalised candidate values, in reply order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRegistration {
    pub domain_names: Vec<String>,
    pub creation_dates: Vec<String>,
    pub expiration_dates: Vec<String>,
    pub registrar_server: Option<String>,
}

impl RawRegistration {
    /// Append another reply's candidates after this one's.
    fn merge(&mut self, other: RawRegistration) {
        self.domain_names.extend(other.domain_names);
        self.creation_dates.extend(other.creation_dates);
        self.expiration_dates.extend(other.expiration_dates);
    }

    fn is_empty(&self) -> bool {
        self.domain_names.is_empty()
            && self.creation_dates.is_empty()
            && self.expiration_dates.is_empty()
    }
}

impl RegistrationRecord {
    pub fn from_raw(raw: &RawRegistration) -> Self {
        Self {
            domain_name: raw
                .domain_names
                .iter()
                .map(|d| d.trim().to_ascii_lowercase())
                .find(|d| !d.is_empty()),
            creation_date: raw.creation_dates.iter().find_map(|d| parse_whois_date(d)),
            expiration_date: raw.expiration_dates.iter().find_map(|d| parse_whois_date(d)),
        }
    }
}

/// Resolves registration records for a domain.
#[async_trait]
pub trait RegistrationResolver: Send + Sync {
    /// `domain` is the URL authority as written (may carry port/userinfo).
    async fn resolve(&self, domain: &str) -> Result<RegistrationRecord, ProbeError>;
}

/// [`RegistrationResolver`] speaking WHOIS over TCP.
#[derive(Debug, Clone)]
pub struct WhoisResolver {
    root_server: String,
    port: u16,
    timeout: Duration,
}

impl WhoisResolver {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            root_server: config.whois_server.clone(),
            port: config.whois_port,
            timeout: Duration::from_millis(config.whois_timeout_ms),
        }
    }

    async fn query(&self, server: &str, query: &str) -> Result<String, ProbeError> {
        tokio::time::timeout(self.timeout, self.exchange(server, query))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
    }

    async fn exchange(&self, server: &str, query: &str) -> Result<String, ProbeError> {
        let mut stream = TcpStream::connect((server, self.port))
            .await
            .map_err(|e| ProbeError::Network(format!("{server}:{}: {e}", self.port)))?;
        stream
            .write_all(format!("{query}\r\n").as_bytes())
            .await
            .map_err(|e| ProbeError::Network(e.to_string()))?;

        let mut reply = Vec::new();
        (&mut stream)
            .take(MAX_REPLY_BYTES)
            .read_to_end(&mut reply)
            .await
            .map_err(|e| ProbeError::Network(e.to_string()))?;
        Ok(String::from_utf8_lossy(&reply).into_owned())
    }
}

#[async_trait]
impl RegistrationResolver for WhoisResolver {
    async fn resolve(&self, domain: &str) -> Result<RegistrationRecord, ProbeError> {
        let lookup = registrable_domain(domain).ok_or_else(|| {
            ProbeError::Unavailable(format!("no registrable domain in {domain:?}"))
        })?;
        let tld = lookup.rsplit('.').next().unwrap_or(&lookup).to_string();

        let root_reply = self.query(&self.root_server, &tld).await?;
        let registry = referral_server(&root_reply)
            .ok_or_else(|| ProbeError::Unavailable(format!("no WHOIS server for .{tld}")))?;
        debug!(domain = %lookup, server = %registry, "querying registry WHOIS");

        let mut raw = parse_reply(&self.query(&registry, &lookup).await?);

        if let Some(registrar) = raw.registrar_server.clone() {
            let registrar = registrar.trim_start_matches("whois://").to_string();
            if !registrar.eq_ignore_ascii_case(&registry) {
                // The registry answer already stands on its own; a failing
                // registrar server only loses the extra candidates.
                match self.query(&registrar, &lookup).await {
                    Ok(reply) => raw.merge(parse_reply(&reply)),
                    Err(e) => debug!(server = %registrar, "registrar WHOIS failed: {e}"),
                }
            }
        }

        if raw.is_empty() {
            return Err(ProbeError::Unavailable(format!("no WHOIS record for {lookup}")));
        }
        Ok(RegistrationRecord::from_raw(&raw))
    }
}

/// Reduce a URL authority to the name a registry knows about.
///
/// Strips userinfo, port and a trailing dot, then asks the public suffix
/// list for the registrable domain (`shop.example.co.uk` -> `example.co.uk`).
/// Literal IPs, single-label hosts and bare public suffixes have none.
pub fn registrable_domain(authority: &str) -> Option<String> {
    let host = authority.rsplit('@').next().unwrap_or(authority);
    if host.starts_with('[') {
        return None;
    }
    let host = match host.rsplit_once(':') {
        Some((h, port)) if port.chars().all(|c| c.is_ascii_digit()) => h,
        _ => host,
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() || host.parse::<IpAddr>().is_ok() {
        return None;
    }
    psl::domain_str(&host).map(str::to_string)
}

/// `refer:` or `whois:` line of a root-server reply.
fn referral_server(reply: &str) -> Option<String> {
    fields(reply)
        .find(|(key, _)| key == "refer" || key == "whois")
        .map(|(_, value)| value.to_string())
}

/// Collect candidate values from a WHOIS reply.
pub fn parse_reply(reply: &str) -> RawRegistration {
    let mut raw = RawRegistration::default();
    for (key, value) in fields(reply) {
        let key = key.as_str();
        if DOMAIN_KEYS.contains(&key) {
            raw.domain_names.push(value.to_string());
        } else if CREATION_KEYS.contains(&key) {
            raw.creation_dates.push(value.to_string());
        } else if EXPIRATION_KEYS.contains(&key) {
            raw.expiration_dates.push(value.to_string());
        } else if REGISTRAR_SERVER_KEYS.contains(&key) && raw.registrar_server.is_none() {
            raw.registrar_server = Some(value.to_string());
        }
    }
    raw
}

/// Non-comment `key: value` lines with lower-cased keys and non-empty values.
fn fields(reply: &str) -> impl Iterator<Item = (String, &str)> {
    reply.lines().filter_map(|line| {
        let line = line.trim();
        if line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>") {
            return None;
        }
        let (key, value) = line.split_once(':')?;
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Some((key.trim().to_ascii_lowercase(), value))
    })
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%d-%b-%Y", "%d-%B-%Y", "%d.%m.%Y", "%d/%m/%Y", "%Y%m%d",
    "%b %d %Y",
];

/// Parse the date formats registries commonly emit.
pub fn parse_whois_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    // Drop trailing zone names ("UTC", "GMT") and annotations in parentheses.
    let cleaned = value
        .split('(')
        .next()
        .unwrap_or(value)
        .trim()
        .trim_end_matches(" UTC")
        .trim_end_matches(" GMT")
        .trim_end_matches('Z')
        .trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.date_naive());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(cleaned, fmt) {
            return Some(d);
        }
    }
    let first = cleaned.split_whitespace().next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(first, fmt).ok())
}
