//! URL decomposition for the lexical detectors.
//!
//! The `url` crate validates and normalises the URL, but several rules need
//! the authority exactly as the user wrote it (`user@host:8080` keeps its
//! `@` and `:`), so `domain` is sliced out of the original string.

use crate::error::AcquisitionError;
use url::{Host, Url};

/// Parsed components of the URL under inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    url: String,
    scheme: String,
    domain: String,
    host: Option<String>,
    host_is_ip: bool,
    path: String,
}

impl UrlParts {
    /// Parse `raw`. Any scheme is accepted here; acquisition rejects
    /// non-HTTP schemes separately.
    pub fn parse(raw: &str) -> Result<Self, AcquisitionError> {
        let parsed = Url::parse(raw).map_err(|e| AcquisitionError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        let host_is_ip = matches!(parsed.host(), Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)));
        let host = parsed.host_str().map(|h| h.to_ascii_lowercase());

        Ok(Self {
            url: raw.to_string(),
            scheme: parsed.scheme().to_string(),
            domain: raw_authority(raw, &parsed),
            host,
            host_is_ip,
            path: parsed.path().to_string(),
        })
    }

    /// The original, unparsed URL string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Lower-cased scheme (`http`, `https`, ...).
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Authority as written: may include userinfo and port.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Normalised host name without port or userinfo.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Whether the host is a literal IPv4 or IPv6 address.
    pub fn host_is_ip(&self) -> bool {
        self.host_is_ip
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_http(&self) -> bool {
        matches!(self.scheme.as_str(), "http" | "https")
    }
}

/// Slice the authority component out of the raw URL string.
///
/// Special schemes parse without `//` (`http:example.com`, `http:\\example.com`);
/// those have no authority as written, so it is rebuilt from the parsed URL.
fn raw_authority(raw: &str, parsed: &Url) -> String {
    let after_scheme = raw.trim().get(parsed.scheme().len() + 1..).unwrap_or("");
    let written = after_scheme.strip_prefix("//").map(|rest| {
        let end = rest
            .find(|c: char| matches!(c, '/' | '?' | '#' | '\\'))
            .unwrap_or(rest.len());
        &rest[..end]
    });
    match written {
        Some(authority) if !authority.is_empty() => authority.to_string(),
        _ => parsed_authority(parsed),
    }
}

fn parsed_authority(parsed: &Url) -> String {
    let mut authority = String::new();
    if !parsed.username().is_empty() {
        authority.push_str(parsed.username());
        if let Some(password) = parsed.password() {
            authority.push(':');
            authority.push_str(password);
        }
        authority.push('@');
    }
    authority.push_str(parsed.host_str().unwrap_or_default());
    if let Some(port) = parsed.port() {
        authority.push_str(&format!(":{port}"));
    }
    authority
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_components() {
        let parts = UrlParts::parse("https://shop.example.com/cart?id=3").unwrap();
        assert_eq!(parts.scheme(), "https");
        assert_eq!(parts.domain(), "shop.example.com");
        assert_eq!(parts.host(), Some("shop.example.com"));
        assert_eq!(parts.path(), "/cart");
        assert!(!parts.host_is_ip());
    }

    #[test]
    fn test_domain_keeps_port_and_userinfo() {
        let parts = UrlParts::parse("http://admin@login-portal.example.com:8080/x").unwrap();
        assert_eq!(parts.domain(), "admin@login-portal.example.com:8080");
        assert_eq!(parts.host(), Some("login-portal.example.com"));
    }

    #[test]
    fn test_default_port_survives_in_domain() {
        // url::Url drops the default port; the raw authority must not.
        let parts = UrlParts::parse("http://example.com:80/").unwrap();
        assert_eq!(parts.domain(), "example.com:80");
    }

    #[test]
    fn test_authority_without_slashes_is_rebuilt() {
        let parts = UrlParts::parse("http:example.com/login").unwrap();
        assert_eq!(parts.domain(), "example.com");
        assert_eq!(parts.host(), Some("example.com"));

        let parts = UrlParts::parse(r"http:\\example.com:8080\login").unwrap();
        assert_eq!(parts.domain(), "example.com:8080");

        assert_eq!(UrlParts::parse("http:/example.com").unwrap().domain(), "example.com");
        assert_eq!(UrlParts::parse("http:///example.com/").unwrap().domain(), "example.com");
    }

    #[test]
    fn test_scheme_separator_in_query_is_not_the_authority() {
        let parts = UrlParts::parse("http:example.com/?next=https://evil.net/").unwrap();
        assert_eq!(parts.domain(), "example.com");
    }

    #[test]
    fn test_ip_hosts() {
        assert!(UrlParts::parse("http://192.168.1.10/login").unwrap().host_is_ip());
        assert!(UrlParts::parse("http://[::1]:8080/").unwrap().host_is_ip());
        assert!(!UrlParts::parse("http://10.example.com/").unwrap().host_is_ip());
    }

    #[test]
    fn test_invalid_url() {
        let err = UrlParts::parse("not a url").unwrap_err();
        assert!(matches!(err, AcquisitionError::InvalidUrl { .. }));
    }

    #[test]
    fn test_non_http_scheme_parses_but_is_flagged() {
        let parts = UrlParts::parse("ftp://files.example.com/a").unwrap();
        assert!(!parts.is_http());
    }
}
