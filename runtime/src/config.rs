//! Configuration loading and resolution.
//!
//! Later sources override earlier ones: built-in defaults, then the JSON
//! config file, then `URLSENSE_*` environment variables. CLI flags are
//! applied on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Chrome-like user agent; some sites serve different markup to bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/131.0.0.0 Safari/537.36";

/// Tunables for context acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Timeout for the page fetch and the redirect re-check.
    pub fetch_timeout_ms: u64,
    /// Timeout for each WHOIS TCP exchange.
    pub whois_timeout_ms: u64,
    /// Timeout for the reputation search query.
    pub search_timeout_ms: u64,
    /// Redirect limit for the primary fetch.
    pub max_redirects: usize,
    pub user_agent: String,
    /// Root WHOIS server used to find the registry for a TLD.
    pub whois_server: String,
    pub whois_port: u16,
    pub search_enabled: bool,
    pub search_endpoint: String,
    /// CSS selector matching one element per search result.
    pub search_result_selector: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            whois_timeout_ms: 8_000,
            search_timeout_ms: 8_000,
            max_redirects: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            whois_server: "whois.iana.org".to_string(),
            whois_port: 43,
            search_enabled: true,
            search_endpoint: "https://html.duckduckgo.com/html/".to_string(),
            search_result_selector: "a.result__a".to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Resolve the effective configuration.
    ///
    /// `explicit` overrides the config file location. A missing file is
    /// fine; a file that exists but cannot be read or parsed is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(explicit);
        let mut config = match path {
            Some(ref p) if p.exists() => Self::from_file(p)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a JSON config file. Unknown fields are ignored, missing fields
    /// keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Apply `URLSENSE_*` overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("URLSENSE_FETCH_TIMEOUT_MS") {
            self.fetch_timeout_ms = parse_env("URLSENSE_FETCH_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("URLSENSE_WHOIS_TIMEOUT_MS") {
            self.whois_timeout_ms = parse_env("URLSENSE_WHOIS_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("URLSENSE_SEARCH_TIMEOUT_MS") {
            self.search_timeout_ms = parse_env("URLSENSE_SEARCH_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("URLSENSE_MAX_REDIRECTS") {
            self.max_redirects = parse_env("URLSENSE_MAX_REDIRECTS", &v)?;
        }
        if let Some(v) = lookup("URLSENSE_USER_AGENT") {
            self.user_agent = v;
        }
        if let Some(v) = lookup("URLSENSE_WHOIS_SERVER") {
            self.whois_server = v;
        }
        if let Some(v) = lookup("URLSENSE_WHOIS_PORT") {
            self.whois_port = parse_env("URLSENSE_WHOIS_PORT", &v)?;
        }
        if let Some(v) = lookup("URLSENSE_SEARCH_ENABLED") {
            self.search_enabled = parse_bool("URLSENSE_SEARCH_ENABLED", &v)?;
        }
        if let Some(v) = lookup("URLSENSE_SEARCH_ENDPOINT") {
            self.search_endpoint = v;
        }
        if let Some(v) = lookup("URLSENSE_SEARCH_SELECTOR") {
            self.search_result_selector = v;
        }
        Ok(())
    }
}

/// Config file location: explicit path, then `$URLSENSE_CONFIG`, then
/// `~/.urlsense/config.json`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var("URLSENSE_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::home_dir().map(|home| home.join(".urlsense").join("config.json"))
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{key}={value:?}: {e}"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{key}={other:?}: expected a boolean"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_file_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fetch_timeout_ms": 2500, "search_enabled": false}}"#).unwrap();

        let config = ExtractorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.fetch_timeout_ms, 2500);
        assert!(!config.search_enabled);
        assert_eq!(config.whois_server, "whois.iana.org");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(ExtractorConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_explicit_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExtractorConfig::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("URLSENSE_WHOIS_SERVER", "whois.example.net"),
            ("URLSENSE_SEARCH_ENABLED", "off"),
            ("URLSENSE_FETCH_TIMEOUT_MS", "1200"),
        ]
        .into_iter()
        .collect();

        let mut config = ExtractorConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.whois_server, "whois.example.net");
        assert!(!config.search_enabled);
        assert_eq!(config.fetch_timeout_ms, 1200);
    }

    #[test]
    fn test_bad_env_value_is_rejected() {
        let mut config = ExtractorConfig::default();
        let result = config.apply_env(|k| {
            (k == "URLSENSE_WHOIS_PORT").then(|| "forty-three".to_string())
        });
        assert!(result.is_err());
    }
}
