//! `urlsense config`: show the effective configuration.

use crate::cli::output::{self, Styled};
use crate::config::{resolve_config_path, ExtractorConfig};
use anyhow::Result;
use std::path::Path;

pub fn run(explicit: Option<&Path>) -> Result<()> {
    let config = ExtractorConfig::load(explicit)?;

    if !output::is_json() {
        let s = Styled::new();
        let source = match resolve_config_path(explicit) {
            Some(p) if p.exists() => p.display().to_string(),
            Some(p) => format!("{} (not found, using defaults)", p.display()),
            None => "defaults".to_string(),
        };
        eprintln!("  {}", s.dim(&format!("config: {source}")));
    }
    output::print_json(&config);
    Ok(())
}
