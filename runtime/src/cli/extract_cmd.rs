//! `urlsense extract <url>`: acquire a page and print its feature vector.

use crate::cli::output::{self, Styled};
use crate::config::ExtractorConfig;
use crate::detectors::DETECTORS;
use crate::features::FeatureReport;
use crate::pipeline::Extractor;
use anyhow::Result;
use clap::ValueEnum;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One row per feature with fault reasons
    Pretty,
    /// Full report as JSON
    Json,
    /// Bare JSON array of 30 integers
    Vector,
    /// Header row plus one data row
    Csv,
}

/// Flags of the `extract` subcommand that override configuration.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub format: OutputFormat,
    pub strict: bool,
    pub no_search: bool,
    pub timeout_ms: Option<u64>,
}

pub async fn run(config_path: Option<&Path>, url: &str, options: ExtractOptions) -> Result<()> {
    let mut config = ExtractorConfig::load(config_path)?;
    if options.no_search {
        config.search_enabled = false;
    }
    if let Some(ms) = options.timeout_ms {
        config.fetch_timeout_ms = ms;
    }

    let extractor = Extractor::from_config(config)?;
    let report = extractor.report(url).await?;
    if options.strict {
        report.clone().into_strict()?;
    }

    // --json implies the JSON report unless a machine format was asked for.
    let format = match options.format {
        OutputFormat::Pretty if output::is_json() => OutputFormat::Json,
        other => other,
    };
    match format {
        OutputFormat::Pretty => print!("{}", render_pretty(&report, &Styled::new())),
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Vector => println!("{}", serde_json::to_string(report.vector())?),
        OutputFormat::Csv => print!("{}", render_csv(&report)),
    }
    Ok(())
}

pub fn render_pretty(report: &FeatureReport, s: &Styled) -> String {
    let mut out = format!("\n  {}\n\n", s.bold(report.url()));
    for (index, (name, signal)) in report.vector().named().enumerate() {
        let reason = report
            .fault(index)
            .map(|f| s.dim(&format!("  ({f})")))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:>2}  {:<21} {}{}\n",
            index + 1,
            name,
            s.signal(signal),
            reason
        ));
    }
    let faults = report.faults().len();
    if faults > 0 {
        out.push_str(&format!(
            "\n  {}\n",
            s.yellow(&format!("{faults} column(s) fell back to -1"))
        ));
    }
    out
}

/// CSV with a `url` column followed by every feature, in column order.
pub fn render_csv(report: &FeatureReport) -> String {
    let header: Vec<&str> = std::iter::once("url")
        .chain(DETECTORS.iter().map(|d| d.name))
        .collect();
    let values: Vec<String> = report
        .vector()
        .values()
        .iter()
        .map(|v| v.to_string())
        .collect();
    format!(
        "{}\n{},{}\n",
        header.join(","),
        csv_field(report.url()),
        values.join(",")
    )
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
