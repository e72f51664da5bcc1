// Copyright 2026 Urlsense Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use urlsense::cli::{self, extract_cmd::OutputFormat};

#[derive(Parser)]
#[command(
    name = "urlsense",
    about = "Urlsense: phishing feature extraction for URLs",
    version,
    after_help = "Run 'urlsense <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file (default: $URLSENSE_CONFIG or ~/.urlsense/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the feature vector for a URL
    Extract {
        /// URL to inspect (http or https)
        url: String,
        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        format: OutputFormat,
        /// Fail if any detector could not compute its value
        #[arg(long)]
        strict: bool,
        /// Skip the search-engine query (reputation columns fall back to -1)
        #[arg(long)]
        no_search: bool,
        /// Page fetch timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List the feature columns in vector order
    Features,
    /// Show the effective configuration
    Config,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("URLSENSE_JSON", "1");
    }
    if cli.no_color {
        std::env::set_var("URLSENSE_NO_COLOR", "1");
    }

    cli::init_tracing(cli.verbose, cli.log_json)?;

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Extract {
            url,
            format,
            strict,
            no_search,
            timeout,
        } => {
            let options = cli::extract_cmd::ExtractOptions {
                format,
                strict,
                no_search,
                timeout_ms: timeout,
            };
            cli::extract_cmd::run(config_path, &url, options).await
        }
        Commands::Features => cli::features_cmd::run(),
        Commands::Config => cli::config_cmd::run(config_path),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "urlsense", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "kind": cli::error_kind(e),
                "message": format!("{e:#}"),
            }));
        } else {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
