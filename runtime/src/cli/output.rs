//! Shared CLI output formatting: colors, signal symbols, JSON mode.

use crate::detectors::Signal;
use serde::Serialize;
use std::io::IsTerminal;

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // Respect NO_COLOR env (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() || std::env::var("URLSENSE_NO_COLOR").is_ok() {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Check if JSON output mode is active.
pub fn is_json() -> bool {
    std::env::var("URLSENSE_JSON").is_ok()
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("  Error: failed to serialise output: {e}"),
    }
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    /// Never emits escape codes.
    pub fn plain() -> Self {
        Self { use_color: false }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    /// Signal value right-aligned to two columns, colored by verdict.
    pub fn signal(&self, signal: Signal) -> String {
        let text = format!("{:>2}", signal.value());
        match signal {
            Signal::Phishing => self.red(&text),
            Signal::Suspicious => self.yellow(&text),
            Signal::Legitimate => self.green(&text),
        }
    }
}
