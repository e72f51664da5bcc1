//! `urlsense features`: list the vector columns.

use crate::cli::output::{self, Styled};
use crate::detectors::DETECTORS;
use anyhow::Result;

pub fn run() -> Result<()> {
    if output::is_json() {
        let columns: Vec<_> = DETECTORS
            .iter()
            .enumerate()
            .map(|(index, d)| {
                serde_json::json!({
                    "index": index,
                    "name": d.name,
                    "family": d.family,
                })
            })
            .collect();
        output::print_json(&columns);
        return Ok(());
    }

    let s = Styled::new();
    println!("  {}", s.bold("#   Feature               Family"));
    for (index, d) in DETECTORS.iter().enumerate() {
        println!("  {:<3} {:<21} {}", index + 1, d.name, s.dim(&d.family.to_string()));
    }
    Ok(())
}
