use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::extractor::ExtractMode;
use crate::report;

const LIST_LIMIT: usize = 50;

pub fn run(
    config: &Config,
    dir: Option<PathBuf>,
    extensions: Vec<String>,
    exclude: Vec<String>,
    output: Option<PathBuf>,
    raw: bool,
) -> Result<()> {
    println!("=== i18n-agent scan ===\n");

    let mut config = config.clone();
    if !extensions.is_empty() {
        config.scan.extensions = extensions;
    }
    if !exclude.is_empty() {
        config.scan.exclude_dirs = exclude;
    }
    let dir = super::target_dir(dir);
    let mode = if raw {
        ExtractMode::RawText
    } else {
        ExtractMode::Calls
    };

    println!("Configuration:");
    println!("  Directory: {}", dir.display());
    println!("  Extensions: {:?}", config.scan.extensions);
    println!("  Excluded directories: {:?}", config.scan.exclude_dirs);
    println!(
        "  Mode: {}",
        if raw { "raw text" } else { "translation calls" }
    );
    println!();

    let result = super::scan_with_config(&config, &dir, mode);

    if result.unique_texts.is_empty() {
        println!("No texts found.");
    } else {
        println!("Unique texts:");
        println!("{}", "-".repeat(60));
        for entry in result.unique_texts.iter().take(LIST_LIMIT) {
            println!(
                "  [{:?}] {} ({} site(s))",
                entry.language,
                entry.text,
                entry.occurrences.len()
            );
        }
        if result.unique_texts.len() > LIST_LIMIT {
            println!("  ... and {} more", result.unique_texts.len() - LIST_LIMIT);
        }
        println!("{}", "-".repeat(60));
    }

    println!("\n{}", report::scan_report(&result));

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&path, format!("{}\n", json))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Scan result written to {}", path.display());
    }

    Ok(())
}
