use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::extractor::ExtractMode;
use crate::replacer;
use crate::report;
use crate::resolver::{self, CheckResult};

pub fn run(
    config: &Config,
    dir: Option<PathBuf>,
    output: Option<PathBuf>,
    apply: bool,
    yes: bool,
) -> Result<()> {
    println!("=== i18n-agent check ===\n");

    let dir = super::target_dir(dir);
    let result = check_project(config, &dir)?;
    let text = report::key_check_report(&result);
    println!("{}", text);

    if let Some(path) = output {
        std::fs::write(&path, &text)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    if result.need_replace.is_empty() {
        println!("\nAll translation calls already use dictionary keys.");
        return Ok(());
    }

    if !apply {
        println!(
            "\nRun with --apply to rewrite {} call(s) to their keys.",
            result.need_replace.len()
        );
        return Ok(());
    }

    let jobs = replacer::plan_replacements(&result.need_replace);
    let question = format!("\nRewrite translation calls in {} file(s)?", jobs.len());
    if !yes && !super::confirm(&question) {
        println!("\nReplacement cancelled.");
        return Ok(());
    }

    let outcome = replacer::batch_replace(&jobs, false);
    println!("{}", report::replacement_report(&outcome));
    if !outcome.failed.is_empty() {
        bail!("{} file(s) could not be updated", outcome.failed.len());
    }

    Ok(())
}

/// Scan translation calls under `dir` and classify them against the remote dictionary
pub(crate) fn check_project(config: &Config, dir: &Path) -> Result<CheckResult> {
    let loaded = super::load_remote_dictionary(config)?;

    println!("Scanning translation calls in {}...", dir.display());
    let scan = super::scan_with_config(config, dir, ExtractMode::Calls);
    println!(
        "  {} call(s), {} unique text(s) in {} file(s)\n",
        scan.summary.total_texts, scan.summary.unique_texts, scan.summary.files_with_texts
    );
    for error in &scan.errors {
        println!("  ! {}: {}", error.file_path, error.message);
    }

    let result = resolver::classify(&scan.unique_texts, &loaded.dictionary)?;
    Ok(result)
}
