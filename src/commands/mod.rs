pub mod check;
pub mod init;
pub mod projects;
pub mod scan;
pub mod translate;
pub mod update;
pub mod upload;

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::dedup::{self, ScanOptions, ScanResult};
use crate::dictionary::{self, LoadedDictionary};
use crate::extractor::ExtractMode;
use crate::http::CdnFetcher;
use crate::uploader::UploadBackend;

/// Scan `dir` (default: current directory) with the configured walk settings
pub(crate) fn scan_with_config(config: &Config, dir: &Path, mode: ExtractMode) -> ScanResult {
    let options = ScanOptions {
        extensions: config.scan.extensions.clone(),
        exclude_dirs: config.scan.exclude_dirs.clone(),
        mode,
    };
    dedup::scan_project(dir, &options)
}

pub(crate) fn target_dir(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| PathBuf::from("."))
}

/// Fetch every configured source and print the per-source outcome
pub(crate) fn load_remote_dictionary(config: &Config) -> Result<LoadedDictionary> {
    let sources = config.require_sources()?;
    println!("Loading dictionary from {} source(s)...", sources.len());

    let loaded = dictionary::load_dictionary(sources, &CdnFetcher::new())
        .context("Failed to load translation dictionary")?;

    for source in &loaded.sources {
        match &source.error {
            Some(error) => println!("  x {} (skipped: {})", source.name, error),
            None => println!(
                "  - {}: en={}, cn={}, ja={}",
                source.name, source.en_count, source.cn_count, source.ja_count
            ),
        }
    }
    println!("  {} keys available\n", loaded.dictionary.key_count());
    Ok(loaded)
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` is a no
pub(crate) fn confirm(question: &str) -> bool {
    print!("{} [y/N]: ", question);
    let _ = io::stdout().flush();

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Project id from the flag, the config, or an interactive pick
pub(crate) fn resolve_project(
    config: &Config,
    flag: Option<String>,
    backend: &dyn UploadBackend,
) -> Result<String> {
    if let Some(id) = flag
        .or_else(|| config.lokalise.project_id.clone())
        .filter(|id| !id.trim().is_empty())
    {
        return Ok(id.trim().to_string());
    }

    let projects = backend
        .list_projects()
        .context("Failed to list Lokalise projects")?;
    if projects.is_empty() {
        bail!("No Lokalise projects available for this token");
    }

    println!("Select a Lokalise project:");
    for (index, project) in projects.iter().enumerate() {
        println!("  {}. {} ({})", index + 1, project.name, project.project_id);
    }
    print!("Project number: ");
    let _ = io::stdout().flush();

    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read project selection")?;
    let choice = input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=projects.len()).contains(n));
    match choice {
        Some(n) => Ok(projects[n - 1].project_id.clone()),
        None => bail!("Invalid project selection: '{}'", input.trim()),
    }
}

/// Tag from the flag, else the configured default
pub(crate) fn resolve_tag(config: &Config, flag: Option<String>) -> Option<String> {
    flag.or_else(|| config.lokalise.default_tag.clone())
        .filter(|t| !t.trim().is_empty())
}
