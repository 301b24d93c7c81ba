use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::extractor::{self, ExtractMode, LanguageGuess, TextKind, TextOccurrence};
use crate::fs::{FileSystem, RealFileSystem};
use crate::logging;
use crate::walker;

/// Where one deduplicated text was seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub file_path: String,
    pub line: usize,
    pub kind: TextKind,
    pub raw_match: String,
}

/// One unique text value observed anywhere in the scanned tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupedEntry {
    pub text: String,
    /// Language guess of the first occurrence
    pub language: LanguageGuess,
    /// Every site, in discovery order
    pub occurrences: Vec<Location>,
}

/// Group occurrences by exact text, keeping first-seen order of both groups and sites.
pub fn deduplicate(texts: &[TextOccurrence]) -> Vec<DedupedEntry> {
    let mut entries: Vec<DedupedEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in texts {
        let slot = *index.entry(item.text.as_str()).or_insert_with(|| {
            entries.push(DedupedEntry {
                text: item.text.clone(),
                language: item.language,
                occurrences: Vec::new(),
            });
            entries.len() - 1
        });
        entries[slot].occurrences.push(Location {
            file_path: item.file_path.clone(),
            line: item.line,
            kind: item.kind,
            raw_match: item.raw_match.clone(),
        });
    }

    entries
}

/// Options for a project scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub extensions: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub mode: ExtractMode,
}

/// File that could not be scanned
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanError {
    pub file_path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub total_files: usize,
    pub files_with_texts: usize,
    pub total_texts: usize,
    pub unique_texts: usize,
}

/// Result of scanning a project tree
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Files with at least one occurrence, in walk order
    pub files: Vec<(String, Vec<TextOccurrence>)>,
    pub all_texts: Vec<TextOccurrence>,
    pub unique_texts: Vec<DedupedEntry>,
    pub summary: ScanSummary,
    pub errors: Vec<ScanError>,
}

/// Walk `root`, extract from every matching file one at a time, then deduplicate.
/// Unreadable files and directories are recorded and skipped.
pub fn scan_project(root: &Path, options: &ScanOptions) -> ScanResult {
    scan_project_with_fs(&RealFileSystem, root, options)
}

/// Same as [`scan_project`], reading file contents through `fs`
pub fn scan_project_with_fs(
    fs: &dyn FileSystem,
    root: &Path,
    options: &ScanOptions,
) -> ScanResult {
    let walk = walker::walk_files(root, &options.extensions, &options.exclude_dirs);
    let mut result = ScanResult {
        errors: walk
            .warnings
            .iter()
            .map(|message| ScanError {
                file_path: root.display().to_string(),
                message: message.clone(),
            })
            .collect(),
        ..Default::default()
    };

    for path in &walk.files {
        let file_path = path.display().to_string();
        let content = match fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                let message = format!("{:#}", e);
                logging::warn(&message);
                result.errors.push(ScanError { file_path, message });
                continue;
            }
        };

        let texts = extractor::extract_texts(&content, &file_path, options.mode);
        if texts.is_empty() {
            continue;
        }
        logging::debug(&format!("{}: {} occurrence(s)", file_path, texts.len()));
        result.all_texts.extend(texts.iter().cloned());
        result.files.push((file_path, texts));
    }

    result.unique_texts = deduplicate(&result.all_texts);
    result.summary = ScanSummary {
        total_files: walk.files.len(),
        files_with_texts: result.files.len(),
        total_texts: result.all_texts.len(),
        unique_texts: result.unique_texts.len(),
    };

    result
}
