use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::extractor::{guarded_captures, CALL_ALIASES};
use crate::fs::{FileSystem, RealFileSystem};
use crate::logging;
use crate::resolver::{ClassifiedOccurrence, Disposition};

/// One literal to rewrite inside translation calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementPair {
    pub text: String,
    pub key: String,
}

/// Planned mutation of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementJob {
    pub file_path: String,
    /// Distinct pairs, in the order they were first planned
    pub pairs: Vec<ReplacementPair>,
    /// Call sites the scan saw for these pairs
    pub sites: usize,
}

/// Result of processing one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReplaceOutcome {
    pub file_path: String,
    pub changes: usize,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReplaceResult {
    pub success: Vec<FileReplaceOutcome>,
    pub failed: Vec<FileReplaceOutcome>,
    /// Sum of `changes` over `success`
    pub total_changes: usize,
}

/// Group every needs-normalization occurrence by file, in first-seen file order.
pub fn plan_replacements(items: &[ClassifiedOccurrence]) -> Vec<ReplacementJob> {
    let mut jobs: Vec<ReplacementJob> = Vec::new();
    let mut by_file: HashMap<String, usize> = HashMap::new();

    for item in items {
        if item.disposition != Disposition::NeedsKeyNormalization {
            continue;
        }
        let Some(key) = item.resolved_key.as_deref() else {
            continue;
        };
        if key == item.text {
            continue;
        }

        for occurrence in &item.occurrences {
            let slot = *by_file
                .entry(occurrence.file_path.clone())
                .or_insert_with(|| {
                    jobs.push(ReplacementJob {
                        file_path: occurrence.file_path.clone(),
                        pairs: Vec::new(),
                        sites: 0,
                    });
                    jobs.len() - 1
                });
            let job = &mut jobs[slot];
            job.sites += 1;
            if !job.pairs.iter().any(|p| p.text == item.text) {
                job.pairs.push(ReplacementPair {
                    text: item.text.clone(),
                    key: key.to_string(),
                });
            }
        }
    }

    jobs
}

/// Rewrite every translation call whose literal argument is `text` to use `key`.
///
/// The callee spelling, quote style, spacing and any trailing arguments are
/// kept. `text` is matched literally. Returns the new content and the number
/// of call sites rewritten.
pub fn rewrite_call_sites(content: &str, text: &str, key: &str) -> (String, usize) {
    if text == key {
        return (content.to_string(), 0);
    }

    let escaped = regex::escape(text);
    let mut current = content.to_string();
    let mut total = 0;

    for alias in CALL_ALIASES {
        for quote in ['\'', '"'] {
            // Group 1 = callee and opening paren, Group 2 = trailing args and closing paren
            let source = format!(
                r#"({}\(\s*){quote}\s*{escaped}\s*{quote}((?:\s*,\s*[^)]+)?\s*\))"#,
                alias.callee
            );
            let Ok(regex) = Regex::new(&source) else {
                logging::warn(&format!("Skipping unmatchable text: {}", text));
                return (content.to_string(), 0);
            };
            let (next, count) = substitute(&regex, &current, alias.guarded, quote, key);
            if count > 0 {
                current = next;
                total += count;
            }
        }
    }

    (current, total)
}

fn substitute(
    regex: &Regex,
    haystack: &str,
    guarded: bool,
    quote: char,
    key: &str,
) -> (String, usize) {
    let matches = guarded_captures(regex, haystack, guarded);
    if matches.is_empty() {
        return (String::new(), 0);
    }

    let quoted_key = key.replace(quote, &format!("\\{}", quote));
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for caps in &matches {
        let (Some(whole), Some(head), Some(rest)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        out.push_str(&haystack[last..whole.start()]);
        out.push_str(head.as_str());
        out.push(quote);
        out.push_str(&quoted_key);
        out.push(quote);
        out.push_str(rest.as_str());
        last = whole.end();
    }
    out.push_str(&haystack[last..]);

    (out, matches.len())
}

/// Apply one job; the file is written once, and only when its content changed.
pub fn replace_in_file_with_fs(fs: &dyn FileSystem, job: &ReplacementJob) -> Result<usize> {
    let path = Path::new(&job.file_path);
    let original = fs.read_to_string(path)?;

    let mut content = original.clone();
    let mut changes = 0;
    for pair in &job.pairs {
        let (next, count) = rewrite_call_sites(&content, &pair.text, &pair.key);
        if count > 0 {
            content = next;
            changes += count;
        }
    }

    if changes > 0 && content != original {
        fs.write(path, &content)?;
    }
    Ok(changes)
}

/// Apply jobs against the real file system
pub fn batch_replace(jobs: &[ReplacementJob], dry_run: bool) -> BatchReplaceResult {
    batch_replace_with_fs(&RealFileSystem, jobs, dry_run)
}

/// Apply jobs one file at a time; a failing file is recorded and the rest continue.
///
/// With `dry_run` nothing is read or written and each job reports its planned
/// call-site count.
pub fn batch_replace_with_fs(
    fs: &dyn FileSystem,
    jobs: &[ReplacementJob],
    dry_run: bool,
) -> BatchReplaceResult {
    let mut result = BatchReplaceResult::default();

    for job in jobs {
        if dry_run {
            result.total_changes += job.sites;
            result.success.push(FileReplaceOutcome {
                file_path: job.file_path.clone(),
                changes: job.sites,
                dry_run: true,
                error: None,
            });
            continue;
        }

        match replace_in_file_with_fs(fs, job) {
            Ok(changes) => {
                logging::debug(&format!("{}: {} replacement(s)", job.file_path, changes));
                result.total_changes += changes;
                result.success.push(FileReplaceOutcome {
                    file_path: job.file_path.clone(),
                    changes,
                    dry_run: false,
                    error: None,
                });
            }
            Err(e) => {
                logging::warn(&format!("Failed to update {}: {:#}", job.file_path, e));
                result.failed.push(FileReplaceOutcome {
                    file_path: job.file_path.clone(),
                    changes: 0,
                    dry_run: false,
                    error: Some(format!("{:#}", e)),
                });
            }
        }
    }

    result
}
