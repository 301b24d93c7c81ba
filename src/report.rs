use std::fmt::Write;
use std::path::Path;

use crate::dedup::{Location, ScanResult};
use crate::replacer::BatchReplaceResult;
use crate::resolver::{CheckResult, MatchedVia};
use crate::translator::TranslationRow;
use crate::uploader::UploadSummary;

const NEED_REPLACE_LIMIT: usize = 20;
const MISSING_LIMIT: usize = 30;
/// Existing entries are only listed when there are at most this many
const EXISTING_LIST_THRESHOLD: usize = 20;
const EXISTING_LIMIT: usize = 10;
const UPLOAD_PREVIEW_LIMIT: usize = 10;
const LOCATION_LIMIT: usize = 2;

fn rule(c: char) -> String {
    c.to_string().repeat(60)
}

fn header(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "  {}", title);
    let _ = writeln!(out, "{}", rule('='));
    out.push('\n');
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", rule('-'));
}

fn remainder(out: &mut String, total: usize, shown: usize) {
    if total > shown {
        let _ = writeln!(out, "   ... and {} more", total - shown);
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// `App.vue:12, Button.vue:3 (+4 more)`
fn locations(occurrences: &[Location]) -> String {
    let shown = occurrences
        .iter()
        .take(LOCATION_LIMIT)
        .map(|o| {
            let name = Path::new(&o.file_path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| o.file_path.clone());
            format!("{}:{}", name, o.line)
        })
        .collect::<Vec<_>>()
        .join(", ");
    if occurrences.len() > LOCATION_LIMIT {
        format!("{} (+{} more)", shown, occurrences.len() - LOCATION_LIMIT)
    } else {
        shown
    }
}

pub fn scan_report(result: &ScanResult) -> String {
    let mut out = String::new();
    let s = &result.summary;
    header(&mut out, "Scan summary");
    let _ = writeln!(out, "  Files scanned:      {}", s.total_files);
    let _ = writeln!(out, "  Files with texts:   {}", s.files_with_texts);
    let _ = writeln!(out, "  Occurrences:        {}", s.total_texts);
    let _ = writeln!(out, "  Unique texts:       {}", s.unique_texts);
    if !result.errors.is_empty() {
        let _ = writeln!(out, "  Errors:             {}", result.errors.len());
        for error in &result.errors {
            let _ = writeln!(out, "    - {}: {}", error.file_path, error.message);
        }
    }
    out
}

/// Summary and truncated listings of the three disposition buckets
pub fn key_check_report(result: &CheckResult) -> String {
    let mut out = String::new();
    let s = &result.summary;
    header(&mut out, "i18n key check");

    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "   Call sites checked:      {}", s.total_keys);
    let _ = writeln!(out, "   Already correct:         {}", s.existing_count);
    let _ = writeln!(out, "   Need key normalization:  {}", s.need_replace_count);
    let _ = writeln!(out, "   Untranslated:            {}", s.missing_count);
    out.push('\n');

    if !result.need_replace.is_empty() {
        section(&mut out, "Replace with the dictionary key:");
        for item in result.need_replace.iter().take(NEED_REPLACE_LIMIT) {
            let key = item.resolved_key.as_deref().unwrap_or_default();
            let _ = writeln!(out, "   * $t('{}') -> $t('{}')", item.text, key);
            if item.all_candidate_keys.len() > 1 {
                let candidates = item.all_candidate_keys.join(", ");
                let _ = writeln!(out, "     candidates: {}", candidates);
            }
            let _ = writeln!(out, "     at: {}", locations(&item.occurrences));
        }
        remainder(&mut out, result.need_replace.len(), NEED_REPLACE_LIMIT);
        out.push('\n');
    }

    if !result.missing.is_empty() {
        section(&mut out, "Untranslated (translate and upload):");
        for item in result.missing.iter().take(MISSING_LIMIT) {
            let _ = writeln!(out, "   * {}", item.text);
            let _ = writeln!(out, "     at: {}", locations(&item.occurrences));
        }
        remainder(&mut out, result.missing.len(), MISSING_LIMIT);
        out.push('\n');
    }

    if !result.existing.is_empty() && result.existing.len() <= EXISTING_LIST_THRESHOLD {
        section(&mut out, "Already correct:");
        for item in result.existing.iter().take(EXISTING_LIMIT) {
            let tag = match item.matched_via {
                Some(MatchedVia::DirectKey) => "[key]",
                _ => "[value]",
            };
            let _ = writeln!(out, "   * {} {}", tag, truncate(&item.text, 40));
        }
        remainder(&mut out, result.existing.len(), EXISTING_LIMIT);
        out.push('\n');
    }

    let _ = writeln!(out, "{}", rule('='));
    out
}

pub fn replacement_report(result: &BatchReplaceResult) -> String {
    let mut out = String::new();
    let dry_run = result.success.iter().any(|o| o.dry_run);
    header(
        &mut out,
        if dry_run {
            "Key replacement (dry run)"
        } else {
            "Key replacement"
        },
    );

    let _ = writeln!(out, "   Files updated:   {}", result.success.len());
    let _ = writeln!(out, "   Files failed:    {}", result.failed.len());
    let _ = writeln!(out, "   Replacements:    {}", result.total_changes);
    out.push('\n');

    for outcome in &result.success {
        let _ = writeln!(out, "   ok   {} ({})", outcome.file_path, outcome.changes);
    }
    for outcome in &result.failed {
        let _ = writeln!(
            out,
            "   FAIL {}: {}",
            outcome.file_path,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    out
}

/// First `limit` rows as EN/CN/JA blocks
pub fn translation_preview(rows: &[TranslationRow], limit: usize) -> String {
    let mut out = String::new();
    for row in rows.iter().take(limit) {
        let _ = writeln!(out, "   EN: {}", row.en);
        let _ = writeln!(out, "   CN: {}", row.cn);
        let _ = writeln!(out, "   JA: {}", row.ja);
        if let Some(error) = &row.error {
            let _ = writeln!(out, "   !! {}", error);
        }
        let _ = writeln!(out, "   {}", "-".repeat(40));
    }
    remainder(&mut out, rows.len(), limit);
    out
}

pub fn upload_report(summary: &UploadSummary, rows: &[TranslationRow]) -> String {
    let mut out = String::new();
    header(&mut out, "Upload report");

    let status = if summary.is_success() {
        "success"
    } else {
        "partial failure"
    };
    let _ = writeln!(out, "   Status:    {}", status);
    let _ = writeln!(out, "   Uploaded:  {}", summary.uploaded);
    if !summary.failed.is_empty() {
        let _ = writeln!(out, "   Failed:    {}", summary.failed.len());
        for failure in &summary.failed {
            let _ = writeln!(out, "     - {}: {}", failure.key_name, failure.message);
        }
    }
    out.push('\n');

    if !rows.is_empty() {
        section(
            &mut out,
            &format!("Preview (first {}):", UPLOAD_PREVIEW_LIMIT),
        );
        out.push_str(&translation_preview(rows, UPLOAD_PREVIEW_LIMIT));
    }

    let _ = writeln!(out, "{}", rule('='));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::DedupedEntry;
    use crate::dictionary::testing::dictionary;
    use crate::extractor::{LanguageGuess, TextKind};
    use crate::replacer::FileReplaceOutcome;
    use crate::resolver::classify;
    use crate::uploader::FailedUpload;

    fn entry(text: &str, sites: usize) -> DedupedEntry {
        DedupedEntry {
            text: text.to_string(),
            language: LanguageGuess::Key,
            occurrences: (1..=sites)
                .map(|line| Location {
                    file_path: format!("src/views/page{}.vue", line),
                    line,
                    kind: TextKind::I18nCallArgument,
                    raw_match: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn check_report_lists_buckets_with_locations() {
        let dict = dictionary(&[("btn_save", "Save"), ("save_alt", "Save")], &[]);
        let entries = vec![entry("Save", 4), entry("btn_save", 1), entry("Nope", 1)];
        let result = classify(&entries, &dict).unwrap();

        let report = key_check_report(&result);

        assert!(report.contains("$t('Save') -> $t('btn_save')"));
        assert!(report.contains("candidates: btn_save, save_alt"));
        assert!(report.contains("page1.vue:1, page2.vue:2 (+2 more)"));
        assert!(report.contains("* Nope"));
        assert!(report.contains("[key] btn_save"));
    }

    #[test]
    fn check_report_truncates_missing_bucket() {
        let dict = dictionary(&[("k", "v")], &[]);
        let entries: Vec<_> = (0..35).map(|i| entry(&format!("text {}", i), 1)).collect();
        let result = classify(&entries, &dict).unwrap();

        let report = key_check_report(&result);

        assert!(report.contains("* text 29"));
        assert!(!report.contains("* text 30"));
        assert!(report.contains("... and 5 more"));
    }

    #[test]
    fn check_report_does_not_mutate_input() {
        let dict = dictionary(&[("k", "v")], &[]);
        let result = classify(&[entry("v", 1)], &dict).unwrap();
        let before = result.need_replace.clone();
        let _ = key_check_report(&result);
        assert_eq!(result.need_replace, before);
    }

    #[test]
    fn replacement_report_shows_failures() {
        let result = BatchReplaceResult {
            success: vec![FileReplaceOutcome {
                file_path: "a.vue".into(),
                changes: 2,
                dry_run: false,
                error: None,
            }],
            failed: vec![FileReplaceOutcome {
                file_path: "b.vue".into(),
                changes: 0,
                dry_run: false,
                error: Some("Permission denied".into()),
            }],
            total_changes: 2,
        };
        let report = replacement_report(&result);
        assert!(report.contains("ok   a.vue (2)"));
        assert!(report.contains("FAIL b.vue: Permission denied"));
    }

    #[test]
    fn upload_report_previews_first_ten() {
        let rows: Vec<_> = (0..12)
            .map(|i| TranslationRow {
                original: format!("T{}", i),
                language: LanguageGuess::En,
                en: format!("T{}", i),
                cn: String::new(),
                ja: String::new(),
                error: None,
            })
            .collect();
        let summary = UploadSummary {
            uploaded: 11,
            keys: Vec::new(),
            failed: vec![FailedUpload {
                key_name: "T3".into(),
                message: "taken".into(),
            }],
            batches: 1,
        };

        let report = upload_report(&summary, &rows);

        assert!(report.contains("partial failure"));
        assert!(report.contains("T3: taken"));
        assert!(report.contains("EN: T9"));
        assert!(!report.contains("EN: T10"));
        assert!(report.contains("... and 2 more"));
    }
}
