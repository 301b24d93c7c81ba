use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{AgentError, AgentResult};
use crate::extractor::guess_language;
use crate::logging;
use crate::translator::{self, TranslationRow};

/// Platforms every uploaded key is attached to
pub const PLATFORMS: [&str; 2] = ["web", "other"];

/// Project visible to the configured token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyTranslation {
    pub language_iso: String,
    pub translation: String,
}

/// One key in a create-keys request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyPayload {
    pub key_name: String,
    pub platforms: Vec<String>,
    pub translations: Vec<KeyTranslation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Key the backend refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedUpload {
    pub key_name: String,
    pub message: String,
}

/// Backend answer to one create-keys request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadResponse {
    pub errors: Vec<FailedUpload>,
}

/// Translation-management backend
pub trait UploadBackend {
    fn create_keys(&self, project_id: &str, keys: &[KeyPayload]) -> AgentResult<UploadResponse>;

    fn list_projects(&self) -> AgentResult<Vec<Project>>;
}

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub tag: Option<String>,
    /// Explicit key to number from, e.g. `msg100`
    pub base_key: Option<String>,
    /// Use the English text as the key name when no base key is given
    pub use_en_as_key: bool,
    pub batch_size: usize,
    pub delay: Duration,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            tag: None,
            base_key: None,
            use_en_as_key: true,
            batch_size: 100,
            delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub uploaded: usize,
    /// Key names accepted by the backend, in upload order
    pub keys: Vec<String>,
    pub failed: Vec<FailedUpload>,
    pub batches: usize,
}

impl UploadSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

static NUMBERED_KEY_REGEX: OnceLock<Regex> = OnceLock::new();

/// Letters/underscores followed by digits.
/// Captures: Group 1 = prefix, Group 2 = number
fn numbered_key_regex() -> &'static Regex {
    NUMBERED_KEY_REGEX.get_or_init(|| {
        Regex::new(r"^([a-zA-Z_]+)(\d+)$")
            .expect("NUMBERED_KEY_REGEX pattern is invalid - this is a bug")
    })
}

/// Key number `index` counted from `base`: `msg100` + 5 -> `msg105`, `title` + 5 -> `title_5`
pub fn generate_key(base: &str, index: usize) -> String {
    if let Some(caps) = numbered_key_regex().captures(base) {
        let number = caps[2].parse::<u128>().ok();
        if let Some(number) = number {
            return format!("{}{}", &caps[1], number + index as u128);
        }
    }
    format!("{}_{}", base, index)
}

/// Key name for the row at global position `index`
fn key_name_for(
    row: &TranslationRow,
    index: usize,
    options: &UploadOptions,
    stamp: u128,
) -> String {
    if let Some(base) = options.base_key.as_deref().map(str::trim) {
        if !base.is_empty() {
            return generate_key(base, index);
        }
    }
    if options.use_en_as_key && !row.en.is_empty() {
        return row.en.clone();
    }
    format!("key_{}_{}", stamp, index)
}

/// Build request keys for `rows`, numbering from `start_index`
pub fn build_payload(
    rows: &[TranslationRow],
    start_index: usize,
    options: &UploadOptions,
    stamp: u128,
) -> Vec<KeyPayload> {
    let tags: Vec<String> = options
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| vec![t.to_string()])
        .unwrap_or_default();

    rows.iter()
        .enumerate()
        .map(|(offset, row)| KeyPayload {
            key_name: key_name_for(row, start_index + offset, options, stamp),
            platforms: PLATFORMS.iter().map(|p| p.to_string()).collect(),
            translations: vec![
                translation("en", &row.en),
                translation("zh_CN", &row.cn),
                translation("ja", &row.ja),
            ],
            tags: tags.clone(),
        })
        .collect()
}

fn translation(language_iso: &str, text: &str) -> KeyTranslation {
    KeyTranslation {
        language_iso: language_iso.to_string(),
        translation: text.to_string(),
    }
}

/// Upload rows in fixed-size batches.
///
/// Keys refused by the backend and every key of a batch whose request failed
/// end up in `failed`; later batches still run.
pub fn batch_upload(
    backend: &dyn UploadBackend,
    project_id: &str,
    rows: &[TranslationRow],
    options: &UploadOptions,
) -> AgentResult<UploadSummary> {
    let project_id = project_id.trim();
    if project_id.is_empty() {
        return Err(AgentError::missing("Lokalise project ID (lokalise.projectId or --project)"));
    }

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let size = options.batch_size.max(1);
    let total_batches = rows.len().div_ceil(size);
    let mut summary = UploadSummary::default();

    for (index, batch) in rows.chunks(size).enumerate() {
        let number = index + 1;
        let keys = build_payload(batch, index * size, options, stamp);
        logging::info(&format!(
            "Uploading batch {}/{} ({} keys)",
            number,
            total_batches,
            keys.len()
        ));
        summary.batches += 1;

        match backend.create_keys(project_id, &keys) {
            Ok(response) => {
                for key in &keys {
                    if !response.errors.iter().any(|e| e.key_name == key.key_name) {
                        summary.uploaded += 1;
                        summary.keys.push(key.key_name.clone());
                    }
                }
                if !response.errors.is_empty() {
                    logging::warn(&format!(
                        "Batch {}: {} key(s) rejected",
                        number,
                        response.errors.len()
                    ));
                }
                summary.failed.extend(response.errors);
            }
            Err(e) => {
                logging::warn(&format!("Batch {} upload failed: {}", number, e));
                let message = e.to_string();
                summary.failed.extend(keys.iter().map(|key| FailedUpload {
                    key_name: key.key_name.clone(),
                    message: message.clone(),
                }));
            }
        }

        if number < total_batches && !options.delay.is_zero() {
            std::thread::sleep(options.delay);
        }
    }

    Ok(summary)
}

/// Load `"en","cn","ja"` rows from a CSV file; a header row and blank rows are skipped.
pub fn read_translation_csv(path: &Path) -> Result<Vec<TranslationRow>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;

    let rows = translator::parse_translation_csv(&content)
        .into_iter()
        .filter(|t| !(t.en.eq_ignore_ascii_case("en") && t.cn.eq_ignore_ascii_case("cn")))
        .filter(|t| !(t.en.is_empty() && t.cn.is_empty() && t.ja.is_empty()))
        .map(|t| {
            let original = if t.en.is_empty() {
                t.cn.clone()
            } else {
                t.en.clone()
            };
            TranslationRow {
                language: guess_language(&original),
                original,
                en: t.en,
                cn: t.cn,
                ja: t.ja,
                error: None,
            }
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::LanguageGuess;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeBackend {
        requests: RefCell<Vec<Vec<KeyPayload>>>,
        reject: Vec<String>,
        fail_batches: Vec<usize>,
    }

    impl UploadBackend for FakeBackend {
        fn create_keys(
            &self,
            _project_id: &str,
            keys: &[KeyPayload],
        ) -> AgentResult<UploadResponse> {
            let batch = self.requests.borrow().len();
            self.requests.borrow_mut().push(keys.to_vec());
            if self.fail_batches.contains(&batch) {
                return Err(AgentError::HttpStatus {
                    url: "https://api.example.com/keys".to_string(),
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(UploadResponse {
                errors: keys
                    .iter()
                    .filter(|k| self.reject.contains(&k.key_name))
                    .map(|k| FailedUpload {
                        key_name: k.key_name.clone(),
                        message: "This key name is already taken".to_string(),
                    })
                    .collect(),
            })
        }

        fn list_projects(&self) -> AgentResult<Vec<Project>> {
            Ok(Vec::new())
        }
    }

    fn row(en: &str, cn: &str) -> TranslationRow {
        TranslationRow {
            original: en.to_string(),
            language: LanguageGuess::En,
            en: en.to_string(),
            cn: cn.to_string(),
            ja: format!("{}-ja", en),
            error: None,
        }
    }

    fn options(batch_size: usize) -> UploadOptions {
        UploadOptions {
            batch_size,
            delay: Duration::ZERO,
            ..Default::default()
        }
    }

    #[test]
    fn generate_key_numbers_from_base() {
        assert_eq!(generate_key("msg100", 0), "msg100");
        assert_eq!(generate_key("msg100", 7), "msg107");
        assert_eq!(generate_key("common_title", 2), "common_title_2");
        assert_eq!(generate_key("v2.key", 1), "v2.key_1");
    }

    #[test]
    fn key_name_prefers_base_then_english_then_stamp() {
        let mut opts = options(10);
        assert_eq!(key_name_for(&row("Save", "保存"), 3, &opts, 42), "Save");
        assert_eq!(key_name_for(&row("", "保存"), 3, &opts, 42), "key_42_3");

        opts.base_key = Some(" btn10 ".to_string());
        assert_eq!(key_name_for(&row("Save", "保存"), 3, &opts, 42), "btn13");

        opts.base_key = None;
        opts.use_en_as_key = false;
        assert_eq!(key_name_for(&row("Save", "保存"), 0, &opts, 42), "key_42_0");
    }

    #[test]
    fn payload_carries_platforms_translations_and_tag() {
        let mut opts = options(10);
        opts.tag = Some("  release-1 ".to_string());
        let keys = build_payload(&[row("Save", "保存")], 0, &opts, 1);

        let json = serde_json::to_value(&keys[0]).unwrap();
        assert_eq!(json["key_name"], "Save");
        assert_eq!(json["platforms"], serde_json::json!(["web", "other"]));
        assert_eq!(json["translations"][1]["language_iso"], "zh_CN");
        assert_eq!(json["translations"][1]["translation"], "保存");
        assert_eq!(json["translations"][2]["translation"], "Save-ja");
        assert_eq!(json["tags"], serde_json::json!(["release-1"]));

        let untagged = build_payload(&[row("Save", "保存")], 0, &options(10), 1);
        let untagged_json = serde_json::to_value(&untagged[0]).unwrap();
        assert!(untagged_json.get("tags").is_none());
    }

    #[test]
    fn batches_use_global_numbering() {
        let backend = FakeBackend::default();
        let mut opts = options(2);
        opts.base_key = Some("msg100".to_string());
        let rows: Vec<_> = ["A", "B", "C"].iter().map(|t| row(t, "")).collect();

        let summary = batch_upload(&backend, "p1", &rows, &opts).unwrap();

        assert_eq!(summary.batches, 2);
        assert_eq!(summary.keys, vec!["msg100", "msg101", "msg102"]);
        assert!(summary.is_success());
    }

    #[test]
    fn rejected_keys_and_failed_batches_are_recorded() {
        let backend = FakeBackend {
            reject: vec!["B".to_string()],
            fail_batches: vec![1],
            ..Default::default()
        };
        let rows: Vec<_> = ["A", "B", "C"].iter().map(|t| row(t, "")).collect();

        let summary = batch_upload(&backend, "p1", &rows, &options(2)).unwrap();

        assert_eq!(summary.uploaded, 1);
        assert_eq!(summary.keys, vec!["A"]);
        let failed: Vec<_> = summary.failed.iter().map(|f| f.key_name.as_str()).collect();
        assert_eq!(failed, vec!["B", "C"]);
        assert!(summary.failed[1].message.contains("500"));
        assert_eq!(backend.requests.borrow().len(), 2);
    }

    #[test]
    fn blank_project_is_missing_precondition() {
        let err = batch_upload(&FakeBackend::default(), "  ", &[], &options(1)).unwrap_err();
        assert!(matches!(err, AgentError::MissingPrecondition(_)));
    }

    #[test]
    fn reads_csv_skipping_header_and_blank_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        let csv = [
            r#""en","cn","ja""#,
            r#""Save","保存","保存する""#,
            r#""","","""#,
            r#""","取消","""#,
        ]
        .join("\n");
        std::fs::write(&path, csv).unwrap();

        let rows = read_translation_csv(&path).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].en, "Save");
        assert_eq!(rows[0].ja, "保存する");
        assert_eq!(rows[1].original, "取消");
        assert_eq!(rows[1].language, LanguageGuess::Zh);
    }
}
