use std::fs;
use std::path::Path;

use i18n_agent::config::DictionarySource;
use i18n_agent::dedup::{scan_project, ScanOptions};
use i18n_agent::dictionary::{load_dictionary, DocumentFetcher, Locale, TranslationDictionary};
use i18n_agent::error::{AgentError, AgentResult};
use i18n_agent::extractor::ExtractMode;
use i18n_agent::replacer::{batch_replace, plan_replacements};
use i18n_agent::resolver::{classify, Disposition};
use tempfile::tempdir;

const EN_URL: &str = "https://cdn.test/common/en.js";
const CN_URL: &str = "https://cdn.test/common/cn.js";

const EN_DOC: &str = r#"var translations = {
    "btn_save": "Save",
    "btn_save_alt": "Save",
    "btn_cancel": "Cancel",
    "greet1": "Hello",
    "greet2": "greet1"
};"#;

const CN_DOC: &str = r#"var translations = {
    "btn_save": "保存",
    "btn_cancel": "取消",
    "msg_done": "操作成功！"
};"#;

struct StaticFetcher;

impl DocumentFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> AgentResult<String> {
        match url {
            EN_URL => Ok(EN_DOC.to_string()),
            CN_URL => Ok(CN_DOC.to_string()),
            _ => Err(AgentError::HttpStatus {
                url: url.to_string(),
                status: 404,
                body: String::new(),
            }),
        }
    }
}

fn sources() -> Vec<DictionarySource> {
    vec![DictionarySource {
        name: "Common".to_string(),
        en: Some(EN_URL.to_string()),
        cn: Some(CN_URL.to_string()),
        ja: None,
    }]
}

fn common_dictionary() -> TranslationDictionary {
    load_dictionary(&sources(), &StaticFetcher)
        .unwrap()
        .dictionary
}

fn options() -> ScanOptions {
    ScanOptions {
        extensions: vec![".vue".to_string(), ".ts".to_string()],
        exclude_dirs: vec!["node_modules".to_string()],
        mode: ExtractMode::Calls,
    }
}

fn write_project(root: &Path) {
    fs::create_dir_all(root.join("src/views")).unwrap();
    fs::write(
        root.join("src/views/Form.vue"),
        r#"<template>
  <el-button>{{ $t('Save') }}</el-button>
  <el-button>{{ $t("cancel") }}</el-button>
  <span>{{ $t('greet1') }}</span>
  <span>{{ $t('Brand new text') }}</span>
</template>
<script>
const fallback = "Save";
export default { methods: { done() { this.$message(i18n.t('操作成功!', { n: 1 })) } } }
</script>
"#,
    )
    .unwrap();
    fs::write(
        root.join("src/views/list.ts"),
        "export const label = t('Save');\nexport const other = t('btn_cancel');\n",
    )
    .unwrap();
}

#[test]
fn scan_classify_replace_then_rerun_is_stable() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    write_project(root);

    let dictionary = common_dictionary();
    assert_eq!(dictionary.value(Locale::Cn, "btn_save"), Some("保存"));

    let scan = scan_project(root, &options());
    let first = classify(&scan.unique_texts, &dictionary).unwrap();

    let need: Vec<_> = first
        .need_replace
        .iter()
        .map(|c| (c.text.as_str(), c.resolved_key.as_deref().unwrap()))
        .collect();
    assert_eq!(
        need,
        vec![
            ("Save", "btn_save"),
            ("cancel", "btn_cancel"),
            ("操作成功!", "msg_done"),
        ]
    );
    assert_eq!(first.existing.len(), 2);
    assert_eq!(first.missing.len(), 1);
    assert_eq!(first.missing[0].text, "Brand new text");
    let s = &first.summary;
    assert_eq!(
        s.existing_count + s.need_replace_count + s.missing_count,
        s.total_keys
    );

    let jobs = plan_replacements(&first.need_replace);
    let applied = batch_replace(&jobs, false);
    assert!(applied.failed.is_empty());
    assert_eq!(applied.total_changes, 4);

    let form = fs::read_to_string(root.join("src/views/Form.vue")).unwrap();
    assert!(form.contains("{{ $t('btn_save') }}"));
    assert!(form.contains("{{ $t(\"btn_cancel\") }}"));
    assert!(form.contains("i18n.t('msg_done', { n: 1 })"));
    assert!(form.contains("const fallback = \"Save\";"));
    assert!(form.contains("$t('greet1')"));
    let list = fs::read_to_string(root.join("src/views/list.ts")).unwrap();
    assert!(list.contains("t('btn_save')"));

    let rescan = scan_project(root, &options());
    let second = classify(&rescan.unique_texts, &dictionary).unwrap();
    assert!(second.need_replace.is_empty());
    assert_eq!(second.missing.len(), 1);

    let again = batch_replace(&plan_replacements(&second.need_replace), false);
    assert_eq!(again.total_changes, 0);
}

#[test]
fn dry_run_leaves_files_untouched() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    write_project(root);
    let before = fs::read_to_string(root.join("src/views/Form.vue")).unwrap();

    let dictionary = common_dictionary();
    let scan = scan_project(root, &options());
    let result = classify(&scan.unique_texts, &dictionary).unwrap();
    let planned = batch_replace(&plan_replacements(&result.need_replace), true);

    assert!(planned.success.iter().all(|o| o.dry_run));
    assert_eq!(planned.total_changes, 4);
    assert_eq!(
        fs::read_to_string(root.join("src/views/Form.vue")).unwrap(),
        before
    );
}

#[test]
fn direct_key_is_never_rewritten_to_other_key() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/a.ts"), "t('greet1')\n").unwrap();

    let dictionary = common_dictionary();
    let scan = scan_project(root, &options());
    let result = classify(&scan.unique_texts, &dictionary).unwrap();

    assert_eq!(result.existing.len(), 1);
    assert_eq!(result.existing[0].disposition, Disposition::AlreadyCorrect);
    assert!(result.need_replace.is_empty());
}

#[test]
fn mismatched_quote_call_is_not_classified_or_rewritten() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("src")).unwrap();
    let source = "const x = $t('Save\");\nconst y = $t('Save');\n";
    fs::write(root.join("src/a.ts"), source).unwrap();

    let dictionary = common_dictionary();

    let scan = scan_project(root, &options());
    let first = classify(&scan.unique_texts, &dictionary).unwrap();
    assert_eq!(first.need_replace.len(), 1);
    assert_eq!(first.need_replace[0].occurrences.len(), 1);
    let applied = batch_replace(&plan_replacements(&first.need_replace), false);
    assert_eq!(applied.total_changes, 1);

    let content = fs::read_to_string(root.join("src/a.ts")).unwrap();
    assert_eq!(
        content,
        "const x = $t('Save\");\nconst y = $t('btn_save');\n"
    );

    let rescan = scan_project(root, &options());
    let second = classify(&rescan.unique_texts, &dictionary).unwrap();
    assert!(second.need_replace.is_empty());
}
