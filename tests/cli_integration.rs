use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::tempdir;

fn cli_bin() -> &'static str {
    env!("CARGO_BIN_EXE_i18n-agent")
}

fn run_cli<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Output {
    Command::new(cli_bin())
        .current_dir(cwd)
        .args(args)
        .env_remove("DEEPSEEK_API_KEY")
        .env_remove("LOKALISE_API_TOKEN")
        .output()
        .expect("failed to run i18n-agent")
}

fn write_config(root: &Path, config: Value) -> PathBuf {
    let config_path = root.join("i18n-agent.json");
    fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    config_path
}

fn write_source(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn read_json(path: &Path) -> Value {
    let content = fs::read_to_string(path).expect("missing json file");
    serde_json::from_str(&content).expect("invalid json")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn scan_writes_json_result() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let app = [
        "<template>",
        "  <h1>{{ $t('Welcome') }}</h1>",
        "  <p>{{ $t('Welcome') }}</p>",
        "  <p>{{ $t('Sign in') }}</p>",
        "</template>",
    ]
    .join("\n");
    write_source(root, "src/App.vue", &app);
    write_source(root, "node_modules/lib/index.js", "t('Ignored')\n");

    let output = run_cli(root, &["scan", ".", "-o", "out.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("=== i18n-agent scan ==="));

    let result = read_json(&root.join("out.json"));
    assert_eq!(result["summary"]["totalTexts"], json!(3));
    assert_eq!(result["summary"]["uniqueTexts"], json!(2));
    assert_eq!(result["uniqueTexts"][0]["text"], json!("Welcome"));
    assert_eq!(
        result["uniqueTexts"][0]["occurrences"]
            .as_array()
            .map(|a| a.len()),
        Some(2)
    );
}

#[test]
fn scan_raw_finds_untranslated_chinese() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let list = [
        "<template>",
        "  <span>暂无数据</span>",
        "  <el-button>{{ $t('Save') }}</el-button>",
        "</template>",
    ]
    .join("\n");
    write_source(root, "src/List.vue", &list);

    let output = run_cli(root, &["scan", ".", "--raw", "-o", "raw.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("暂无数据"));

    let result = read_json(&root.join("raw.json"));
    assert_eq!(result["summary"]["uniqueTexts"], json!(1));
    assert_eq!(result["uniqueTexts"][0]["language"], json!("zh"));
}

#[test]
fn scan_respects_extension_override() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    write_source(root, "src/a.vue", "$t('From vue')\n");
    write_source(root, "src/b.ts", "t('From ts')\n");

    let output = run_cli(root, &["scan", ".", "-e", ".ts", "-o", "out.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let result = read_json(&root.join("out.json"));
    assert_eq!(result["summary"]["totalFiles"], json!(1));
    assert_eq!(result["uniqueTexts"][0]["text"], json!("From ts"));
}

#[test]
fn init_creates_config_and_refuses_overwrite() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();

    let output = run_cli(root, &["init"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let config = read_json(&root.join("i18n-agent.json"));
    assert_eq!(config["cdn"]["sources"][0]["name"], json!("Common"));

    let again = run_cli(root, &["init"]);
    assert!(!again.status.success());
    assert!(stderr(&again).contains("--force"));

    let forced = run_cli(root, &["init", "--force"]);
    assert!(forced.status.success(), "stderr: {}", stderr(&forced));
}

#[test]
fn check_without_sources_fails() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    write_config(root, json!({ "cdn": { "sources": [] } }));
    write_source(root, "src/App.vue", "$t('Save')\n");

    let output = run_cli(root, &["check", "."]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no dictionary sources"));
}

#[test]
fn upload_without_token_fails_before_network() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    write_config(root, json!({ "lokalise": { "projectId": "123.abc" } }));
    let csv = "\"en\",\"cn\",\"ja\"\n\"Save\",\"保存\",\"保存\"\n";
    write_source(root, "rows.csv", csv);

    let output = run_cli(root, &["upload", "rows.csv"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("LOKALISE_API_TOKEN"));
}

#[test]
fn invalid_config_is_reported() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join("i18n-agent.json"), "{ not json").unwrap();

    let output = run_cli(root, &["scan", "."]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to parse config file"));
}
