use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::http::DeepSeekClient;
use crate::report;
use crate::translator::{self, BatchOptions, SourceText, TranslationProvider, TranslationRow};

pub fn run(
    config: &Config,
    texts: Vec<String>,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    println!("=== i18n-agent translate ===\n");

    let mut inputs: Vec<String> = texts;
    if let Some(path) = &file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        inputs.extend(content.lines().map(str::to_string));
    }
    let items: Vec<SourceText> = inputs
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(SourceText::guessed)
        .collect();
    if items.is_empty() {
        bail!("Nothing to translate. Pass texts as arguments or use --file.");
    }

    let provider = DeepSeekClient::new(config.resolve_deepseek_key()?, &config.deepseek);
    let rows = translate_items(config, &provider, &items);

    println!("\n{}", report::translation_preview(&rows, rows.len()));
    report_failures(&rows);

    if let Some(path) = output {
        write_csv(&path, &rows)?;
        println!("Translations written to {}", path.display());
    }

    Ok(())
}

/// Run the batched translation with the configured prompt and pacing
pub(crate) fn translate_items(
    config: &Config,
    provider: &dyn TranslationProvider,
    items: &[SourceText],
) -> Vec<TranslationRow> {
    let prompt = config
        .translation_prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(translator::DEFAULT_PROMPT);
    println!("Translating {} text(s)...", items.len());
    translator::batch_translate(
        provider,
        items,
        prompt,
        BatchOptions {
            size: config.batch.translate_size,
            delay: config.batch.translate_delay(),
        },
    )
}

pub(crate) fn report_failures(rows: &[TranslationRow]) {
    let failed: Vec<_> = rows.iter().filter(|r| r.error.is_some()).collect();
    if failed.is_empty() {
        return;
    }
    println!("{} text(s) failed to translate:", failed.len());
    for row in failed {
        println!(
            "  x {}: {}",
            row.original,
            row.error.as_deref().unwrap_or_default()
        );
    }
}

/// Header plus one `"en","cn","ja"` line per row
pub(crate) fn write_csv(path: &Path, rows: &[TranslationRow]) -> Result<()> {
    let mut content = String::from("\"en\",\"cn\",\"ja\"\n");
    for row in rows {
        content.push_str(&row.to_csv_line());
        content.push('\n');
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
