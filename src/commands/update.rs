use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::extractor::guess_language;
use crate::http::{DeepSeekClient, LokaliseClient};
use crate::replacer;
use crate::report;
use crate::translator::{SourceText, TranslationRow};

/// Options of the full check -> replace -> translate -> upload workflow
#[derive(Debug, Default)]
pub struct UpdateArgs {
    pub dir: Option<PathBuf>,
    pub dry_run: bool,
    pub skip_translate: bool,
    pub skip_upload: bool,
    pub tag: Option<String>,
    pub project: Option<String>,
    pub yes: bool,
}

pub fn run(config: &Config, args: UpdateArgs) -> Result<()> {
    println!("=== i18n-agent update ===\n");

    let dir = super::target_dir(args.dir);
    let result = super::check::check_project(config, &dir)?;
    println!("{}", report::key_check_report(&result));

    let mut failures: Vec<String> = Vec::new();

    // Step 1: normalize call sites to dictionary keys
    if !result.need_replace.is_empty() {
        let jobs = replacer::plan_replacements(&result.need_replace);
        let question = format!("Rewrite translation calls in {} file(s)?", jobs.len());
        if args.dry_run {
            let planned = replacer::batch_replace(&jobs, true);
            println!("{}", report::replacement_report(&planned));
        } else if args.yes || super::confirm(&question) {
            let outcome = replacer::batch_replace(&jobs, false);
            println!("{}", report::replacement_report(&outcome));
            if !outcome.failed.is_empty() {
                failures.push(format!("{} file(s) could not be updated", outcome.failed.len()));
            }
        } else {
            println!("Skipping key replacement.\n");
        }
    }

    // Step 2: translate what the dictionary does not know
    if result.missing.is_empty() {
        println!("No untranslated texts.");
        return finish(failures);
    }

    let items: Vec<SourceText> = result
        .missing
        .iter()
        .map(|entry| SourceText {
            text: entry.text.clone(),
            language: guess_language(&entry.text),
        })
        .collect();

    if args.dry_run || args.skip_translate {
        println!("{} text(s) would be translated:", items.len());
        for item in &items {
            println!("  - {}", item.text);
        }
        return finish(failures);
    }

    let provider = DeepSeekClient::new(config.resolve_deepseek_key()?, &config.deepseek);
    let rows = super::translate::translate_items(config, &provider, &items);
    super::translate::report_failures(&rows);
    let translated: Vec<TranslationRow> = rows.into_iter().filter(|r| r.error.is_none()).collect();
    if translated.len() < items.len() {
        failures.push(format!(
            "{} text(s) failed to translate",
            items.len() - translated.len()
        ));
    }

    // Step 3: upload the new keys
    if args.skip_upload || translated.is_empty() {
        let preview = report::translation_preview(&translated, translated.len());
        println!("\n{}", preview);
        return finish(failures);
    }

    let backend = LokaliseClient::new(config.resolve_lokalise_token()?);
    let project_id = super::resolve_project(config, args.project, &backend)?;
    let tag = super::resolve_tag(config, args.tag);

    if !args.yes
        && !super::confirm(&format!(
            "Upload {} key(s) to project {}?",
            translated.len(),
            project_id
        ))
    {
        println!("Upload cancelled.");
        return finish(failures);
    }

    let summary = super::upload::upload_rows(config, &backend, &project_id, &translated, tag)?;
    if !summary.is_success() {
        failures.push(format!("{} key(s) failed to upload", summary.failed.len()));
    }

    finish(failures)
}

fn finish(failures: Vec<String>) -> Result<()> {
    if failures.is_empty() {
        println!("\nDone!");
        Ok(())
    } else {
        bail!("Update finished with problems: {}", failures.join("; "))
    }
}
