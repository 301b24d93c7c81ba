use anyhow::{bail, Result};
use std::path::Path;

use crate::config::Config;
use crate::http::LokaliseClient;
use crate::report;
use crate::translator::TranslationRow;
use crate::uploader::{self, UploadBackend, UploadOptions, UploadSummary};

pub fn run(
    config: &Config,
    file: &Path,
    project: Option<String>,
    tag: Option<String>,
) -> Result<()> {
    println!("=== i18n-agent upload ===\n");

    let rows = uploader::read_translation_csv(file)?;
    if rows.is_empty() {
        bail!("No translation rows found in {}", file.display());
    }
    println!("Loaded {} row(s) from {}", rows.len(), file.display());

    let backend = LokaliseClient::new(config.resolve_lokalise_token()?);
    let project_id = super::resolve_project(config, project, &backend)?;
    let tag = super::resolve_tag(config, tag);

    let summary = upload_rows(config, &backend, &project_id, &rows, tag)?;
    if !summary.is_success() {
        bail!("{} key(s) failed to upload", summary.failed.len());
    }
    Ok(())
}

/// Upload with the configured batch pacing and print the report
pub(crate) fn upload_rows(
    config: &Config,
    backend: &dyn UploadBackend,
    project_id: &str,
    rows: &[TranslationRow],
    tag: Option<String>,
) -> Result<UploadSummary> {
    let options = UploadOptions {
        tag,
        base_key: None,
        use_en_as_key: true,
        batch_size: config.batch.upload_size,
        delay: config.batch.upload_delay(),
    };
    println!(
        "Uploading {} key(s) to project {}{}...",
        rows.len(),
        project_id,
        options
            .tag
            .as_deref()
            .map(|t| format!(" with tag '{}'", t))
            .unwrap_or_default()
    );

    let summary = uploader::batch_upload(backend, project_id, rows, &options)?;
    println!("{}", report::upload_report(&summary, rows));
    Ok(summary)
}
