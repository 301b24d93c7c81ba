use anyhow::{Context, Result};

use crate::config::Config;
use crate::http::LokaliseClient;
use crate::uploader::UploadBackend;

pub fn run(config: &Config) -> Result<()> {
    println!("=== i18n-agent projects ===\n");

    let backend = LokaliseClient::new(config.resolve_lokalise_token()?);
    let projects = backend
        .list_projects()
        .context("Failed to list Lokalise projects")?;

    if projects.is_empty() {
        println!("No projects visible to this token.");
        return Ok(());
    }

    println!("{}", "-".repeat(60));
    for project in &projects {
        let marker = if config.lokalise.project_id.as_deref() == Some(project.project_id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {:<40} {}", marker, project.name, project.project_id);
    }
    println!("{}", "-".repeat(60));
    println!("\n{} project(s)", projects.len());

    Ok(())
}
