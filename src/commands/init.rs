use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::config::{Config, DictionarySource};

/// Starter configuration with one example dictionary source
pub fn starter_config() -> Config {
    let mut config = Config::default();
    config.cdn.sources.push(DictionarySource {
        name: "Common".to_string(),
        en: Some("https://cdn.example.com/i18n/common/en.js".to_string()),
        cn: Some("https://cdn.example.com/i18n/common/zh_CN.js".to_string()),
        ja: Some("https://cdn.example.com/i18n/common/ja.js".to_string()),
    });
    config
}

pub fn run(config_path: &Path, force: bool) -> Result<()> {
    println!("=== i18n-agent init ===\n");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = starter_config();
    let config_str = serde_json::to_string_pretty(&config)?;
    std::fs::write(config_path, format!("{}\n", config_str))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created configuration file: {}\n", config_path.display());
    println!("Configuration:");
    println!("  Sources: {}", config.cdn.sources.len());
    println!("  Extensions: {:?}", config.scan.extensions);
    println!("  Excluded directories: {:?}", config.scan.exclude_dirs);

    println!("\nNext steps:");
    println!("  1. Point cdn.sources at your dictionary documents");
    println!("  2. Set DEEPSEEK_API_KEY and LOKALISE_API_TOKEN (or the matching config keys)");
    println!("  3. Run 'i18n-agent check' to classify translation calls");
    println!("  4. Run 'i18n-agent update' to normalize, translate and upload");

    println!("\nDone!");
    Ok(())
}
