use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{AgentError, AgentResult};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "i18n-agent.json";

pub const DEEPSEEK_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
pub const LOKALISE_API_TOKEN_ENV: &str = "LOKALISE_API_TOKEN";

/// Configuration for i18n-agent
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Remote dictionaries to load, in merge order
    #[serde(default)]
    pub cdn: CdnConfig,

    /// Directory walk settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Machine-translation provider
    #[serde(default)]
    pub deepseek: DeepSeekConfig,

    /// Translation-management backend
    #[serde(default)]
    pub lokalise: LokaliseConfig,

    /// Overrides the English -> Chinese/Japanese prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_prompt: Option<String>,

    /// Batch sizes and politeness delays for remote calls
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CdnConfig {
    #[serde(default)]
    pub sources: Vec<DictionarySource>,
}

/// One named dictionary source with an optional document URL per locale
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct DictionarySource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ja: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    /// Dot-prefixed, case-insensitive extension allow-list
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names never descended into
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeepSeekConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_deepseek_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LokaliseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_tag: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BatchConfig {
    #[serde(default = "default_translate_size")]
    pub translate_size: usize,

    #[serde(default = "default_translate_delay_ms")]
    pub translate_delay_ms: u64,

    #[serde(default = "default_upload_size")]
    pub upload_size: usize,

    #[serde(default = "default_upload_delay_ms")]
    pub upload_delay_ms: u64,
}

fn default_extensions() -> Vec<String> {
    [".vue", ".js", ".ts", ".tsx", ".jsx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude_dirs() -> Vec<String> {
    ["node_modules", "dist", ".git", "public"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_deepseek_endpoint() -> String {
    "https://api.deepseek.com/v1/chat/completions".to_string()
}

fn default_translate_size() -> usize {
    20
}

fn default_translate_delay_ms() -> u64 {
    1000
}

fn default_upload_size() -> usize {
    100
}

fn default_upload_delay_ms() -> u64 {
    500
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            endpoint: default_deepseek_endpoint(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            translate_size: default_translate_size(),
            translate_delay_ms: default_translate_delay_ms(),
            upload_size: default_upload_size(),
            upload_delay_ms: default_upload_delay_ms(),
        }
    }
}

impl BatchConfig {
    pub fn translate_delay(&self) -> Duration {
        Duration::from_millis(self.translate_delay_ms)
    }

    pub fn upload_delay(&self) -> Duration {
        Duration::from_millis(self.upload_delay_ms)
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json_string(json_str: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json_str)
            .with_context(|| "Failed to parse config JSON string")?;
        Ok(config)
    }

    /// Try to load from default config file, or return default config
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Dictionary sources, refusing to continue when none are configured
    pub fn require_sources(&self) -> AgentResult<&[DictionarySource]> {
        if self.cdn.sources.is_empty() {
            return Err(AgentError::missing("no dictionary sources configured (set cdn.sources)"));
        }
        Ok(&self.cdn.sources)
    }

    pub fn resolve_deepseek_key(&self) -> AgentResult<String> {
        resolve_secret(
            self.deepseek.api_key.as_deref(),
            DEEPSEEK_API_KEY_ENV,
            "DeepSeek API key (deepseek.apiKey or DEEPSEEK_API_KEY)",
        )
    }

    pub fn resolve_lokalise_token(&self) -> AgentResult<String> {
        resolve_secret(
            self.lokalise.api_token.as_deref(),
            LOKALISE_API_TOKEN_ENV,
            "Lokalise API token (lokalise.apiToken or LOKALISE_API_TOKEN)",
        )
    }
}

fn resolve_secret(configured: Option<&str>, env_var: &str, what: &str) -> AgentResult<String> {
    if let Some(value) = configured {
        if !value.trim().is_empty() {
            return Ok(value.trim().to_string());
        }
    }

    if let Ok(value) = std::env::var(env_var) {
        if !value.trim().is_empty() {
            return Ok(value.trim().to_string());
        }
    }

    Err(AgentError::missing(what))
}
