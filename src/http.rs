use reqwest::blocking::{Client, Response};
use serde_json::{json, Value};

use crate::config::DeepSeekConfig;
use crate::dictionary::DocumentFetcher;
use crate::error::{AgentError, AgentResult};
use crate::translator::TranslationProvider;
use crate::uploader::{FailedUpload, KeyPayload, Project, UploadBackend, UploadResponse};

pub const LOKALISE_API_BASE: &str = "https://api.lokalise.com/api2";

fn request_error(url: &str, e: reqwest::Error) -> AgentError {
    AgentError::Request {
        url: url.to_string(),
        message: e.to_string(),
    }
}

fn ensure_success(response: Response, url: &str) -> AgentResult<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        Err(AgentError::HttpStatus {
            url: url.to_string(),
            status,
            body,
        })
    }
}

fn read_json(response: Response, url: &str) -> AgentResult<Value> {
    response.json().map_err(|e| request_error(url, e))
}

/// Plain GET for dictionary documents, bypassing caches
#[derive(Debug, Clone, Default)]
pub struct CdnFetcher {
    client: Client,
}

impl CdnFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentFetcher for CdnFetcher {
    fn fetch(&self, url: &str) -> AgentResult<String> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/javascript, text/javascript, */*")
            .header("Cache-Control", "no-cache")
            .send()
            .map_err(|e| request_error(url, e))?;
        ensure_success(response, url)?
            .text()
            .map_err(|e| request_error(url, e))
    }
}

/// DeepSeek chat-completions client
#[derive(Debug, Clone)]
pub struct DeepSeekClient {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    endpoint: String,
}

impl DeepSeekClient {
    pub fn new(api_key: String, config: &DeepSeekConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            endpoint: config.endpoint.clone(),
        }
    }
}

impl TranslationProvider for DeepSeekClient {
    fn complete(&self, system_prompt: &str, content: &str) -> AgentResult<String> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": content },
            ],
            "temperature": self.temperature,
            "response_format": { "type": "text" },
        });

        let url = self.endpoint.as_str();
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .map_err(|e| request_error(url, e))?;
        let body = read_json(ensure_success(response, url)?, url)?;
        completion_content(&body)
    }
}

/// `choices[0].message.content` of a chat-completions response
fn completion_content(body: &Value) -> AgentResult<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AgentError::InvalidResponse("missing choices[0].message.content".into()))
}

/// Lokalise API v2 client
#[derive(Debug, Clone)]
pub struct LokaliseClient {
    client: Client,
    api_token: String,
    base_url: String,
}

impl LokaliseClient {
    pub fn new(api_token: String) -> Self {
        Self {
            client: Client::new(),
            api_token,
            base_url: LOKALISE_API_BASE.to_string(),
        }
    }
}

impl UploadBackend for LokaliseClient {
    fn create_keys(&self, project_id: &str, keys: &[KeyPayload]) -> AgentResult<UploadResponse> {
        let url = format!("{}/projects/{}/keys", self.base_url, project_id);
        let response = self
            .client
            .post(&url)
            .header("X-Api-Token", &self.api_token)
            .json(&json!({ "keys": keys }))
            .send()
            .map_err(|e| request_error(&url, e))?;
        let body = read_json(ensure_success(response, &url)?, &url)?;
        Ok(UploadResponse {
            errors: key_errors(&body),
        })
    }

    fn list_projects(&self) -> AgentResult<Vec<Project>> {
        let url = format!("{}/projects", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("X-Api-Token", &self.api_token)
            .send()
            .map_err(|e| request_error(&url, e))?;
        let body = read_json(ensure_success(response, &url)?, &url)?;
        projects(&body)
    }
}

/// Per-key errors of a create-keys response; the key name is reported per platform
fn key_errors(body: &Value) -> Vec<FailedUpload> {
    let Some(errors) = body.get("errors").and_then(Value::as_array) else {
        return Vec::new();
    };
    errors
        .iter()
        .map(|error| {
            let key_name = ["web", "ios", "android", "other"]
                .iter()
                .find_map(|platform| error.pointer(&format!("/key_name/{}", platform)))
                .or_else(|| error.get("key_name"))
                .and_then(Value::as_str)
                .unwrap_or("Unknown key")
                .to_string();
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            FailedUpload { key_name, message }
        })
        .collect()
}

/// Projects with both an id and a name
fn projects(body: &Value) -> AgentResult<Vec<Project>> {
    let list = body
        .get("projects")
        .and_then(Value::as_array)
        .ok_or_else(|| AgentError::InvalidResponse("projects array not found".into()))?;
    Ok(list
        .iter()
        .filter_map(|project| {
            let id = project.get("project_id")?.as_str()?;
            let name = project.get("name")?.as_str()?.trim();
            if id.is_empty() || name.is_empty() {
                return None;
            }
            Some(Project {
                project_id: id.to_string(),
                name: name.to_string(),
            })
        })
        .collect())
}
