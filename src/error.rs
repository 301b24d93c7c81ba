use thiserror::Error;

/// Failures raised by the core pipeline and its remote collaborators
#[derive(Debug, Error)]
pub enum AgentError {
    /// A required piece of configuration or input is absent
    #[error("Missing precondition: {0}")]
    MissingPrecondition(String),

    /// Remote endpoint answered with a non-success status
    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    /// Request could not be sent or its body could not be read
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// A dictionary document yielded no key/value pairs
    #[error("No valid translations found in document: {url}")]
    EmptyDocument { url: String },

    /// Every dictionary source failed or was empty
    #[error("Translation dictionary is empty: no source produced any entries")]
    EmptyDictionary,

    /// Remote response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AgentError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingPrecondition(what.into())
    }
}

pub type AgentResult<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_message_carries_status_and_url() {
        let err = AgentError::HttpStatus {
            url: "https://cdn.example.com/en.js".to_string(),
            status: 404,
            body: "not found".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("https://cdn.example.com/en.js"));
    }

    #[test]
    fn missing_precondition_is_readable() {
        let err = AgentError::missing("no dictionary sources configured");
        assert_eq!(
            err.to_string(),
            "Missing precondition: no dictionary sources configured"
        );
    }
}
