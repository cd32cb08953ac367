use serde::Serialize;
use thiserror::Error;

/// Coarse classification used at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigError,
    ValidationError,
    TransportError,
    UpstreamFormatError,
}

/// Everything that can go wrong between a topic and a question set. Each
/// variant is produced where the failure happens, so callers never have to
/// guess the cause from message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("configuration is invalid: {}", .0.join("; "))]
    Config(Vec<String>),

    /// Caller input rejected before any upstream work; the message is sent
    /// back verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("model output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("model output has no `questions` array")]
    MissingQuestions,

    #[error("question {index} is malformed: {reason}")]
    InvalidQuestion { index: usize, reason: String },

    #[error("{endpoint}: request failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint}: upstream returned {status}: {body}")]
    UpstreamStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint}: upstream returned an HTML page instead of JSON")]
    UpstreamHtml { endpoint: String },

    #[error("{endpoint}: upstream body is not JSON: {message}")]
    UpstreamFormat { endpoint: String, message: String },

    #[error("{endpoint}: upstream response has no message content")]
    EmptyContent { endpoint: String },

    #[error("all API endpoints failed")]
    AllEndpointsFailed,
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Config(_) => ErrorKind::ConfigError,
            GenerationError::Validation(_) => ErrorKind::ValidationError,
            GenerationError::Transport { .. } => ErrorKind::TransportError,
            GenerationError::InvalidJson(_)
            | GenerationError::MissingQuestions
            | GenerationError::InvalidQuestion { .. }
            | GenerationError::UpstreamStatus { .. }
            | GenerationError::UpstreamHtml { .. }
            | GenerationError::UpstreamFormat { .. }
            | GenerationError::EmptyContent { .. }
            | GenerationError::AllEndpointsFailed => ErrorKind::UpstreamFormatError,
        }
    }

    /// Metrics label for a failed endpoint attempt.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            GenerationError::Transport { .. } => "transport",
            GenerationError::UpstreamStatus { .. } => "bad_status",
            GenerationError::UpstreamHtml { .. } => "html",
            GenerationError::UpstreamFormat { .. } => "invalid_json",
            GenerationError::EmptyContent { .. } => "empty_content",
            GenerationError::Config(_) => "config",
            GenerationError::Validation(_) => "invalid_input",
            GenerationError::InvalidJson(_)
            | GenerationError::MissingQuestions
            | GenerationError::InvalidQuestion { .. } => "invalid_payload",
            GenerationError::AllEndpointsFailed => "exhausted",
        }
    }
}
