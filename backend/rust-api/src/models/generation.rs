use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::config::ConfigStatus;
use crate::models::question::{Question, QuestionSource};
use crate::services::error::GenerationError;

pub const TOPIC_MAX_CHARS: u64 = 200;

#[derive(Debug, Deserialize)]
pub struct GenerateQuestionsRequest {
    /// Kept loose so a topic of the wrong JSON type gets the same 400 as a
    /// missing one instead of a body rejection.
    #[serde(default)]
    pub topic: Option<Value>,
}

/// Trimmed topic, checked for length.
#[derive(Debug, Validate)]
pub struct TopicInput {
    #[validate(length(max = 200, message = "Topic must not exceed 200 characters"))]
    pub topic: String,
}

impl GenerateQuestionsRequest {
    /// Returns the trimmed topic, or the validation error to answer 400 with.
    pub fn validated_topic(&self) -> Result<String, GenerationError> {
        let trimmed = self
            .topic
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if trimmed.is_empty() {
            return Err(GenerationError::Validation(
                "Please provide a valid topic".to_string(),
            ));
        }

        let input = TopicInput {
            topic: trimmed.to_string(),
        };
        input.validate().map_err(|errors| {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|field| field.iter())
                .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| {
                    format!("Topic must not exceed {} characters", TOPIC_MAX_CHARS)
                });
            GenerationError::Validation(message)
        })?;
        Ok(input.topic)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsResponse {
    pub success: bool,
    pub topic: String,
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub generated_at: DateTime<Utc>,
    pub source: QuestionSource,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfigSummary {
    pub is_valid: bool,
    pub has_api_key: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatusResponse {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
    pub config: ServiceConfigSummary,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTarget {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub config: ConfigStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiTarget>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct HealthActionRequest {
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthActionResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
