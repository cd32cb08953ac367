use serde::Serialize;
use serde_json::Value;

pub const GENERATION_TEMPERATURE: f32 = 0.7;
pub const GENERATION_MAX_TOKENS: u32 = 4000;
pub const CONNECTION_TEST_MAX_TOKENS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// OpenAI-style chat-completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

impl ChatCompletionRequest {
    pub fn for_generation(model: &str, system_prompt: &str, user_prompt: String) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)],
            temperature: Some(GENERATION_TEMPERATURE),
            max_tokens: GENERATION_MAX_TOKENS,
        }
    }

    pub fn connection_probe(model: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage::user(
                "Connection test, please reply \"connection successful\"",
            )],
            temperature: None,
            max_tokens: CONNECTION_TEST_MAX_TOKENS,
        }
    }
}

/// Pulls `choices[0].message.content` out of a parsed response body.
/// Blank content counts as missing.
pub fn extract_message_content(body: &Value) -> Option<&str> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|content| !content.trim().is_empty())
}

/// Pulls `error.message` out of an error body, if the gateway sent one.
pub fn extract_error_message(body: &Value) -> Option<&str> {
    body.pointer("/error/message").and_then(Value::as_str)
}
