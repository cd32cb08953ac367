use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Instant;

use crate::config::LlmConfig;
use crate::metrics;
use crate::models::chat::{extract_message_content, ChatCompletionRequest};
use crate::services::error::GenerationError;

/// Path suffixes tried under the gateway base URL, in order. Reverse proxies
/// in front of the model expose the chat endpoint under different prefixes,
/// so the first one that answers with a usable completion wins.
pub const CANDIDATE_PATHS: [&str; 4] = [
    "/chat/completions",
    "/v1/chat/completions",
    "/api/chat/completions",
    "/deepseek/chat/completions",
];

/// How many body characters end up in error messages and logs.
const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSuccess {
    pub content: String,
    pub endpoint: String,
    pub candidate_index: usize,
}

/// Walks [`CANDIDATE_PATHS`] one request at a time until a candidate returns
/// a JSON completion with message content. Nothing is remembered between
/// calls.
pub struct EndpointProber {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl EndpointProber {
    pub fn new(config: &LlmConfig) -> Result<Self, GenerationError> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GenerationError::Transport {
                endpoint: config.base_url().to_string(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            base_url: config.base_url().to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub async fn probe(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ProbeSuccess, GenerationError> {
        let mut last_error: Option<GenerationError> = None;

        for (candidate_index, path) in CANDIDATE_PATHS.iter().enumerate() {
            tracing::debug!("Trying LLM endpoint {}{}", self.base_url, path);
            let started = Instant::now();
            let outcome = self.attempt(path, request).await;
            let elapsed = started.elapsed().as_secs_f64();

            match outcome {
                Ok(content) => {
                    metrics::record_endpoint_attempt(path, "success", elapsed);
                    tracing::info!("LLM endpoint {} answered", path);
                    return Ok(ProbeSuccess {
                        content,
                        endpoint: path.to_string(),
                        candidate_index,
                    });
                }
                Err(e) => {
                    metrics::record_endpoint_attempt(path, e.outcome_label(), elapsed);
                    tracing::debug!("LLM endpoint {} rejected, trying next: {}", path, e);
                    last_error = Some(e);
                }
            }
        }

        let error = last_error.unwrap_or(GenerationError::AllEndpointsFailed);
        tracing::warn!("All LLM endpoints failed, last error: {}", error);
        Err(error)
    }

    async fn attempt(
        &self,
        path: &str,
        request: &ChatCompletionRequest,
    ) -> Result<String, GenerationError> {
        let url = format!("{}{}", self.base_url, path);
        let transport = |e: reqwest::Error| GenerationError::Transport {
            endpoint: path.to_string(),
            message: e.to_string(),
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        // Content-Type is not trusted; gateways mislabel error pages
        let body = response.text().await.map_err(transport)?;
        tracing::debug!(
            "{} responded {} with body starting {:?}",
            path,
            status,
            preview(&body)
        );

        classify_response(path, status, &body)
    }
}

/// Decides what a single candidate's response means. Returns the message
/// content on success.
pub fn classify_response(
    endpoint: &str,
    status: StatusCode,
    body: &str,
) -> Result<String, GenerationError> {
    if !status.is_success() {
        return Err(GenerationError::UpstreamStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body: preview(body),
        });
    }

    if looks_like_html(body) {
        return Err(GenerationError::UpstreamHtml {
            endpoint: endpoint.to_string(),
        });
    }

    let parsed: Value =
        serde_json::from_str(body).map_err(|e| GenerationError::UpstreamFormat {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

    extract_message_content(&parsed)
        .map(str::to_string)
        .ok_or_else(|| GenerationError::EmptyContent {
            endpoint: endpoint.to_string(),
        })
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(9).collect::<String>().to_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
