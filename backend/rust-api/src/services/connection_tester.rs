use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::metrics;
use crate::models::chat::{extract_error_message, ChatCompletionRequest};
use crate::models::generation::ConnectionTestResult;

const CONNECTION_TEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Single request against `{base_url}/chat/completions` for health
/// reporting. Unlike generation it never tries other paths.
pub struct ConnectionTester {
    http_client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ConnectionTester {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: format!("{}/chat/completions", config.base_url()),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    pub async fn test(&self) -> ConnectionTestResult {
        let result = self.run().await;
        metrics::record_connection_test(result.success);
        if result.success {
            tracing::info!("LLM connection test succeeded against {}", self.endpoint);
        } else {
            tracing::warn!("LLM connection test failed: {}", result.message);
        }
        result
    }

    async fn run(&self) -> ConnectionTestResult {
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest::connection_probe(&self.model))
            .timeout(CONNECTION_TEST_TIMEOUT)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                return ConnectionTestResult {
                    success: false,
                    message: format!("Connection test failed: {}", e),
                }
            }
        };

        let status = response.status();
        if status.is_success() {
            return ConnectionTestResult {
                success: true,
                message: "LLM API connection successful".to_string(),
            };
        }

        let detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| extract_error_message(&body).map(str::to_string))
            .unwrap_or_else(|| "unknown error".to_string());

        ConnectionTestResult {
            success: false,
            message: format!("Connection failed: {} - {}", status.as_u16(), detail),
        }
    }
}
