use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    handlers::ApiError,
    models::generation::{ApiTarget, HealthActionRequest, HealthActionResponse, HealthResponse},
    services::{connection_tester::ConnectionTester, AppState},
};

pub const TEST_CONNECTION_ACTION: &str = "test-connection";

/// Configuration status plus, when the configuration is usable, a live
/// connection test against the gateway.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let config_status = state.config.status();

    if !config_status.is_valid {
        return Json(HealthResponse {
            success: false,
            message: "Configuration validation failed".to_string(),
            config: config_status,
            api: None,
            timestamp: Utc::now(),
        });
    }

    let result = ConnectionTester::new(&state.config.llm).test().await;

    Json(HealthResponse {
        success: result.success,
        message: result.message,
        config: config_status,
        api: Some(ApiTarget {
            base_url: state.config.llm.base_url().to_string(),
            model: state.config.llm.model.clone(),
        }),
        timestamp: Utc::now(),
    })
}

pub async fn health_action(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<HealthActionRequest>,
) -> Result<Json<HealthActionResponse>, ApiError> {
    match req.action.as_deref() {
        Some(TEST_CONNECTION_ACTION) => {
            let result = ConnectionTester::new(&state.config.llm).test().await;
            Ok(Json(HealthActionResponse {
                success: result.success,
                message: result.message,
                timestamp: Utc::now(),
            }))
        }
        other => {
            tracing::warn!("Unknown health action: {:?}", other);
            Err(ApiError::bad_request("Invalid action"))
        }
    }
}
