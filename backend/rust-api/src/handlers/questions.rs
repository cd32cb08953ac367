use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    handlers::ApiError,
    models::generation::{
        GenerateQuestionsRequest, GenerateQuestionsResponse, ServiceConfigSummary,
        ServiceStatusResponse,
    },
    services::{question_generator::QuestionGenerator, AppState},
};

pub async fn generate_questions(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<GenerateQuestionsRequest>,
) -> Result<Json<GenerateQuestionsResponse>, ApiError> {
    let validation = state.config.validate();
    if !validation.is_valid {
        tracing::error!("Refusing to generate questions: {:?}", validation.errors);
        return Err(ApiError::ConfigInvalid(validation.errors));
    }

    let topic = req.validated_topic()?;
    let count = state.config.question_count();

    let generator = QuestionGenerator::new(&state.config)?;
    let outcome = generator.generate(&topic, count).await?;

    if outcome.questions.is_empty() {
        tracing::warn!("No questions produced for topic {:?}", topic);
        return Err(ApiError::internal(
            "Unable to generate questions for this topic, please try another topic",
        ));
    }

    Ok(Json(GenerateQuestionsResponse {
        success: true,
        topic,
        total_questions: outcome.questions.len(),
        questions: outcome.questions,
        generated_at: Utc::now(),
        source: outcome.source,
    }))
}

pub async fn service_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.config.status();

    Json(ServiceStatusResponse {
        status: "ok",
        service: format!("{} question generation API", state.config.app.name),
        version: env!("CARGO_PKG_VERSION"),
        config: ServiceConfigSummary {
            is_valid: status.is_valid,
            has_api_key: status.has_api_key,
            errors: status.errors,
        },
        timestamp: Utc::now(),
    })
}
