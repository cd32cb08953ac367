use crate::config::{Config, LlmConfig};
use crate::metrics;
use crate::models::chat::ChatCompletionRequest;
use crate::models::question::GenerationOutcome;
use crate::services::endpoint_prober::EndpointProber;
use crate::services::error::GenerationError;
use crate::services::prompt_builder::{build_question_prompt, SYSTEM_PROMPT};
use crate::services::response_validator::parse_questions_or_fallback;

/// Topic in, questions out: builds the prompt, finds a working endpoint and
/// validates what comes back. A payload that fails validation is replaced
/// by the fallback set and flagged as such; endpoint failures are returned
/// as errors.
pub struct QuestionGenerator {
    llm: LlmConfig,
    prober: EndpointProber,
}

impl QuestionGenerator {
    pub fn new(config: &Config) -> Result<Self, GenerationError> {
        if config.llm.api_key.trim().is_empty() {
            return Err(GenerationError::Config(vec![
                "API key is not configured".to_string()
            ]));
        }

        Ok(Self {
            llm: config.llm.clone(),
            prober: EndpointProber::new(&config.llm)?,
        })
    }

    pub async fn generate(
        &self,
        topic: &str,
        count: u32,
    ) -> Result<GenerationOutcome, GenerationError> {
        tracing::info!(
            "Generating {} questions for topic {:?} via {}",
            count,
            topic,
            self.llm.base_url()
        );

        let request = ChatCompletionRequest::for_generation(
            &self.llm.model,
            SYSTEM_PROMPT,
            build_question_prompt(topic, count),
        );
        let answer = self.prober.probe(&request).await?;

        let outcome = parse_questions_or_fallback(&answer.content);

        metrics::record_generation(outcome.source.as_str());
        tracing::info!(
            "Produced {} {} questions for topic {:?}",
            outcome.questions.len(),
            outcome.source.as_str(),
            topic
        );
        Ok(outcome)
    }
}
