use crate::config::Config;

pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let validation = config.validate();
        if validation.is_valid {
            tracing::info!(
                "LLM gateway {} with model {}",
                config.llm.base_url(),
                config.llm.model
            );
        } else {
            // The service still starts so status routes can report the problem
            for error in &validation.errors {
                tracing::warn!("Configuration problem: {}", error);
            }
        }

        Self { config }
    }
}

pub mod connection_tester;
pub mod endpoint_prober;
pub mod error;
pub mod prompt_builder;
pub mod question_generator;
pub mod quiz_session;
pub mod response_validator;

pub use error::{ErrorKind, GenerationError};
