use serde::Serialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_APP_NAME: &str = "FlashCard Study Assistant";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Upper bound accepted for `app.max_questions`.
pub const MAX_QUESTIONS_LIMIT: i64 = 50;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

impl LlmConfig {
    /// Base URL without a trailing slash, ready for path suffixes.
    pub fn base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub max_questions: i64,
}

#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub default_question_count: u32,
    pub min_question_count: u32,
    pub max_question_count: u32,
}

/// Immutable configuration snapshot, built once at startup and handed to
/// every component that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub app: AppConfig,
    pub quiz: QuizConfig,
    pub environment: String,
    pub bind_address: String,
    pub metrics_auth: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStatus {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub environment: String,
    pub has_api_key: bool,
    pub api_key_masked: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: String::new(),
                base_url: DEFAULT_BASE_URL.to_string(),
                model: DEFAULT_MODEL.to_string(),
                request_timeout_secs: 60,
            },
            app: AppConfig {
                name: DEFAULT_APP_NAME.to_string(),
                max_questions: 10,
            },
            quiz: QuizConfig {
                default_question_count: 10,
                min_question_count: 5,
                max_question_count: 15,
            },
            environment: "development".to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            metrics_auth: "admin:changeme".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Local .env is optional; real deployments inject variables directly
        dotenvy::dotenv().ok();

        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        // config/{env}.toml first, APP__SECTION__KEY variables override it
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = Config::default();

        let api_key = settings
            .get_string("llm.api_key")
            .or_else(|_| env::var("DEEPSEEK_API_KEY"))
            .unwrap_or_default();

        let base_url = settings
            .get_string("llm.base_url")
            .or_else(|_| env::var("DEEPSEEK_API_BASE_URL"))
            .unwrap_or(defaults.llm.base_url);

        let model = settings
            .get_string("llm.model")
            .or_else(|_| env::var("DEEPSEEK_MODEL"))
            .unwrap_or(defaults.llm.model);

        let request_timeout_secs = settings
            .get_int("llm.request_timeout_secs")
            .ok()
            .or_else(|| int_from_env("LLM_REQUEST_TIMEOUT_SECS"))
            .and_then(|value| u64::try_from(value).ok())
            .unwrap_or(defaults.llm.request_timeout_secs);

        let name = settings
            .get_string("app.name")
            .or_else(|_| env::var("NEXT_PUBLIC_APP_NAME"))
            .unwrap_or(defaults.app.name);

        // An unparseable value is kept as 0 so validation reports it
        let max_questions = settings
            .get_int("app.max_questions")
            .ok()
            .or_else(|| {
                env::var("NEXT_PUBLIC_MAX_QUESTIONS")
                    .ok()
                    .map(|raw| raw.trim().parse::<i64>().unwrap_or(0))
            })
            .unwrap_or(defaults.app.max_questions);

        let quiz = QuizConfig {
            default_question_count: count_setting(
                &settings,
                "quiz.default_question_count",
                defaults.quiz.default_question_count,
            ),
            min_question_count: count_setting(
                &settings,
                "quiz.min_question_count",
                defaults.quiz.min_question_count,
            ),
            max_question_count: count_setting(
                &settings,
                "quiz.max_question_count",
                defaults.quiz.max_question_count,
            ),
        };

        let bind_address = settings
            .get_string("server.bind_address")
            .or_else(|_| env::var("BIND_ADDRESS"))
            .unwrap_or(defaults.bind_address);

        let metrics_auth = settings
            .get_string("metrics.auth")
            .or_else(|_| env::var("METRICS_AUTH"))
            .unwrap_or_else(|_| {
                if environment == "production" {
                    tracing::warn!("METRICS_AUTH is not set, /metrics uses default credentials");
                }
                defaults.metrics_auth
            });

        Ok(Config {
            llm: LlmConfig {
                api_key,
                base_url,
                model,
                request_timeout_secs,
            },
            app: AppConfig {
                name,
                max_questions,
            },
            quiz,
            environment,
            bind_address,
            metrics_auth,
        })
    }

    /// Itemized presence and range checks. Never fails; callers decide what
    /// an invalid configuration means for them.
    pub fn validate(&self) -> ConfigValidation {
        let mut errors = Vec::new();

        if self.llm.api_key.trim().is_empty() {
            errors.push("DEEPSEEK_API_KEY environment variable is not set".to_string());
        }

        let base_url = self.llm.base_url();
        if base_url.is_empty() {
            errors.push("DEEPSEEK_API_BASE_URL environment variable is not set".to_string());
        } else {
            match url::Url::parse(base_url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => errors.push(format!(
                    "DEEPSEEK_API_BASE_URL must use http or https, got '{}'",
                    parsed.scheme()
                )),
                Err(e) => errors.push(format!("DEEPSEEK_API_BASE_URL is not a valid URL: {}", e)),
            }
        }

        if self.llm.model.trim().is_empty() {
            errors.push("model name must not be empty".to_string());
        }

        if !(1..=MAX_QUESTIONS_LIMIT).contains(&self.app.max_questions) {
            errors.push(format!(
                "NEXT_PUBLIC_MAX_QUESTIONS must be between 1 and {}",
                MAX_QUESTIONS_LIMIT
            ));
        }

        let quiz = &self.quiz;
        if quiz.min_question_count == 0
            || quiz.min_question_count > quiz.default_question_count
            || quiz.default_question_count > quiz.max_question_count
        {
            errors.push(format!(
                "question count bounds are inconsistent (min {}, default {}, max {})",
                quiz.min_question_count, quiz.default_question_count, quiz.max_question_count
            ));
        }

        ConfigValidation {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn status(&self) -> ConfigStatus {
        let validation = self.validate();
        ConfigStatus {
            is_valid: validation.is_valid,
            errors: validation.errors,
            environment: self.environment.clone(),
            has_api_key: !self.llm.api_key.trim().is_empty(),
            api_key_masked: mask_api_key(&self.llm.api_key),
        }
    }

    /// Number of questions requested per generation: the quiz default,
    /// clamped to the quiz bounds and the application-wide maximum.
    pub fn question_count(&self) -> u32 {
        let quiz = &self.quiz;
        let lower = quiz.min_question_count.min(quiz.max_question_count);
        let bounded = quiz
            .default_question_count
            .clamp(lower, quiz.max_question_count.max(lower));
        let app_cap = u32::try_from(self.app.max_questions.clamp(1, MAX_QUESTIONS_LIMIT)).unwrap_or(1);
        bounded.min(app_cap).max(1)
    }
}

/// `sk-abcdef...wxyz` style rendering for status pages.
pub fn mask_api_key(key: &str) -> String {
    let key = key.trim();
    if key.is_empty() {
        return "not set".to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn int_from_env(name: &str) -> Option<i64> {
    env::var(name).ok().and_then(|raw| raw.trim().parse().ok())
}

fn count_setting(settings: &config::Config, key: &str, default: u32) -> u32 {
    settings
        .get_int(key)
        .ok()
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(default)
}
