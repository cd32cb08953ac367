use serde::{Deserialize, Serialize};

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// Letters shown next to options, in order.
pub const OPTION_LABELS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

/// A multiple-choice question. `options` always holds four entries and
/// `correct_answer` indexes into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    pub fn is_correct(&self, selected_option: usize) -> bool {
        selected_option == self.correct_answer
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Generated,
    Fallback,
}

impl QuestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionSource::Generated => "generated",
            QuestionSource::Fallback => "fallback",
        }
    }
}

/// Result of one generation run. `source` tells a real answer from the
/// canned set substituted when the model's payload was unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub questions: Vec<Question>,
    pub source: QuestionSource,
}

impl GenerationOutcome {
    pub fn generated(questions: Vec<Question>) -> Self {
        Self {
            questions,
            source: QuestionSource::Generated,
        }
    }

    pub fn fallback() -> Self {
        Self {
            questions: fallback_questions(),
            source: QuestionSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == QuestionSource::Fallback
    }
}

/// Fixed two-question set served when the model output cannot be used.
pub fn fallback_questions() -> Vec<Question> {
    vec![
        Question {
            id: 1,
            question: "The API call failed, so this is a sample question. What is artificial intelligence?"
                .to_string(),
            options: [
                "A computer system that simulates human intelligence".to_string(),
                "A programming language".to_string(),
                "A database".to_string(),
                "A network protocol".to_string(),
            ],
            correct_answer: 0,
            explanation: "Artificial intelligence covers the theory, methods and systems that simulate, extend and expand human intelligence."
                .to_string(),
        },
        Question {
            id: 2,
            question: "Please check your API key configuration. Which of these is not a main type of machine learning?"
                .to_string(),
            options: [
                "Supervised learning".to_string(),
                "Unsupervised learning".to_string(),
                "Reinforcement learning".to_string(),
                "Intuitive learning".to_string(),
            ],
            correct_answer: 3,
            explanation: "Machine learning is mainly split into supervised, unsupervised and reinforcement learning."
                .to_string(),
        },
    ]
}
