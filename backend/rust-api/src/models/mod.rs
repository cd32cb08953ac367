pub mod chat;
pub mod generation;
pub mod question;
pub mod quiz;

pub use question::{fallback_questions, GenerationOutcome, Question, QuestionSource};
pub use quiz::{QuizResult, ResultTier, UserAnswer};
