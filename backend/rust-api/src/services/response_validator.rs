use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::models::question::{GenerationOutcome, Question, OPTION_COUNT};
use crate::services::error::GenerationError;

lazy_static! {
    static ref OPENING_FENCE: Regex = Regex::new(r"(?i)```json\s*").unwrap();
    static ref BARE_FENCE: Regex = Regex::new(r"```\s*").unwrap();
}

/// Removes markdown code fences the model likes to wrap JSON in.
pub fn strip_code_fences(content: &str) -> String {
    let without_opening = OPENING_FENCE.replace_all(content, "");
    BARE_FENCE
        .replace_all(&without_opening, "")
        .trim()
        .to_string()
}

/// Strict parse of the model output into questions.
///
/// Requires a `questions` array whose elements each carry a non-blank
/// `question`, exactly four string `options` and an integer `correctAnswer`
/// in `0..=3`. Missing ids default to the 1-based position, a missing
/// explanation to the empty string. The first offending element is reported
/// by its 1-based index.
pub fn parse_questions(content: &str) -> Result<Vec<Question>, GenerationError> {
    let cleaned = strip_code_fences(content);
    let parsed: Value = serde_json::from_str(&cleaned)
        .map_err(|e| GenerationError::InvalidJson(e.to_string()))?;

    let items = parsed
        .get("questions")
        .and_then(Value::as_array)
        .ok_or(GenerationError::MissingQuestions)?;

    items
        .iter()
        .enumerate()
        .map(|(offset, item)| normalize_question(offset + 1, item))
        .collect()
}

/// Degrading parse: any failure is logged and replaced by the fallback set,
/// with the outcome marked so callers can tell.
pub fn parse_questions_or_fallback(content: &str) -> GenerationOutcome {
    match parse_questions(content) {
        Ok(questions) => GenerationOutcome::generated(questions),
        Err(e) => {
            tracing::warn!("Discarding model output, serving fallback questions: {}", e);
            tracing::debug!("Rejected model output: {}", content);
            GenerationOutcome::fallback()
        }
    }
}

fn normalize_question(index: usize, item: &Value) -> Result<Question, GenerationError> {
    let invalid = |reason: String| GenerationError::InvalidQuestion { index, reason };

    let text = item
        .get("question")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| invalid("missing question text".to_string()))?;

    let raw_options = item
        .get("options")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("options must be an array".to_string()))?;
    if raw_options.len() != OPTION_COUNT {
        return Err(invalid(format!(
            "expected {} options, got {}",
            OPTION_COUNT,
            raw_options.len()
        )));
    }

    let mut options: [String; OPTION_COUNT] = Default::default();
    for (slot, raw) in options.iter_mut().zip(raw_options) {
        *slot = raw
            .as_str()
            .ok_or_else(|| invalid("options must be strings".to_string()))?
            .to_string();
    }

    let correct_answer = item
        .get("correctAnswer")
        .and_then(Value::as_u64)
        .and_then(|answer| usize::try_from(answer).ok())
        .filter(|answer| *answer < OPTION_COUNT)
        .ok_or_else(|| invalid("correct answer index is invalid".to_string()))?;

    let id = item
        .get("id")
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .filter(|id| *id > 0)
        .unwrap_or(index as u32);

    let explanation = item
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(Question {
        id,
        question: text.to_string(),
        options,
        correct_answer,
        explanation,
    })
}
