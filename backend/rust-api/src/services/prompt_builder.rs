//! Instruction text sent to the model.

/// System message attached to every generation request.
pub const SYSTEM_PROMPT: &str = "You are a professional educational content creator who writes \
high-quality multiple-choice questions. Reply strictly in the requested JSON format and do not \
include any other text.";

pub const DEFAULT_QUESTION_COUNT: u32 = 10;

/// Renders the user prompt for `count` questions about `topic`.
/// Pure: the same inputs always produce the same string.
pub fn build_question_prompt(topic: &str, count: u32) -> String {
    format!(
        r#"Create {count} multiple-choice questions about the topic "{topic}".

Requirements:
1. Every question has 4 options (A, B, C, D)
2. Questions should have some depth and be challenging
3. Answers must be accurate
4. Include a short explanation of why the correct answer is right
5. Cover different aspects of the topic

Return strictly the following JSON format and no other text:

{{
  "questions": [
    {{
      "id": 1,
      "question": "Question text",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswer": 0,
      "explanation": "Why this answer is correct"
    }}
  ]
}}

Notes:
- correctAnswer is the index of the correct option (0-3)
- Make sure the JSON is well formed
- Do not add any extra text or commentary"#,
        count = count,
        topic = topic,
    )
}
