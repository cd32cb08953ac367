use serde::{Deserialize, Serialize};

/// One submitted answer. Written once when the user submits, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub question_id: u32,
    pub selected_option: usize,
    pub is_correct: bool,
    /// Milliseconds between the question appearing and the submission.
    #[serde(rename = "timeSpent")]
    pub time_spent_ms: u64,
}

/// Aggregate computed from the full answer sequence of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: usize,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub user_answers: Vec<UserAnswer>,
    #[serde(rename = "completionTime")]
    pub completion_time_ms: u64,
    pub percentage: u32,
}

impl QuizResult {
    pub fn from_answers(
        total_questions: usize,
        user_answers: Vec<UserAnswer>,
        completion_time_ms: u64,
    ) -> Self {
        let correct_answers = user_answers.iter().filter(|a| a.is_correct).count();
        Self {
            score: correct_answers,
            total_questions,
            correct_answers,
            user_answers,
            completion_time_ms,
            percentage: percentage(correct_answers, total_questions),
        }
    }

    pub fn tier(&self) -> ResultTier {
        ResultTier::from_percentage(self.percentage)
    }
}

/// `round(100 * correct / total)`, 0 for an empty quiz.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultTier {
    Excellent,
    Good,
    KeepLearning,
}

impl ResultTier {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => ResultTier::Excellent,
            60..=79 => ResultTier::Good,
            _ => ResultTier::KeepLearning,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ResultTier::Excellent => "Excellent work! You nailed it.",
            ResultTier::Good => "Good job! Keep it up!",
            ResultTier::KeepLearning => "Keep learning! You can do better!",
        }
    }
}
