use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::models::question::{Question, OPTION_COUNT};
use crate::models::quiz::{QuizResult, UserAnswer};

/// How long the correct answer stays on screen before moving on.
pub const REVEAL_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Active { index: usize },
    Revealed { index: usize },
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while the session is {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: SessionState,
    },

    #[error("no option has been selected")]
    NoSelection,

    #[error("option {0} does not exist")]
    OptionOutOfRange(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub percent: u32,
}

/// One user's run through a question set.
///
/// `Loading -> Active(0) -> Revealed(0) -> Active(1) -> ... -> Completed`,
/// or `Loading -> Failed` when nothing could be loaded. A revealed question
/// cannot be answered again. Every transition has an `_at` form taking the
/// current time explicitly.
#[derive(Debug, Clone)]
pub struct QuizSession {
    state: SessionState,
    questions: Vec<Question>,
    answers: Vec<UserAnswer>,
    selected: Option<usize>,
    started_at: DateTime<Utc>,
    question_started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            state: SessionState::Loading,
            questions: Vec::new(),
            answers: Vec::new(),
            selected: None,
            started_at: now,
            question_started_at: now,
            completed_at: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[UserAnswer] {
        &self.answers
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.selected
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::Active { index } | SessionState::Revealed { index } => {
                self.questions.get(index)
            }
            _ => None,
        }
    }

    /// Answer recorded for the question currently on screen, once revealed.
    pub fn revealed_answer(&self) -> Option<&UserAnswer> {
        match self.state {
            SessionState::Revealed { .. } => self.answers.last(),
            _ => None,
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        let index = match self.state {
            SessionState::Active { index } | SessionState::Revealed { index } => index,
            _ => return None,
        };
        let total = self.questions.len();
        let position = index + 1;
        Some(Progress {
            position,
            total,
            percent: ((position as f64 / total as f64) * 100.0).round() as u32,
        })
    }

    pub fn load(&mut self, questions: Vec<Question>) -> Result<SessionState, SessionError> {
        self.load_at(questions, Utc::now())
    }

    pub fn load_at(
        &mut self,
        questions: Vec<Question>,
        now: DateTime<Utc>,
    ) -> Result<SessionState, SessionError> {
        self.expect_state("load questions", |state| state == SessionState::Loading)?;

        if questions.is_empty() {
            tracing::warn!("Quiz session received no questions");
            self.state = SessionState::Failed;
            return Ok(self.state);
        }

        self.questions = questions;
        self.begin_at(now);
        Ok(self.state)
    }

    pub fn select_option(&mut self, option: usize) -> Result<(), SessionError> {
        self.expect_state("select an option", |state| {
            matches!(state, SessionState::Active { .. })
        })?;
        if option >= OPTION_COUNT {
            return Err(SessionError::OptionOutOfRange(option));
        }
        self.selected = Some(option);
        Ok(())
    }

    pub fn submit(&mut self) -> Result<&UserAnswer, SessionError> {
        self.submit_at(Utc::now())
    }

    pub fn submit_at(&mut self, now: DateTime<Utc>) -> Result<&UserAnswer, SessionError> {
        let index = match self.state {
            SessionState::Active { index } => index,
            state => {
                return Err(SessionError::InvalidTransition {
                    action: "submit an answer",
                    state,
                })
            }
        };
        let selected = self.selected.ok_or(SessionError::NoSelection)?;
        let question = &self.questions[index];

        let answer = UserAnswer {
            question_id: question.id,
            selected_option: selected,
            is_correct: question.is_correct(selected),
            time_spent_ms: elapsed_ms(self.question_started_at, now),
        };
        tracing::debug!(
            "Question {} answered with option {} (correct: {})",
            answer.question_id,
            answer.selected_option,
            answer.is_correct
        );

        self.answers.push(answer);
        self.state = SessionState::Revealed { index };
        Ok(&self.answers[self.answers.len() - 1])
    }

    pub fn advance(&mut self) -> Result<SessionState, SessionError> {
        self.advance_at(Utc::now())
    }

    /// Leaves the reveal screen: next question, or completion after the last.
    pub fn advance_at(&mut self, now: DateTime<Utc>) -> Result<SessionState, SessionError> {
        let index = match self.state {
            SessionState::Revealed { index } => index,
            state => {
                return Err(SessionError::InvalidTransition {
                    action: "advance",
                    state,
                })
            }
        };

        self.selected = None;
        if index + 1 < self.questions.len() {
            self.state = SessionState::Active { index: index + 1 };
            self.question_started_at = now;
        } else {
            self.state = SessionState::Completed;
            self.completed_at = Some(now);
        }
        Ok(self.state)
    }

    /// Waits out [`REVEAL_DELAY`] and then advances.
    pub async fn advance_after_reveal(&mut self) -> Result<SessionState, SessionError> {
        self.expect_state("advance", |state| {
            matches!(state, SessionState::Revealed { .. })
        })?;
        tokio::time::sleep(REVEAL_DELAY).await;
        self.advance()
    }

    pub fn result(&self) -> Option<QuizResult> {
        if self.state != SessionState::Completed {
            return None;
        }
        let completed_at = self.completed_at.unwrap_or(self.started_at);
        Some(QuizResult::from_answers(
            self.questions.len(),
            self.answers.clone(),
            elapsed_ms(self.started_at, completed_at),
        ))
    }

    pub fn restart(&mut self) -> Result<SessionState, SessionError> {
        self.restart_at(Utc::now())
    }

    /// Starts the same questions again from the first one with no answers.
    pub fn restart_at(&mut self, now: DateTime<Utc>) -> Result<SessionState, SessionError> {
        self.expect_state("restart", |state| state == SessionState::Completed)?;
        self.answers.clear();
        self.begin_at(now);
        Ok(self.state)
    }

    fn begin_at(&mut self, now: DateTime<Utc>) {
        self.state = SessionState::Active { index: 0 };
        self.selected = None;
        self.started_at = now;
        self.question_started_at = now;
        self.completed_at = None;
    }

    fn expect_state(
        &self,
        action: &'static str,
        allowed: impl Fn(SessionState) -> bool,
    ) -> Result<(), SessionError> {
        if allowed(self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }
}

fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn question(id: u32, correct_answer: usize) -> Question {
        Question {
            id,
            question: format!("Question {}", id),
            options: [
                "first".to_string(),
                "second".to_string(),
                "third".to_string(),
                "fourth".to_string(),
            ],
            correct_answer,
            explanation: String::new(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn secs(n: i64) -> DateTime<Utc> {
        t0() + ChronoDuration::seconds(n)
    }

    fn loaded(questions: Vec<Question>) -> QuizSession {
        let mut session = QuizSession::new();
        session.load_at(questions, t0()).unwrap();
        session
    }

    fn answer(session: &mut QuizSession, option: usize, at: DateTime<Utc>) -> UserAnswer {
        session.select_option(option).unwrap();
        session.submit_at(at).unwrap().clone()
    }

    #[test]
    fn test_starts_loading_and_activates_first_question() {
        let mut session = QuizSession::new();
        assert_eq!(session.state(), SessionState::Loading);
        assert!(session.current_question().is_none());

        let state = session.load_at(vec![question(1, 0), question(2, 1)], t0()).unwrap();
        assert_eq!(state, SessionState::Active { index: 0 });
        assert_eq!(session.current_question().unwrap().id, 1);
    }

    #[test]
    fn test_empty_question_set_fails_the_session() {
        let mut session = QuizSession::new();
        assert_eq!(session.load_at(vec![], t0()).unwrap(), SessionState::Failed);
        assert!(session.select_option(0).is_err());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_correct_selection_is_marked_correct() {
        let mut session = loaded(vec![question(10, 2)]);
        let recorded = answer(&mut session, 2, secs(5));
        assert!(recorded.is_correct);
        assert_eq!(recorded.question_id, 10);
        assert_eq!(recorded.selected_option, 2);
        assert_eq!(recorded.time_spent_ms, 5_000);
        assert_eq!(session.state(), SessionState::Revealed { index: 0 });
    }

    #[test]
    fn test_wrong_selection_is_marked_incorrect() {
        let mut session = loaded(vec![question(1, 2)]);
        assert!(!answer(&mut session, 3, secs(1)).is_correct);
    }

    #[test]
    fn test_submit_requires_a_selection() {
        let mut session = loaded(vec![question(1, 0)]);
        assert_eq!(session.submit_at(secs(1)).unwrap_err(), SessionError::NoSelection);
        assert_eq!(session.state(), SessionState::Active { index: 0 });
    }

    #[test]
    fn test_rejects_out_of_range_option() {
        let mut session = loaded(vec![question(1, 0)]);
        assert_eq!(
            session.select_option(4).unwrap_err(),
            SessionError::OptionOutOfRange(4)
        );
    }

    #[test]
    fn test_revealed_question_is_locked() {
        let mut session = loaded(vec![question(1, 0), question(2, 0)]);
        answer(&mut session, 1, secs(1));

        assert!(matches!(
            session.select_option(0),
            Err(SessionError::InvalidTransition { .. })
        ));
        assert!(matches!(
            session.submit_at(secs(2)),
            Err(SessionError::InvalidTransition { .. })
        ));
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.selected_option(), Some(1));
        assert!(!session.revealed_answer().unwrap().is_correct);
    }

    #[test]
    fn test_advance_only_from_revealed() {
        let mut session = loaded(vec![question(1, 0)]);
        assert!(matches!(
            session.advance_at(secs(1)),
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_advancing_resets_selection_and_timer() {
        let mut session = loaded(vec![question(1, 0), question(2, 1)]);
        answer(&mut session, 0, secs(3));
        assert_eq!(
            session.advance_at(secs(5)).unwrap(),
            SessionState::Active { index: 1 }
        );
        assert_eq!(session.selected_option(), None);

        let second = answer(&mut session, 1, secs(9));
        assert_eq!(second.time_spent_ms, 4_000);
    }

    #[test]
    fn test_full_run_scores_and_completes() {
        let mut session = loaded(vec![question(1, 0), question(2, 1), question(3, 2)]);

        answer(&mut session, 0, secs(2));
        session.advance_at(secs(4)).unwrap();
        answer(&mut session, 3, secs(6));
        session.advance_at(secs(8)).unwrap();
        answer(&mut session, 2, secs(10));
        assert!(session.result().is_none());
        assert_eq!(session.advance_at(secs(12)).unwrap(), SessionState::Completed);

        let result = session.result().unwrap();
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.score, 2);
        assert_eq!(result.percentage, 67);
        assert_eq!(result.completion_time_ms, 12_000);
        assert_eq!(result.user_answers.len(), 3);
    }

    #[test]
    fn test_restart_clears_answers() {
        let mut session = loaded(vec![question(1, 0)]);
        answer(&mut session, 0, secs(1));
        session.advance_at(secs(3)).unwrap();

        assert_eq!(
            session.restart_at(secs(10)).unwrap(),
            SessionState::Active { index: 0 }
        );
        assert!(session.answers().is_empty());
        assert!(session.result().is_none());

        let again = answer(&mut session, 0, secs(11));
        assert_eq!(again.time_spent_ms, 1_000);
    }

    #[test]
    fn test_restart_only_after_completion() {
        let mut session = loaded(vec![question(1, 0)]);
        assert!(session.restart_at(secs(1)).is_err());
    }

    #[test]
    fn test_progress_tracks_position() {
        let mut session = loaded(vec![question(1, 0), question(2, 0), question(3, 0), question(4, 0)]);
        assert_eq!(
            session.progress(),
            Some(Progress {
                position: 1,
                total: 4,
                percent: 25
            })
        );
        answer(&mut session, 0, secs(1));
        session.advance_at(secs(2)).unwrap();
        assert_eq!(session.progress().unwrap().position, 2);
        assert_eq!(session.progress().unwrap().percent, 50);
    }

    #[tokio::test]
    async fn test_advance_after_reveal_requires_revealed_state() {
        let mut session = loaded(vec![question(1, 0)]);
        assert!(matches!(
            session.advance_after_reveal().await,
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_advance_after_reveal_moves_to_next_question() {
        let mut session = loaded(vec![question(1, 0), question(2, 1)]);
        session.select_option(0).unwrap();
        session.submit().unwrap();

        let started = std::time::Instant::now();
        let state = session.advance_after_reveal().await.unwrap();

        assert!(started.elapsed() >= REVEAL_DELAY);
        assert_eq!(state, SessionState::Active { index: 1 });
        assert_eq!(session.state(), SessionState::Active { index: 1 });
        assert_eq!(session.current_question().unwrap().id, 2);
        assert_eq!(session.selected_option(), None);
    }

    #[tokio::test]
    async fn test_advance_after_reveal_completes_after_last_question() {
        let mut session = loaded(vec![question(1, 2)]);
        session.select_option(2).unwrap();
        session.submit().unwrap();

        let started = std::time::Instant::now();
        let state = session.advance_after_reveal().await.unwrap();

        assert!(started.elapsed() >= REVEAL_DELAY);
        assert_eq!(state, SessionState::Completed);
        let result = session.result().unwrap();
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.percentage, 100);
    }
}
