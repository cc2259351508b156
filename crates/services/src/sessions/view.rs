use chrono::{DateTime, Utc};

use quiz_core::table::{SeatView, TableView};
use quiz_core::time::elapsed;
use quiz_core::{QuizSession, SessionPhase};

/// Presentation-agnostic snapshot of a running quiz.
///
/// Callers re-derive it after every transition or tick; it holds no state of
/// its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub phase: SessionPhase,
    /// 1-based position of the current question.
    pub question_number: usize,
    pub total: usize,
    pub prompt: Option<String>,
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub is_correct: Option<bool>,
    /// Only populated while an answer is revealed.
    pub correct_answer: Option<String>,
    pub score: u32,
    pub lives: Option<u8>,
    /// Whole seconds left on the countdown, rounded up.
    pub seconds_left: Option<u64>,
    pub table: Option<TableView>,
    pub visible_opponents: Vec<SeatView>,
}

impl SessionView {
    #[must_use]
    pub fn from_session(session: &QuizSession, now: DateTime<Utc>) -> Self {
        let question = session.current_question();
        let table = question.map(TableView::for_question);
        let visible_opponents = table
            .as_ref()
            .map(|t| {
                let since = elapsed(session.question_started_at(), now);
                t.visible_opponents(since, session.config().opponent_reveal_interval())
                    .to_vec()
            })
            .unwrap_or_default();

        let correct_answer = match (session.phase(), question) {
            (SessionPhase::AnswerRevealed, Some(q)) => Some(q.correct_answer().to_owned()),
            _ => None,
        };

        let seconds_left = session.remaining_time(now).map(|left| {
            let secs = left.as_secs();
            if left.subsec_nanos() > 0 { secs + 1 } else { secs }
        });

        Self {
            phase: session.phase(),
            question_number: (session.current_index() + 1).min(session.total()),
            total: session.total(),
            prompt: question.map(|q| q.prompt().to_owned()),
            options: question.map(|q| q.options().to_vec()).unwrap_or_default(),
            selected: session.selected_answer().map(str::to_owned),
            is_correct: session.answer_is_correct(),
            correct_answer,
            score: session.score(),
            lives: session.lives_remaining(),
            seconds_left,
            table,
            visible_opponents,
        }
    }

    /// "Score: 3/10".
    #[must_use]
    pub fn score_line(&self) -> String {
        format!("Score: {}/{}", self.score, self.total)
    }
}
