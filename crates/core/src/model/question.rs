use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::position::{Position, extract_position};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id}: prompt cannot be empty")]
    EmptyPrompt { id: QuestionId },

    #[error("question {id}: needs at least 2 options, got {count}")]
    TooFewOptions { id: QuestionId, count: usize },

    #[error("question {id}: answer is not one of the options")]
    AnswerNotAnOption { id: QuestionId },

    #[error("question {id}: flop holds at most 3 cards, got {count}")]
    FlopTooLong { id: QuestionId, count: usize },
}

//
// ─── TABLE DATA ────────────────────────────────────────────────────────────────
//

/// What an opponent did before the hero's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentAction {
    #[serde(rename = "position")]
    pub seat_label: String,
    #[serde(rename = "action")]
    pub action_text: String,
}

impl OpponentAction {
    #[must_use]
    pub fn new(seat_label: impl Into<String>, action_text: impl Into<String>) -> Self {
        Self {
            seat_label: seat_label.into(),
            action_text: action_text.into(),
        }
    }
}

/// Hole cards and the board for a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cards {
    #[serde(rename = "player", default)]
    pub player_cards: Vec<String>,
    #[serde(default)]
    pub flop: Vec<String>,
    #[serde(default)]
    pub turn: Option<String>,
    #[serde(default)]
    pub river: Option<String>,
}

impl Cards {
    /// Board cards in dealing order.
    ///
    /// Turn and river are only shown once a flop exists.
    #[must_use]
    pub fn community(&self) -> Vec<String> {
        if self.flop.is_empty() {
            return Vec::new();
        }
        self.flop
            .iter()
            .chain(self.turn.iter())
            .chain(self.river.iter())
            .cloned()
            .collect()
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Wire shape of a record in `questions.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuestionRecord {
    id: QuestionId,
    question: String,
    options: Vec<String>,
    answer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    opponent_actions: Vec<OpponentAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cards: Option<Cards>,
}

/// A validated multiple-choice question.
///
/// Immutable once built; the answer is guaranteed to be one of the options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    opponent_actions: Vec<OpponentAction>,
    cards: Option<Cards>,
}

impl Question {
    /// Builds a question without table data.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, fewer than two options
    /// are given, or the answer is not one of the options.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let correct_answer = correct_answer.into();

        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt { id });
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                id,
                count: options.len(),
            });
        }
        if !options.iter().any(|o| *o == correct_answer) {
            return Err(QuestionError::AnswerNotAnOption { id });
        }

        Ok(Self {
            id,
            prompt,
            options,
            correct_answer,
            opponent_actions: Vec::new(),
            cards: None,
        })
    }

    #[must_use]
    pub fn with_opponent_actions(mut self, actions: Vec<OpponentAction>) -> Self {
        self.opponent_actions = actions;
        self
    }

    /// Attaches hole and board cards.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::FlopTooLong` for more than three flop cards.
    pub fn with_cards(mut self, cards: Cards) -> Result<Self, QuestionError> {
        if cards.flop.len() > 3 {
            return Err(QuestionError::FlopTooLong {
                id: self.id,
                count: cards.flop.len(),
            });
        }
        self.cards = Some(cards);
        Ok(self)
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn opponent_actions(&self) -> &[OpponentAction] {
        &self.opponent_actions
    }

    #[must_use]
    pub fn cards(&self) -> Option<&Cards> {
        self.cards.as_ref()
    }

    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    /// Hero seat named in the prompt, `BTN` when none is recognised.
    #[must_use]
    pub fn hero_position(&self) -> Position {
        extract_position(&self.prompt)
    }
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        let question = Question::new(record.id, record.question, record.options, record.answer)?
            .with_opponent_actions(record.opponent_actions);
        match record.cards {
            Some(cards) => question.with_cards(cards),
            None => Ok(question),
        }
    }
}

impl From<Question> for QuestionRecord {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question: q.prompt,
            options: q.options,
            answer: q.correct_answer,
            opponent_actions: q.opponent_actions,
            cards: q.cards,
        }
    }
}
