use quiz_core::QuizSession;

/// What the quiz screen is showing.
#[derive(Debug, Clone)]
pub enum QuizScreen {
    Loading,
    Ready(Box<QuizSession>),
    /// The question fetch failed; the player can retry.
    Failed { message: String },
}

impl QuizScreen {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, QuizScreen::Ready(_))
    }

    #[must_use]
    pub fn session_mut(&mut self) -> Option<&mut QuizSession> {
        match self {
            QuizScreen::Ready(session) => Some(session),
            _ => None,
        }
    }
}
