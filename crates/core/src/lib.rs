#![forbid(unsafe_code)]

pub mod model;
pub mod session;
pub mod shuffle;
pub mod table;
pub mod time;

pub use session::{
    Advance, AnswerReveal, AnswerSource, LoginPromptPolicy, QuizConfig, QuizError, QuizSession,
    ResumePoint, SessionPhase, SessionProgress,
};
pub use time::Clock;
