mod gameplay;
mod ids;
mod personality;
mod poker_log;
mod position;
mod progress;
mod question;

pub use gameplay::{GameplayTally, LOGIN_PROMPT_EVERY};
pub use ids::{ParseIdError, PokerLogId, QuestionId, QuizId, UserId};
pub use personality::{
    PERSONALITY_QUESTIONS, PersonalityAnswer, PersonalityError, PersonalityQuestion,
    PersonalityResult, PersonalitySession, PersonalityType,
};
pub use poker_log::{LogSort, PokerLog, PokerLogDraft, PokerLogError};
pub use position::{Position, UnknownPosition, extract_position, parse_position};
pub use progress::{LeaderboardEntry, ProgressRecord, QuizHistory, RankedEntry, rank_entries};
pub use question::{Cards, OpponentAction, Question, QuestionError};
