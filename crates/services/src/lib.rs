#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod companion_service;
pub mod error;
pub mod gameplay_service;
pub mod history_service;
pub mod leaderboard_service;
pub mod personality_service;
pub mod questions;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use auth::{AuthProvider, AuthState, LocalAuth};
pub use companion_service::{CompanionService, pnl_label};
pub use error::{
    AppServicesError, CompanionError, FetchError, LeaderboardError, PersonalityServiceError,
    SessionError,
};
pub use gameplay_service::GameplayService;
pub use history_service::{HistoryService, format_played_on};
pub use leaderboard_service::{DEFAULT_LEADERBOARD_LIMIT, LeaderboardService};
pub use personality_service::PersonalityService;
pub use questions::{
    FileQuestionSource, HttpQuestionSource, QuestionSource, StaticQuestionSource, parse_questions,
};
pub use sessions::{
    DriverEvent, QuizScreen, SessionDriver, SessionLoopService, SessionView, StepOutcome,
};
