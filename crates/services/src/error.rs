//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::QuizError;
use quiz_core::model::{PersonalityError, PokerLogError};
use quiz_storage::repository::StorageError;
use quiz_storage::sqlite::SqliteInitError;

/// Errors loading the question list. Terminal for the screen; the player retries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("invalid question source url: {0}")]
    Url(#[from] url::ParseError),
    #[error("question request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid question data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors emitted by the quiz session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error("quiz has already ended")]
    Finished,
    #[error("answer input closed before the quiz ended")]
    InputClosed,
}

/// Errors emitted by `LeaderboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CompanionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompanionError {
    #[error("sign in to use the poker companion")]
    LoginRequired,
    #[error(transparent)]
    Log(#[from] PokerLogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PersonalityService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersonalityServiceError {
    #[error("sign in to save your personality result")]
    LoginRequired,
    #[error(transparent)]
    Personality(#[from] PersonalityError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
