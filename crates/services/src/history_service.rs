use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{QuizHistory, QuizId, UserId};
use quiz_storage::repository::{ProgressRepository, StorageError};

/// Reads a player's previous run of a quiz.
#[derive(Clone)]
pub struct HistoryService {
    progress: Arc<dyn ProgressRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self { progress }
    }

    /// `None` for anonymous players and for quizzes never played.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the progress lookup fails.
    pub async fn history(
        &self,
        user_id: Option<UserId>,
        quiz_id: &QuizId,
    ) -> Result<Option<QuizHistory>, StorageError> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        let record = self.progress.get_progress(user_id, quiz_id).await?;
        Ok(record.map(QuizHistory::from))
    }
}

/// Renders a timestamp as "April 17, 2025".
#[must_use]
pub fn format_played_on(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}
