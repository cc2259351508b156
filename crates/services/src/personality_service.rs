use std::sync::Arc;

use quiz_core::model::{
    PERSONALITY_QUESTIONS, PersonalityResult, PersonalitySession, ProgressRecord, QuizId,
};
use quiz_storage::repository::ProgressRepository;

use crate::Clock;
use crate::auth::AuthProvider;
use crate::error::PersonalityServiceError;

/// Scores the personality quiz and records that the player finished it.
#[derive(Clone)]
pub struct PersonalityService {
    clock: Clock,
    auth: Arc<dyn AuthProvider>,
    progress: Arc<dyn ProgressRepository>,
}

impl PersonalityService {
    #[must_use]
    pub fn new(
        clock: Clock,
        auth: Arc<dyn AuthProvider>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            auth,
            progress,
        }
    }

    #[must_use]
    pub fn begin(&self) -> PersonalitySession {
        PersonalitySession::new()
    }

    /// Score a finished session and store it under the `personality` quiz.
    ///
    /// # Errors
    ///
    /// Returns `PersonalityServiceError::Personality` if the session is unfinished,
    /// `PersonalityServiceError::LoginRequired` for anonymous players, or
    /// `PersonalityServiceError::Storage` if the write fails.
    pub async fn save(
        &self,
        session: &PersonalitySession,
    ) -> Result<PersonalityResult, PersonalityServiceError> {
        let result = session.result()?;
        let user_id = self
            .auth
            .state()
            .user()
            .ok_or(PersonalityServiceError::LoginRequired)?;

        let answered = u32::try_from(PERSONALITY_QUESTIONS.len()).unwrap_or(u32::MAX);
        let record = ProgressRecord::new(
            user_id,
            QuizId::personality(),
            answered,
            0,
            self.clock.now(),
        );
        self.progress.upsert_progress(&record).await?;
        tracing::info!(%user_id, top = ?result.top(), "personality result saved");
        Ok(result)
    }
}
