use std::sync::Arc;

use quiz_core::model::{LeaderboardEntry, QuizId, RankedEntry, UserId, rank_entries};
use quiz_storage::repository::LeaderboardRepository;

use crate::Clock;
use crate::error::LeaderboardError;

/// Rows returned when no limit is given.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

/// Best-score submission and ranked reads.
#[derive(Clone)]
pub struct LeaderboardService {
    clock: Clock,
    leaderboard: Arc<dyn LeaderboardRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(clock: Clock, leaderboard: Arc<dyn LeaderboardRepository>) -> Self {
        Self { clock, leaderboard }
    }

    /// Record `score` if it beats the user's stored best. Returns whether it did.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::Storage` if the write fails.
    pub async fn submit(
        &self,
        user_id: UserId,
        quiz_id: &QuizId,
        score: u32,
    ) -> Result<bool, LeaderboardError> {
        let entry = LeaderboardEntry {
            user_id,
            quiz_id: quiz_id.clone(),
            score,
            updated_at: self.clock.now(),
        };
        let stored = self.leaderboard.submit_if_greater(&entry).await?;
        tracing::debug!(%user_id, %quiz_id, score, stored, "leaderboard submission");
        Ok(stored)
    }

    /// Ranked top scores for a quiz, best first.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::Storage` if the read fails.
    pub async fn top(
        &self,
        quiz_id: &QuizId,
        limit: Option<u32>,
    ) -> Result<Vec<RankedEntry>, LeaderboardError> {
        let limit = limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
        let entries = self.leaderboard.top_scores(quiz_id, limit).await?;
        Ok(rank_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_clock;
    use quiz_storage::InMemoryRepository;

    #[tokio::test]
    async fn ranks_submissions_and_keeps_best() {
        let service = LeaderboardService::new(fixed_clock(), Arc::new(InMemoryRepository::new()));
        let quiz = QuizId::quiz_one();
        let (a, b) = (UserId::random(), UserId::random());

        assert!(service.submit(a, &quiz, 4).await.unwrap());
        assert!(service.submit(b, &quiz, 7).await.unwrap());
        assert!(!service.submit(b, &quiz, 6).await.unwrap());

        let top = service.top(&quiz, None).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user_id, b);
        assert_eq!(top[0].display_name, "Player 1");
        assert_eq!(top[0].score, 7);
        assert_eq!(top[1].rank, 2);
    }
}
