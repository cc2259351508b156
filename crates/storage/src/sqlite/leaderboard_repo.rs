use async_trait::async_trait;
use quiz_core::model::{LeaderboardEntry, QuizId, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_leaderboard_row};
use crate::repository::{LeaderboardRepository, StorageError};

#[async_trait]
impl LeaderboardRepository for SqliteRepository {
    async fn submit_if_greater(&self, entry: &LeaderboardEntry) -> Result<bool, StorageError> {
        // The conditional upsert leaves the row untouched (0 changes) unless the score improves.
        let res = sqlx::query(
            r"
            INSERT INTO quiz_leaderboard (user_id, quiz_id, score, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, quiz_id) DO UPDATE SET
                score = excluded.score,
                updated_at = excluded.updated_at
            WHERE excluded.score > quiz_leaderboard.score
            ",
        )
        .bind(entry.user_id.to_string())
        .bind(entry.quiz_id.as_str())
        .bind(i64::from(entry.score))
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.rows_affected() > 0)
    }

    async fn top_scores(
        &self,
        quiz_id: &QuizId,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, quiz_id, score, updated_at
            FROM quiz_leaderboard
            WHERE quiz_id = ?1
            ORDER BY score DESC, updated_at ASC, user_id ASC
            LIMIT ?2
            ",
        )
        .bind(quiz_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_leaderboard_row).collect()
    }

    async fn get_best(
        &self,
        user_id: UserId,
        quiz_id: &QuizId,
    ) -> Result<Option<LeaderboardEntry>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, quiz_id, score, updated_at
            FROM quiz_leaderboard
            WHERE user_id = ?1 AND quiz_id = ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(quiz_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_leaderboard_row).transpose()
    }
}
