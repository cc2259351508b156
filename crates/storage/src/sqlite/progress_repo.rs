use async_trait::async_trait;
use quiz_core::model::{ProgressRecord, QuizId, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_progress_row};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quiz_progress (user_id, quiz_id, last_question_index, score, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id, quiz_id) DO UPDATE SET
                last_question_index = excluded.last_question_index,
                score = excluded.score,
                updated_at = excluded.updated_at
            ",
        )
        .bind(record.user_id.to_string())
        .bind(record.quiz_id.as_str())
        .bind(i64::from(record.last_question_index))
        .bind(i64::from(record.score))
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        quiz_id: &QuizId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, quiz_id, last_question_index, score, updated_at
            FROM quiz_progress
            WHERE user_id = ?1 AND quiz_id = ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(quiz_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_progress_row).transpose()
    }
}
