use async_trait::async_trait;
use quiz_core::model::{PokerLog, PokerLogId, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_poker_log_row};
use crate::repository::{PokerLogRepository, StorageError};

const LOG_COLUMNS: &str =
    "id, user_id, played_on, buy_in, small_blind, big_blind, cash_out, notes, created_at";

#[async_trait]
impl PokerLogRepository for SqliteRepository {
    async fn insert_log(&self, log: &PokerLog) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO poker_logs (
                id, user_id, played_on, buy_in, small_blind, big_blind, cash_out, notes, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(log.id().to_string())
        .bind(log.user_id().to_string())
        .bind(log.played_on())
        .bind(log.buy_in())
        .bind(log.small_blind())
        .bind(log.big_blind())
        .bind(log.cash_out())
        .bind(log.notes())
        .bind(log.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }
        Ok(())
    }

    async fn list_logs(&self, user_id: UserId) -> Result<Vec<PokerLog>, StorageError> {
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM poker_logs WHERE user_id = ?1 \
             ORDER BY played_on DESC, created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_poker_log_row).collect()
    }

    async fn get_log(&self, user_id: UserId, id: PokerLogId) -> Result<PokerLog, StorageError> {
        let sql = format!("SELECT {LOG_COLUMNS} FROM poker_logs WHERE id = ?1 AND user_id = ?2");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        map_poker_log_row(&row)
    }

    async fn delete_log(&self, user_id: UserId, id: PokerLogId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM poker_logs WHERE id = ?1 AND user_id = ?2")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected() > 0)
    }
}
