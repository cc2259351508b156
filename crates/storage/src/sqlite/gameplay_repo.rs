use async_trait::async_trait;
use chrono::NaiveDate;
use quiz_core::model::GameplayTally;

use super::SqliteRepository;
use super::mapping::{conn, map_tally_row};
use crate::repository::{GameplayRepository, StorageError};

#[async_trait]
impl GameplayRepository for SqliteRepository {
    async fn get_tally(&self, day: NaiveDate) -> Result<Option<GameplayTally>, StorageError> {
        let row = sqlx::query("SELECT day, loops, prompted_at_loop FROM gameplay_tally WHERE day = ?1")
            .bind(day)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_tally_row).transpose()
    }

    async fn save_tally(&self, tally: &GameplayTally) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO gameplay_tally (day, loops, prompted_at_loop)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(day) DO UPDATE SET
                loops = excluded.loops,
                prompted_at_loop = excluded.prompted_at_loop
            ",
        )
        .bind(tally.day())
        .bind(i64::from(tally.loops()))
        .bind(tally.prompted_at_loop().map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
