use chrono::{DateTime, NaiveDate, Utc};
use quiz_core::model::{
    GameplayTally, LeaderboardEntry, PokerLog, PokerLogId, ProgressRecord, QuizId, UserId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn user_id(row: &SqliteRow) -> Result<UserId, StorageError> {
    row.try_get::<String, _>("user_id")
        .map_err(ser)?
        .parse()
        .map_err(ser)
}

fn quiz_id(row: &SqliteRow) -> Result<QuizId, StorageError> {
    QuizId::new(row.try_get::<String, _>("quiz_id").map_err(ser)?).map_err(ser)
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    Ok(ProgressRecord::new(
        user_id(row)?,
        quiz_id(row)?,
        u32_from_i64(
            "last_question_index",
            row.try_get("last_question_index").map_err(ser)?,
        )?,
        u32_from_i64("score", row.try_get("score").map_err(ser)?)?,
        row.try_get::<DateTime<Utc>, _>("updated_at").map_err(ser)?,
    ))
}

pub(crate) fn map_leaderboard_row(row: &SqliteRow) -> Result<LeaderboardEntry, StorageError> {
    Ok(LeaderboardEntry {
        user_id: user_id(row)?,
        quiz_id: quiz_id(row)?,
        score: u32_from_i64("score", row.try_get("score").map_err(ser)?)?,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    })
}

pub(crate) fn map_tally_row(row: &SqliteRow) -> Result<GameplayTally, StorageError> {
    let day: NaiveDate = row.try_get("day").map_err(ser)?;
    let loops = u32_from_i64("loops", row.try_get("loops").map_err(ser)?)?;
    let prompted_at_loop = row
        .try_get::<Option<i64>, _>("prompted_at_loop")
        .map_err(ser)?
        .map(|v| u32_from_i64("prompted_at_loop", v))
        .transpose()?;
    Ok(GameplayTally::from_persisted(day, loops, prompted_at_loop))
}

pub(crate) fn map_poker_log_row(row: &SqliteRow) -> Result<PokerLog, StorageError> {
    let id: PokerLogId = row
        .try_get::<String, _>("id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    PokerLog::from_persisted(
        id,
        user_id(row)?,
        row.try_get("played_on").map_err(ser)?,
        row.try_get("buy_in").map_err(ser)?,
        row.try_get("small_blind").map_err(ser)?,
        row.try_get("big_blind").map_err(ser)?,
        row.try_get("cash_out").map_err(ser)?,
        row.try_get("notes").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}
