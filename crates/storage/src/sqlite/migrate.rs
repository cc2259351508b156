use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: [&str; 6] = [
    r"
        CREATE TABLE IF NOT EXISTS quiz_progress (
            user_id TEXT NOT NULL,
            quiz_id TEXT NOT NULL,
            last_question_index INTEGER NOT NULL CHECK (last_question_index >= 0),
            score INTEGER NOT NULL CHECK (score >= 0),
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, quiz_id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS quiz_leaderboard (
            user_id TEXT NOT NULL,
            quiz_id TEXT NOT NULL,
            score INTEGER NOT NULL CHECK (score >= 0),
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, quiz_id)
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_quiz_leaderboard_quiz_score
            ON quiz_leaderboard (quiz_id, score DESC, updated_at);
    ",
    r"
        CREATE TABLE IF NOT EXISTS gameplay_tally (
            day TEXT PRIMARY KEY,
            loops INTEGER NOT NULL CHECK (loops >= 0),
            prompted_at_loop INTEGER CHECK (prompted_at_loop >= 0)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS poker_logs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            played_on TEXT NOT NULL,
            buy_in REAL NOT NULL CHECK (buy_in >= 0),
            small_blind REAL NOT NULL CHECK (small_blind >= 0),
            big_blind REAL NOT NULL CHECK (big_blind >= small_blind),
            cash_out REAL NOT NULL CHECK (cash_out >= 0),
            notes TEXT,
            created_at TEXT NOT NULL
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_poker_logs_user_played_on
            ON poker_logs (user_id, played_on);
    ",
];

/// Applies versioned schema migrations, each inside its own transaction.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;
        for statement in SCHEMA_V1 {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}
