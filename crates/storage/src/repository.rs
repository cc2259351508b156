use async_trait::async_trait;
use chrono::NaiveDate;
use quiz_core::model::{
    GameplayTally, LeaderboardEntry, PokerLog, PokerLogId, ProgressRecord, QuizId, UserId,
};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Last position reached per (user, quiz).
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Insert or replace the record for `(record.user_id, record.quiz_id)`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn get_progress(
        &self,
        user_id: UserId,
        quiz_id: &QuizId,
    ) -> Result<Option<ProgressRecord>, StorageError>;
}

/// Best score per (user, quiz).
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Store `entry` only if no score exists yet or it is strictly higher.
    /// Returns whether the stored score changed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn submit_if_greater(&self, entry: &LeaderboardEntry) -> Result<bool, StorageError>;

    /// Highest scores first; ties go to whoever got there earlier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn top_scores(
        &self,
        quiz_id: &QuizId,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn get_best(
        &self,
        user_id: UserId,
        quiz_id: &QuizId,
    ) -> Result<Option<LeaderboardEntry>, StorageError>;
}

/// Daily counters behind the login-prompt cadence.
#[async_trait]
pub trait GameplayRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn get_tally(&self, day: NaiveDate) -> Result<Option<GameplayTally>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the tally cannot be stored.
    async fn save_tally(&self, tally: &GameplayTally) -> Result<(), StorageError>;
}

/// Bankroll log entries, always scoped to their owner.
#[async_trait]
pub trait PokerLogRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a log with the same id exists.
    async fn insert_log(&self, log: &PokerLog) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn list_logs(&self, user_id: UserId) -> Result<Vec<PokerLog>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the log is missing or owned by someone else.
    async fn get_log(&self, user_id: UserId, id: PokerLogId) -> Result<PokerLog, StorageError>;

    /// Returns `false` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn delete_log(&self, user_id: UserId, id: PokerLogId) -> Result<bool, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<(UserId, QuizId), ProgressRecord>>>,
    leaderboard: Arc<Mutex<HashMap<(UserId, QuizId), LeaderboardEntry>>>,
    tallies: Arc<Mutex<HashMap<NaiveDate, GameplayTally>>>,
    logs: Arc<Mutex<HashMap<PokerLogId, PokerLog>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.insert((record.user_id, record.quiz_id.clone()), record.clone());
        Ok(())
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        quiz_id: &QuizId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.get(&(user_id, quiz_id.clone())).cloned())
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryRepository {
    async fn submit_if_greater(&self, entry: &LeaderboardEntry) -> Result<bool, StorageError> {
        let mut guard = self.leaderboard.lock().map_err(poisoned)?;
        let key = (entry.user_id, entry.quiz_id.clone());
        match guard.get(&key) {
            Some(stored) if !entry.beats(stored) => Ok(false),
            _ => {
                guard.insert(key, entry.clone());
                Ok(true)
            }
        }
    }

    async fn top_scores(
        &self,
        quiz_id: &QuizId,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let guard = self.leaderboard.lock().map_err(poisoned)?;
        let mut entries: Vec<LeaderboardEntry> = guard
            .values()
            .filter(|e| &e.quiz_id == quiz_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| (Reverse(e.score), e.updated_at, e.user_id.value()));
        entries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(entries)
    }

    async fn get_best(
        &self,
        user_id: UserId,
        quiz_id: &QuizId,
    ) -> Result<Option<LeaderboardEntry>, StorageError> {
        let guard = self.leaderboard.lock().map_err(poisoned)?;
        Ok(guard.get(&(user_id, quiz_id.clone())).cloned())
    }
}

#[async_trait]
impl GameplayRepository for InMemoryRepository {
    async fn get_tally(&self, day: NaiveDate) -> Result<Option<GameplayTally>, StorageError> {
        let guard = self.tallies.lock().map_err(poisoned)?;
        Ok(guard.get(&day).cloned())
    }

    async fn save_tally(&self, tally: &GameplayTally) -> Result<(), StorageError> {
        let mut guard = self.tallies.lock().map_err(poisoned)?;
        guard.insert(tally.day(), tally.clone());
        Ok(())
    }
}

#[async_trait]
impl PokerLogRepository for InMemoryRepository {
    async fn insert_log(&self, log: &PokerLog) -> Result<(), StorageError> {
        let mut guard = self.logs.lock().map_err(poisoned)?;
        if guard.contains_key(&log.id()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(log.id(), log.clone());
        Ok(())
    }

    async fn list_logs(&self, user_id: UserId) -> Result<Vec<PokerLog>, StorageError> {
        let guard = self.logs.lock().map_err(poisoned)?;
        let mut logs: Vec<PokerLog> = guard
            .values()
            .filter(|log| log.user_id() == user_id)
            .cloned()
            .collect();
        logs.sort_by_key(|log| (Reverse(log.played_on()), Reverse(log.created_at())));
        Ok(logs)
    }

    async fn get_log(&self, user_id: UserId, id: PokerLogId) -> Result<PokerLog, StorageError> {
        let guard = self.logs.lock().map_err(poisoned)?;
        guard
            .get(&id)
            .filter(|log| log.user_id() == user_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn delete_log(&self, user_id: UserId, id: PokerLogId) -> Result<bool, StorageError> {
        let mut guard = self.logs.lock().map_err(poisoned)?;
        let owned = guard.get(&id).is_some_and(|log| log.user_id() == user_id);
        if owned {
            guard.remove(&id);
        }
        Ok(owned)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub leaderboard: Arc<dyn LeaderboardRepository>,
    pub gameplay: Arc<dyn GameplayRepository>,
    pub poker_logs: Arc<dyn PokerLogRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            progress: Arc::new(repo.clone()),
            leaderboard: Arc::new(repo.clone()),
            gameplay: Arc::new(repo.clone()),
            poker_logs: Arc::new(repo),
        }
    }
}
