use std::sync::Arc;

use quiz_core::model::{LogSort, PokerLog, PokerLogDraft, PokerLogId, UserId};
use quiz_storage::repository::PokerLogRepository;

use crate::Clock;
use crate::auth::AuthProvider;
use crate::error::CompanionError;

/// Bankroll tracker for signed-in players.
#[derive(Clone)]
pub struct CompanionService {
    clock: Clock,
    auth: Arc<dyn AuthProvider>,
    logs: Arc<dyn PokerLogRepository>,
}

impl CompanionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        auth: Arc<dyn AuthProvider>,
        logs: Arc<dyn PokerLogRepository>,
    ) -> Self {
        Self { clock, auth, logs }
    }

    fn user(&self) -> Result<UserId, CompanionError> {
        self.auth.state().user().ok_or(CompanionError::LoginRequired)
    }

    /// Validate and store a new session log.
    ///
    /// # Errors
    ///
    /// Returns `CompanionError::LoginRequired`, `CompanionError::Log` for
    /// invalid amounts, or `CompanionError::Storage`.
    pub async fn create(&self, draft: PokerLogDraft) -> Result<PokerLog, CompanionError> {
        let user_id = self.user()?;
        let log = draft.validate(PokerLogId::random(), user_id, self.clock.now())?;
        self.logs.insert_log(&log).await?;
        tracing::debug!(%user_id, log_id = %log.id(), "poker log created");
        Ok(log)
    }

    /// The player's logs, newest or most profitable first.
    ///
    /// # Errors
    ///
    /// Returns `CompanionError::LoginRequired` or `CompanionError::Storage`.
    pub async fn list(&self, sort: LogSort) -> Result<Vec<PokerLog>, CompanionError> {
        let user_id = self.user()?;
        let mut logs = self.logs.list_logs(user_id).await?;
        sort.apply(&mut logs);
        Ok(logs)
    }

    /// # Errors
    ///
    /// Returns `CompanionError::Storage` with `StorageError::NotFound` for
    /// missing logs and logs owned by someone else.
    pub async fn get(&self, id: PokerLogId) -> Result<PokerLog, CompanionError> {
        let user_id = self.user()?;
        Ok(self.logs.get_log(user_id, id).await?)
    }

    /// Returns `false` if there was nothing of the player's to delete.
    ///
    /// # Errors
    ///
    /// Returns `CompanionError::LoginRequired` or `CompanionError::Storage`.
    pub async fn delete(&self, id: PokerLogId) -> Result<bool, CompanionError> {
        let user_id = self.user()?;
        Ok(self.logs.delete_log(user_id, id).await?)
    }
}

/// List label for a log's result, e.g. "PnL: $150.50".
#[must_use]
pub fn pnl_label(log: &PokerLog) -> String {
    format!("PnL: ${:.2}", log.pnl())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthState, LocalAuth};
    use chrono::NaiveDate;
    use quiz_core::model::PokerLogError;
    use quiz_core::time::fixed_clock;
    use quiz_storage::{InMemoryRepository, StorageError};

    fn draft(day: u32, buy_in: f64, cash_out: f64) -> PokerLogDraft {
        PokerLogDraft {
            played_on: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            buy_in,
            small_blind: 0.5,
            big_blind: 1.0,
            cash_out,
            notes: None,
        }
    }

    #[tokio::test]
    async fn anonymous_calls_need_login() {
        let service = CompanionService::new(
            fixed_clock(),
            Arc::new(LocalAuth::anonymous()),
            Arc::new(InMemoryRepository::new()),
        );
        assert!(matches!(
            service.list(LogSort::Date).await,
            Err(CompanionError::LoginRequired)
        ));
        assert!(matches!(
            service.create(draft(1, 10.0, 20.0)).await,
            Err(CompanionError::LoginRequired)
        ));
    }

    #[tokio::test]
    async fn lists_sort_by_date_and_by_pnl() {
        let service = CompanionService::new(
            fixed_clock(),
            Arc::new(LocalAuth::signed_in(UserId::random())),
            Arc::new(InMemoryRepository::new()),
        );
        service.create(draft(3, 100.0, 300.0)).await.unwrap();
        service.create(draft(12, 100.0, 40.0)).await.unwrap();
        service.create(draft(8, 100.0, 120.0)).await.unwrap();

        let by_date = service.list(LogSort::Date).await.unwrap();
        let days: Vec<u32> = by_date.iter().map(|l| chrono::Datelike::day(&l.played_on())).collect();
        assert_eq!(days, vec![12, 8, 3]);

        let by_pnl = service.list(LogSort::Pnl).await.unwrap();
        let labels: Vec<String> = by_pnl.iter().map(pnl_label).collect();
        assert_eq!(labels, vec!["PnL: $200.00", "PnL: $20.00", "PnL: $-60.00"]);
    }

    #[tokio::test]
    async fn other_players_logs_are_invisible() {
        let repo = Arc::new(InMemoryRepository::new());
        let auth = Arc::new(LocalAuth::signed_in(UserId::random()));
        let service = CompanionService::new(fixed_clock(), auth.clone(), repo);
        let log = service.create(draft(5, 50.0, 75.0)).await.unwrap();

        auth.set(AuthState::signed_in(UserId::random()));
        assert!(service.list(LogSort::Date).await.unwrap().is_empty());
        assert!(matches!(
            service.get(log.id()).await,
            Err(CompanionError::Storage(StorageError::NotFound))
        ));
        assert!(!service.delete(log.id()).await.unwrap());
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected() {
        let service = CompanionService::new(
            fixed_clock(),
            Arc::new(LocalAuth::signed_in(UserId::random())),
            Arc::new(InMemoryRepository::new()),
        );
        let err = service.create(draft(1, -1.0, 0.0)).await.unwrap_err();
        assert!(matches!(
            err,
            CompanionError::Log(PokerLogError::InvalidAmount { field: "buy_in", .. })
        ));
    }
}
