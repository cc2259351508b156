use std::sync::Arc;

use quiz_core::QuizConfig;
use quiz_core::model::QuizId;
use quiz_storage::repository::Storage;

use crate::Clock;
use crate::auth::AuthProvider;
use crate::companion_service::CompanionService;
use crate::error::AppServicesError;
use crate::gameplay_service::GameplayService;
use crate::history_service::HistoryService;
use crate::leaderboard_service::LeaderboardService;
use crate::personality_service::PersonalityService;
use crate::questions::QuestionSource;
use crate::sessions::SessionLoopService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    auth: Arc<dyn AuthProvider>,
    quiz_one: Arc<SessionLoopService>,
    quiz_two: Arc<SessionLoopService>,
    leaderboard: Arc<LeaderboardService>,
    history: Arc<HistoryService>,
    gameplay: Arc<GameplayService>,
    personality: Arc<PersonalityService>,
    companion: Arc<CompanionService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        questions: Arc<dyn QuestionSource>,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, questions, auth))
    }

    /// Build services over in-memory storage.
    #[must_use]
    pub fn in_memory(
        clock: Clock,
        questions: Arc<dyn QuestionSource>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, questions, auth)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        questions: Arc<dyn QuestionSource>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let quiz_one = Arc::new(
            SessionLoopService::new(
                clock,
                QuizId::quiz_one(),
                Arc::clone(&questions),
                Arc::clone(&auth),
                storage,
            )
            .with_config(QuizConfig::lives_mode()),
        );
        let quiz_two = Arc::new(
            SessionLoopService::new(
                clock,
                QuizId::quiz_two(),
                questions,
                Arc::clone(&auth),
                storage,
            )
            .with_config(QuizConfig::progress_mode()),
        );

        Self {
            quiz_one,
            quiz_two,
            leaderboard: Arc::new(LeaderboardService::new(
                clock,
                Arc::clone(&storage.leaderboard),
            )),
            history: Arc::new(HistoryService::new(Arc::clone(&storage.progress))),
            gameplay: Arc::new(GameplayService::new(clock, Arc::clone(&storage.gameplay))),
            personality: Arc::new(PersonalityService::new(
                clock,
                Arc::clone(&auth),
                Arc::clone(&storage.progress),
            )),
            companion: Arc::new(CompanionService::new(
                clock,
                Arc::clone(&auth),
                Arc::clone(&storage.poker_logs),
            )),
            auth,
        }
    }

    /// Session service for a playable quiz; `None` for unknown ids.
    #[must_use]
    pub fn quiz(&self, quiz_id: &QuizId) -> Option<Arc<SessionLoopService>> {
        if *quiz_id == QuizId::quiz_one() {
            Some(Arc::clone(&self.quiz_one))
        } else if *quiz_id == QuizId::quiz_two() {
            Some(Arc::clone(&self.quiz_two))
        } else {
            None
        }
    }

    #[must_use]
    pub fn auth(&self) -> Arc<dyn AuthProvider> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn gameplay(&self) -> Arc<GameplayService> {
        Arc::clone(&self.gameplay)
    }

    #[must_use]
    pub fn personality(&self) -> Arc<PersonalityService> {
        Arc::clone(&self.personality)
    }

    #[must_use]
    pub fn companion(&self) -> Arc<CompanionService> {
        Arc::clone(&self.companion)
    }
}
