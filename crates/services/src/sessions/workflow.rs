use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::JoinSet;

use quiz_core::model::{ProgressRecord, QuizId, UserId};
use quiz_core::{
    Advance, AnswerReveal, LoginPromptPolicy, QuizConfig, QuizSession, ResumePoint,
};
use quiz_storage::repository::{ProgressRepository, Storage};

use super::screen::QuizScreen;
use crate::Clock;
use crate::auth::AuthProvider;
use crate::error::SessionError;
use crate::gameplay_service::GameplayService;
use crate::leaderboard_service::LeaderboardService;
use crate::questions::QuestionSource;

const LOG_TARGET: &str = "quiz::session";
const TALLY_WAIT: Duration = Duration::from_secs(2);

/// What happened when a revealed answer was moved past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub advance: Advance,
    /// An anonymous player reached the end and should be asked to sign in.
    pub login_prompt: bool,
}

/// Background store writes; each task yields `Some(stored)` for a leaderboard submission.
type PendingWrites = Arc<Mutex<JoinSet<Option<bool>>>>;

impl StepOutcome {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self.advance, Advance::Next { .. })
    }
}

/// Orchestrates a quiz run: loading, resume, and persistence on transitions.
///
/// Progress, leaderboard and tally writes run on spawned tasks, so a slow or
/// failing store never holds up the next question. Failures are logged inside
/// the task. [`SessionLoopService::settle`] waits for whatever is in flight.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    quiz_id: QuizId,
    config: QuizConfig,
    questions: Arc<dyn QuestionSource>,
    auth: Arc<dyn AuthProvider>,
    progress: Arc<dyn ProgressRepository>,
    leaderboard: LeaderboardService,
    gameplay: GameplayService,
    shuffle_seed: Option<u64>,
    pending: PendingWrites,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        quiz_id: QuizId,
        questions: Arc<dyn QuestionSource>,
        auth: Arc<dyn AuthProvider>,
        storage: &Storage,
    ) -> Self {
        Self {
            clock,
            quiz_id,
            config: QuizConfig::default(),
            questions,
            auth,
            progress: Arc::clone(&storage.progress),
            leaderboard: LeaderboardService::new(clock, Arc::clone(&storage.leaderboard)),
            gameplay: GameplayService::new(clock, Arc::clone(&storage.gameplay)),
            shuffle_seed: None,
            pending: PendingWrites::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: QuizConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the shuffle so runs are reproducible.
    #[must_use]
    pub fn with_shuffle_seed(mut self, seed: Option<u64>) -> Self {
        self.shuffle_seed = seed;
        self
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    fn user(&self) -> Option<UserId> {
        self.auth.state().user()
    }

    /// Load the deck and start a run, resuming stored progress when enabled.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Fetch` if the questions cannot be loaded and
    /// `SessionError::Quiz` if the deck is empty.
    pub async fn start(&self) -> Result<QuizSession, SessionError> {
        let questions = self.questions.load().await.inspect_err(|err| {
            tracing::error!(target: LOG_TARGET, quiz = %self.quiz_id, error = %err, "question fetch failed");
        })?;
        let resume = self.resume_point().await;
        let now = self.clock.now();

        let session = match self.shuffle_seed {
            Some(seed) => QuizSession::start_with_rng(
                questions,
                self.config.clone(),
                resume,
                now,
                &mut StdRng::seed_from_u64(seed),
            )?,
            None => QuizSession::start(questions, self.config.clone(), resume, now)?,
        };

        tracing::debug!(
            target: LOG_TARGET,
            quiz = %self.quiz_id,
            total = session.total(),
            index = session.current_index(),
            "quiz started"
        );
        Ok(session)
    }

    /// `start` folded into a screen state; call again to retry after `Failed`.
    pub async fn open(&self) -> QuizScreen {
        match self.start().await {
            Ok(session) => QuizScreen::Ready(Box::new(session)),
            Err(err) => QuizScreen::Failed {
                message: err.to_string(),
            },
        }
    }

    async fn resume_point(&self) -> Option<ResumePoint> {
        if !self.config.resume() {
            return None;
        }
        let user_id = self.user()?;
        match self.progress.get_progress(user_id, &self.quiz_id).await {
            Ok(record) => record.map(|r| ResumePoint {
                index: r.last_question_index,
                score: r.score,
            }),
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, %user_id, error = %err, "progress lookup failed; starting fresh");
                None
            }
        }
    }

    /// Guarded no-op (`None`) if an answer is already showing or the run is over.
    pub fn select_answer(&self, session: &mut QuizSession, answer: &str) -> Option<AnswerReveal> {
        let reveal = session.select_answer(answer, self.clock.now())?;
        tracing::debug!(target: LOG_TARGET, correct = reveal.is_correct, score = reveal.score, "answer selected");
        Some(reveal)
    }

    /// Forfeit the current question because its countdown ran out.
    pub fn time_out(&self, session: &mut QuizSession) -> Option<AnswerReveal> {
        let reveal = session.time_out(self.clock.now())?;
        tracing::debug!(target: LOG_TARGET, lives = ?reveal.lives_remaining, "answer timed out");
        Some(reveal)
    }

    /// Move past the revealed answer and queue the writes for the transition.
    ///
    /// Returns as soon as the session has moved; store writes continue in the
    /// background. Returns `None` when no answer is revealed.
    pub async fn advance(&self, session: &mut QuizSession) -> Option<StepOutcome> {
        let advance = session.advance(self.clock.now())?;
        let user_id = self.user();
        let mut outcome = StepOutcome {
            advance,
            login_prompt: false,
        };

        if let (Some(user_id), Advance::Next { .. } | Advance::Completed) = (user_id, advance) {
            self.save_progress(user_id, session);
        }

        if outcome.is_terminal() {
            match user_id {
                Some(user_id) => {
                    self.count_loop();
                    self.submit_score(user_id, session.score());
                }
                None => outcome.login_prompt = self.login_prompt_due().await,
            }
            tracing::info!(
                target: LOG_TARGET,
                quiz = %self.quiz_id,
                outcome = ?advance,
                score = session.score(),
                total = session.total(),
                "quiz finished"
            );
        }

        Some(outcome)
    }

    /// Wait for queued store writes to finish.
    ///
    /// Returns true if a leaderboard submission since the last call replaced
    /// the player's best.
    pub async fn settle(&self) -> bool {
        let mut tasks = match self.pending.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        let mut leaderboard_updated = false;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(stored) => leaderboard_updated |= stored.unwrap_or(false),
                Err(err) => {
                    tracing::warn!(target: LOG_TARGET, error = %err, "store write task failed");
                }
            }
        }
        leaderboard_updated
    }

    fn spawn_write<F>(&self, write: F)
    where
        F: Future<Output = Option<bool>> + Send + 'static,
    {
        match self.pending.lock() {
            Ok(mut tasks) => tasks.spawn(write),
            Err(poisoned) => poisoned.into_inner().spawn(write),
        };
    }

    /// Start over from a terminal phase with a fresh order and no resume.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Quiz` while the run is still going.
    pub fn restart(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        let now = self.clock.now();
        match self.shuffle_seed {
            Some(seed) => session.restart_with_rng(now, &mut StdRng::seed_from_u64(seed))?,
            None => session.restart(now)?,
        }
        Ok(())
    }

    fn save_progress(&self, user_id: UserId, session: &QuizSession) {
        if !self.config.persist_progress() {
            return;
        }
        let record = ProgressRecord::new(
            user_id,
            self.quiz_id.clone(),
            session.persisted_index(),
            session.score(),
            self.clock.now(),
        );
        let progress = Arc::clone(&self.progress);
        self.spawn_write(async move {
            if let Err(err) = progress.upsert_progress(&record).await {
                tracing::warn!(target: LOG_TARGET, %user_id, error = %err, "progress write failed");
            }
            None
        });
    }

    fn submit_score(&self, user_id: UserId, score: u32) {
        if !self.config.submit_leaderboard() {
            return;
        }
        let leaderboard = self.leaderboard.clone();
        let quiz_id = self.quiz_id.clone();
        self.spawn_write(async move {
            match leaderboard.submit(user_id, &quiz_id, score).await {
                Ok(stored) => Some(stored),
                Err(err) => {
                    tracing::warn!(target: LOG_TARGET, %user_id, error = %err, "leaderboard write failed");
                    Some(false)
                }
            }
        });
    }

    fn count_loop(&self) {
        let gameplay = self.gameplay.clone();
        self.spawn_write(async move {
            if let Err(err) = gameplay.record_loop().await {
                tracing::warn!(target: LOG_TARGET, error = %err, "gameplay tally write failed");
            }
            None
        });
    }

    /// The anonymous end-of-run signal depends on the tally, so it is read
    /// here, bounded by `TALLY_WAIT`.
    async fn login_prompt_due(&self) -> bool {
        match self.config.login_prompt() {
            LoginPromptPolicy::Always => {
                self.count_loop();
                true
            }
            LoginPromptPolicy::Never => {
                self.count_loop();
                false
            }
            LoginPromptPolicy::Throttled => {
                let decide = async {
                    if let Err(err) = self.gameplay.record_loop().await {
                        tracing::warn!(target: LOG_TARGET, error = %err, "gameplay tally write failed");
                    }
                    self.gameplay.take_prompt().await
                };
                match tokio::time::timeout(TALLY_WAIT, decide).await {
                    Ok(Ok(due)) => due,
                    Ok(Err(err)) => {
                        tracing::warn!(target: LOG_TARGET, error = %err, "gameplay tally read failed");
                        false
                    }
                    Err(_) => {
                        tracing::warn!(target: LOG_TARGET, "gameplay tally timed out; skipping login prompt");
                        false
                    }
                }
            }
        }
    }
}
