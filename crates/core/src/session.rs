use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

use crate::model::{Question, QuestionId};
use crate::shuffle::shuffle_with;
use crate::time::{elapsed, offset};

pub const DEFAULT_LIVES: u8 = 3;
pub const DEFAULT_ANSWER_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_OPPONENT_REVEAL_INTERVAL: Duration = Duration::from_millis(200);

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    Empty,

    #[error("quiz can only restart after it has ended")]
    NotFinished,
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// When an anonymous player who reaches the end of a run is asked to sign in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginPromptPolicy {
    /// Every terminal state.
    #[default]
    Always,
    /// Gated by the daily gameplay-loop cadence.
    Throttled,
    Never,
}

/// Knobs for one quiz variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    lives: Option<u8>,
    answer_timeout: Option<Duration>,
    shuffle: bool,
    resume: bool,
    reveal_delay: Duration,
    opponent_reveal_interval: Duration,
    persist_progress: bool,
    submit_leaderboard: bool,
    login_prompt: LoginPromptPolicy,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self::progress_mode()
    }
}

impl QuizConfig {
    /// Three lives, a 20 second clock per question, shuffled order.
    #[must_use]
    pub fn lives_mode() -> Self {
        Self {
            lives: Some(DEFAULT_LIVES),
            answer_timeout: Some(DEFAULT_ANSWER_TIMEOUT),
            shuffle: true,
            resume: false,
            reveal_delay: DEFAULT_REVEAL_DELAY,
            opponent_reveal_interval: DEFAULT_OPPONENT_REVEAL_INTERVAL,
            persist_progress: false,
            submit_leaderboard: true,
            login_prompt: LoginPromptPolicy::Throttled,
        }
    }

    /// Untimed, fixed order, score only; signed-in players resume where they left off.
    #[must_use]
    pub fn progress_mode() -> Self {
        Self {
            lives: None,
            answer_timeout: None,
            shuffle: false,
            resume: true,
            reveal_delay: DEFAULT_REVEAL_DELAY,
            opponent_reveal_interval: DEFAULT_OPPONENT_REVEAL_INTERVAL,
            persist_progress: true,
            submit_leaderboard: true,
            login_prompt: LoginPromptPolicy::Always,
        }
    }

    #[must_use]
    pub fn with_lives(mut self, lives: Option<u8>) -> Self {
        self.lives = lives;
        self
    }

    #[must_use]
    pub fn with_answer_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.answer_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    #[must_use]
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    /// Spacing between opponent reveals; clamped to at least 1 ms.
    #[must_use]
    pub fn with_opponent_reveal_interval(mut self, interval: Duration) -> Self {
        self.opponent_reveal_interval = interval.max(Duration::from_millis(1));
        self
    }

    #[must_use]
    pub fn with_persist_progress(mut self, persist: bool) -> Self {
        self.persist_progress = persist;
        self
    }

    #[must_use]
    pub fn with_submit_leaderboard(mut self, submit: bool) -> Self {
        self.submit_leaderboard = submit;
        self
    }

    #[must_use]
    pub fn with_login_prompt(mut self, policy: LoginPromptPolicy) -> Self {
        self.login_prompt = policy;
        self
    }

    #[must_use]
    pub fn lives(&self) -> Option<u8> {
        self.lives
    }

    #[must_use]
    pub fn answer_timeout(&self) -> Option<Duration> {
        self.answer_timeout
    }

    #[must_use]
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    #[must_use]
    pub fn resume(&self) -> bool {
        self.resume
    }

    #[must_use]
    pub fn reveal_delay(&self) -> Duration {
        self.reveal_delay
    }

    #[must_use]
    pub fn opponent_reveal_interval(&self) -> Duration {
        self.opponent_reveal_interval
    }

    #[must_use]
    pub fn persist_progress(&self) -> bool {
        self.persist_progress
    }

    #[must_use]
    pub fn submit_leaderboard(&self) -> bool {
        self.submit_leaderboard
    }

    #[must_use]
    pub fn login_prompt(&self) -> LoginPromptPolicy {
        self.login_prompt
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    /// An answer is on screen; the session waits out the reveal delay.
    AnswerRevealed,
    Completed,
    GameOver,
}

impl SessionPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::GameOver)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Manual,
    /// The countdown ran out and the correct answer was filled in as a forfeit.
    Timeout,
}

/// What the player sees after answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReveal {
    pub question_id: QuestionId,
    pub selected: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub source: AnswerSource,
    pub score: u32,
    pub lives_remaining: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next { index: usize },
    Completed,
    GameOver,
}

/// Stored position to pick a run back up from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    pub index: u32,
    pub score: u32,
}

/// Aggregated view of session progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run through a question deck.
///
/// Time is always passed in by the caller so the machine stays deterministic;
/// the async driver and the tests feed it from a `Clock` or a paused runtime.
#[derive(Debug, Clone)]
pub struct QuizSession {
    source: Vec<Question>,
    questions: Vec<Question>,
    config: QuizConfig,
    index: usize,
    lives: Option<u8>,
    score: u32,
    selected: Option<String>,
    is_correct: Option<bool>,
    answer_source: Option<AnswerSource>,
    phase: SessionPhase,
    question_started_at: DateTime<Utc>,
    revealed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a run using thread-local randomness for the shuffle.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` if `questions` is empty.
    pub fn start(
        questions: Vec<Question>,
        config: QuizConfig,
        resume: Option<ResumePoint>,
        now: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        Self::start_with_rng(questions, config, resume, now, &mut rand::rng())
    }

    /// Start a run with an injected RNG.
    ///
    /// `resume` is ignored unless the config enables it; a stored index at or
    /// past the end marks a finished run and the session starts fresh.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` if `questions` is empty.
    pub fn start_with_rng<R: Rng + ?Sized>(
        questions: Vec<Question>,
        config: QuizConfig,
        resume: Option<ResumePoint>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }

        let mut session = Self {
            questions: Vec::new(),
            source: questions,
            lives: config.lives,
            config,
            index: 0,
            score: 0,
            selected: None,
            is_correct: None,
            answer_source: None,
            phase: SessionPhase::InProgress,
            question_started_at: now,
            revealed_at: None,
        };
        session.reset(now, rng);

        if session.config.resume {
            if let Some(point) = resume {
                let index = usize::try_from(point.index).unwrap_or(usize::MAX);
                if index < session.questions.len() {
                    session.index = index;
                    session.score = point.score;
                }
            }
        }

        Ok(session)
    }

    fn reset<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) {
        self.questions = if self.config.shuffle {
            shuffle_with(&self.source, rng)
        } else {
            self.source.clone()
        };
        self.index = 0;
        self.lives = self.config.lives;
        self.score = 0;
        self.clear_answer();
        self.phase = SessionPhase::InProgress;
        self.question_started_at = now;
    }

    fn clear_answer(&mut self) {
        self.selected = None;
        self.is_correct = None;
        self.answer_source = None;
        self.revealed_at = None;
    }

    /// Record the player's answer for the current question.
    ///
    /// Returns `None` when an answer is already on screen or the run is over.
    pub fn select_answer(&mut self, answer: &str, now: DateTime<Utc>) -> Option<AnswerReveal> {
        if !self.accepts_answer() {
            return None;
        }
        let correct = self.questions[self.index].is_correct(answer);
        Some(self.reveal(answer.to_owned(), correct, AnswerSource::Manual, now))
    }

    /// Forfeit the current question: the correct answer is shown but counts as wrong.
    pub fn time_out(&mut self, now: DateTime<Utc>) -> Option<AnswerReveal> {
        if !self.accepts_answer() {
            return None;
        }
        let answer = self.questions[self.index].correct_answer().to_owned();
        Some(self.reveal(answer, false, AnswerSource::Timeout, now))
    }

    /// Applies the timeout if the countdown has run out by `now`.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> Option<AnswerReveal> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.time_out(now),
            _ => None,
        }
    }

    fn accepts_answer(&self) -> bool {
        self.phase == SessionPhase::InProgress
            && self.selected.is_none()
            && self.index < self.questions.len()
    }

    fn reveal(
        &mut self,
        selected: String,
        is_correct: bool,
        source: AnswerSource,
        now: DateTime<Utc>,
    ) -> AnswerReveal {
        if is_correct {
            self.score = self.score.saturating_add(1);
        } else if let Some(lives) = self.lives.as_mut() {
            *lives = lives.saturating_sub(1);
        }

        self.selected = Some(selected.clone());
        self.is_correct = Some(is_correct);
        self.answer_source = Some(source);
        self.revealed_at = Some(now);
        self.phase = SessionPhase::AnswerRevealed;

        let question = &self.questions[self.index];
        AnswerReveal {
            question_id: question.id(),
            selected,
            correct_answer: question.correct_answer().to_owned(),
            is_correct,
            source,
            score: self.score,
            lives_remaining: self.lives,
        }
    }

    /// True once the reveal delay has passed for the answer on screen.
    #[must_use]
    pub fn ready_to_advance(&self, now: DateTime<Utc>) -> bool {
        match (self.phase, self.revealed_at) {
            (SessionPhase::AnswerRevealed, Some(at)) => elapsed(at, now) >= self.config.reveal_delay,
            _ => false,
        }
    }

    /// How much of the reveal delay is left for the answer on screen.
    ///
    /// `None` unless an answer is revealed.
    #[must_use]
    pub fn reveal_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match (self.phase, self.revealed_at) {
            (SessionPhase::AnswerRevealed, Some(at)) => {
                Some(self.config.reveal_delay.saturating_sub(elapsed(at, now)))
            }
            _ => None,
        }
    }

    /// Leave the revealed answer and move to the next question or a terminal phase.
    ///
    /// Returns `None` unless an answer is currently revealed.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Option<Advance> {
        if self.phase != SessionPhase::AnswerRevealed {
            return None;
        }

        if self.lives == Some(0) {
            self.phase = SessionPhase::GameOver;
            return Some(Advance::GameOver);
        }

        if self.index + 1 >= self.questions.len() {
            self.index = self.questions.len();
            self.phase = SessionPhase::Completed;
            return Some(Advance::Completed);
        }

        self.index += 1;
        self.clear_answer();
        self.phase = SessionPhase::InProgress;
        self.question_started_at = now;
        Some(Advance::Next { index: self.index })
    }

    /// Start over after a terminal phase: fresh order, counters reset, no resume.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotFinished` while the run is still going.
    pub fn restart(&mut self, now: DateTime<Utc>) -> Result<(), QuizError> {
        self.restart_with_rng(now, &mut rand::rng())
    }

    /// # Errors
    ///
    /// Returns `QuizError::NotFinished` while the run is still going.
    pub fn restart_with_rng<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<(), QuizError> {
        if !self.phase.is_terminal() {
            return Err(QuizError::NotFinished);
        }
        self.reset(now, rng);
        Ok(())
    }

    /// Countdown deadline for the current question, if timed and unanswered.
    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        if !self.accepts_answer() {
            return None;
        }
        self.config
            .answer_timeout
            .map(|timeout| offset(self.question_started_at, timeout))
    }

    #[must_use]
    pub fn remaining_time(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.deadline().map(|deadline| elapsed(now, deadline))
    }

    /// Index to store as progress: the current question, or the deck length once completed.
    #[must_use]
    pub fn persisted_index(&self) -> u32 {
        u32::try_from(self.index).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let answered = if self.phase == SessionPhase::Completed {
            total
        } else {
            (self.index + usize::from(self.selected.is_some())).min(total)
        };
        SessionProgress {
            total,
            answered,
            remaining: total - answered,
            is_complete: self.phase == SessionPhase::Completed,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Questions in play order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn lives_remaining(&self) -> Option<u8> {
        self.lives
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn answer_is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    #[must_use]
    pub fn answer_source(&self) -> Option<AnswerSource> {
        self.answer_source
    }

    #[must_use]
    pub fn question_started_at(&self) -> DateTime<Utc> {
        self.question_started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration as ChronoDuration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(id: u64, answer: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id} in CO?"),
            vec!["Fold".into(), "Call".into(), "Raise".into()],
            answer,
        )
        .unwrap()
    }

    fn deck(n: u64) -> Vec<Question> {
        (1..=n).map(|id| question(id, "Raise")).collect()
    }

    fn secs(n: i64) -> ChronoDuration {
        ChronoDuration::seconds(n)
    }

    #[test]
    fn empty_deck_is_rejected() {
        let err = QuizSession::start(Vec::new(), QuizConfig::default(), None, fixed_now());
        assert_eq!(err.unwrap_err(), QuizError::Empty);
    }

    #[test]
    fn correct_answer_scores_and_advances() {
        let now = fixed_now();
        let mut session = QuizSession::start(deck(3), QuizConfig::progress_mode(), None, now).unwrap();

        let reveal = session.select_answer("Raise", now).unwrap();
        assert!(reveal.is_correct);
        assert_eq!(reveal.score, 1);
        assert_eq!(session.phase(), SessionPhase::AnswerRevealed);

        assert_eq!(session.advance(now), Some(Advance::Next { index: 1 }));
        assert_eq!(session.selected_answer(), None);
        assert_eq!(session.answer_is_correct(), None);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn second_selection_is_ignored() {
        let now = fixed_now();
        let mut session = QuizSession::start(deck(2), QuizConfig::progress_mode(), None, now).unwrap();

        assert!(session.select_answer("Fold", now).is_some());
        assert!(session.select_answer("Raise", now).is_none());
        assert_eq!(session.selected_answer(), Some("Fold"));
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn three_wrong_answers_end_lives_mode() {
        let now = fixed_now();
        let config = QuizConfig::lives_mode().with_shuffle(false);
        let mut session = QuizSession::start(deck(5), config, None, now).unwrap();

        for expected_lives in [2, 1] {
            let reveal = session.select_answer("Fold", now).unwrap();
            assert_eq!(reveal.lives_remaining, Some(expected_lives));
            assert!(matches!(session.advance(now), Some(Advance::Next { .. })));
        }
        session.select_answer("Fold", now).unwrap();
        assert_eq!(session.lives_remaining(), Some(0));
        assert_eq!(session.advance(now), Some(Advance::GameOver));
        assert_eq!(session.phase(), SessionPhase::GameOver);
        assert!(session.select_answer("Raise", now).is_none());
    }

    #[test]
    fn last_question_completes_with_deck_length_as_index() {
        let now = fixed_now();
        let mut session = QuizSession::start(deck(2), QuizConfig::progress_mode(), None, now).unwrap();

        session.select_answer("Raise", now).unwrap();
        session.advance(now).unwrap();
        session.select_answer("Call", now).unwrap();

        assert_eq!(session.advance(now), Some(Advance::Completed));
        assert_eq!(session.persisted_index(), 2);
        assert_eq!(session.score(), 1);
        let progress = session.progress();
        assert!(progress.is_complete);
        assert_eq!(progress.answered, 2);
        assert_eq!(progress.remaining, 0);
    }

    #[test]
    fn timeout_forfeits_with_correct_answer_shown() {
        let now = fixed_now();
        let config = QuizConfig::lives_mode().with_shuffle(false);
        let mut session = QuizSession::start(deck(3), config, None, now).unwrap();

        assert!(session.expire_if_due(now + secs(19)).is_none());
        let reveal = session.expire_if_due(now + secs(20)).unwrap();

        assert_eq!(reveal.selected, "Raise");
        assert!(!reveal.is_correct);
        assert_eq!(reveal.source, AnswerSource::Timeout);
        assert_eq!(session.score(), 0);
        assert_eq!(session.lives_remaining(), Some(2));
        assert_eq!(session.deadline(), None);
    }

    #[test]
    fn untimed_sessions_never_expire() {
        let now = fixed_now();
        let mut session = QuizSession::start(deck(1), QuizConfig::progress_mode(), None, now).unwrap();
        assert_eq!(session.deadline(), None);
        assert!(session.expire_if_due(now + secs(3600)).is_none());
    }

    #[test]
    fn countdown_restarts_on_each_question() {
        let now = fixed_now();
        let config = QuizConfig::lives_mode().with_shuffle(false);
        let mut session = QuizSession::start(deck(3), config, None, now).unwrap();

        session.select_answer("Raise", now + secs(5)).unwrap();
        session.advance(now + secs(7)).unwrap();

        assert_eq!(session.deadline(), Some(now + secs(27)));
        assert_eq!(
            session.remaining_time(now + secs(17)),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn reveal_delay_gates_advance_readiness() {
        let now = fixed_now();
        let mut session = QuizSession::start(deck(2), QuizConfig::progress_mode(), None, now).unwrap();
        assert!(!session.ready_to_advance(now));
        assert_eq!(session.reveal_remaining(now), None);

        session.select_answer("Raise", now).unwrap();
        assert!(!session.ready_to_advance(now + ChronoDuration::milliseconds(1499)));
        assert!(session.ready_to_advance(now + ChronoDuration::milliseconds(1500)));
        assert_eq!(
            session.reveal_remaining(now + ChronoDuration::milliseconds(1000)),
            Some(Duration::from_millis(500))
        );
        assert_eq!(
            session.reveal_remaining(now + ChronoDuration::seconds(9)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn resume_jumps_to_stored_point() {
        let resume = ResumePoint { index: 2, score: 2 };
        let session =
            QuizSession::start(deck(5), QuizConfig::progress_mode(), Some(resume), fixed_now())
                .unwrap();
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.score(), 2);
    }

    #[test]
    fn resume_past_the_end_starts_fresh() {
        let resume = ResumePoint { index: 5, score: 4 };
        let session =
            QuizSession::start(deck(5), QuizConfig::progress_mode(), Some(resume), fixed_now())
                .unwrap();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn resume_is_ignored_when_disabled() {
        let resume = ResumePoint { index: 1, score: 1 };
        let config = QuizConfig::lives_mode();
        let session = QuizSession::start(deck(3), config, Some(resume), fixed_now()).unwrap();
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn shuffle_keeps_every_question() {
        let mut rng = StdRng::seed_from_u64(3);
        let session = QuizSession::start_with_rng(
            deck(8),
            QuizConfig::lives_mode(),
            None,
            fixed_now(),
            &mut rng,
        )
        .unwrap();

        let mut ids: Vec<u64> = session.questions().iter().map(|q| q.id().value()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn restart_requires_terminal_phase_and_resets() {
        let now = fixed_now();
        let config = QuizConfig::lives_mode().with_lives(Some(1)).with_shuffle(false);
        let mut session = QuizSession::start(deck(3), config, None, now).unwrap();
        assert_eq!(session.restart(now), Err(QuizError::NotFinished));

        session.select_answer("Fold", now).unwrap();
        assert_eq!(session.advance(now), Some(Advance::GameOver));

        session.restart(now + secs(2)).unwrap();
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.lives_remaining(), Some(1));
        assert_eq!(session.score(), 0);
        assert_eq!(session.question_started_at(), now + secs(2));
    }

    #[test]
    fn opponent_interval_has_a_floor() {
        let config = QuizConfig::default().with_opponent_reveal_interval(Duration::ZERO);
        assert_eq!(config.opponent_reveal_interval(), Duration::from_millis(1));
    }
}
