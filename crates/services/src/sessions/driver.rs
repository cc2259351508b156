use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at, sleep};

use quiz_core::model::Position;
use quiz_core::table::TableView;
use quiz_core::{AnswerReveal, QuizSession, SessionPhase};

use super::workflow::{SessionLoopService, StepOutcome};
use crate::error::SessionError;

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Everything a front end needs to animate a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    QuestionShown {
        index: usize,
        total: usize,
        seconds_left: Option<u64>,
    },
    Countdown {
        seconds_left: u64,
    },
    OpponentRevealed {
        seat: Position,
        action: String,
    },
    AnswerRevealed(AnswerReveal),
    Advanced(StepOutcome),
}

/// Runs a session in real time: countdown, staggered opponent reveals, the
/// reveal pause, and auto-advance.
///
/// Timers live inside the per-question loop, so leaving a question drops them.
#[derive(Clone)]
pub struct SessionDriver {
    service: Arc<SessionLoopService>,
}

impl SessionDriver {
    #[must_use]
    pub fn new(service: Arc<SessionLoopService>) -> Self {
        Self { service }
    }

    /// Drive `session` until it completes or runs out of lives.
    ///
    /// Answers arriving while a result is on screen are discarded. A session
    /// handed over with its answer already revealed waits out what is left of
    /// the reveal delay and moves on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` if the session has already ended and
    /// `SessionError::InputClosed` if `answers` closes while a question is
    /// waiting for input.
    pub async fn run(
        &self,
        session: &mut QuizSession,
        answers: &mut mpsc::Receiver<String>,
        events: &mpsc::UnboundedSender<DriverEvent>,
    ) -> Result<StepOutcome, SessionError> {
        loop {
            if session.phase().is_terminal() {
                return Err(SessionError::Finished);
            }
            let pause = if session.phase() == SessionPhase::AnswerRevealed {
                session
                    .reveal_remaining(self.service.clock().now())
                    .unwrap_or_default()
            } else {
                let reveal = self.ask(session, answers, events).await?;
                emit(events, DriverEvent::AnswerRevealed(reveal));
                session.config().reveal_delay()
            };

            sleep(pause).await;
            while answers.try_recv().is_ok() {}

            let outcome = self
                .service
                .advance(session)
                .await
                .ok_or(SessionError::Finished)?;
            emit(events, DriverEvent::Advanced(outcome));
            if outcome.is_terminal() {
                return Ok(outcome);
            }
        }
    }

    async fn ask(
        &self,
        session: &mut QuizSession,
        answers: &mut mpsc::Receiver<String>,
        events: &mpsc::UnboundedSender<DriverEvent>,
    ) -> Result<AnswerReveal, SessionError> {
        let table = session
            .current_question()
            .map(TableView::for_question)
            .map(|t| t.opponents)
            .unwrap_or_default();
        let timeout = session.config().answer_timeout();
        let started = Instant::now();

        emit(
            events,
            DriverEvent::QuestionShown {
                index: session.current_index(),
                total: session.total(),
                seconds_left: timeout.map(|t| t.as_secs()),
            },
        );

        let deadline = sleep(timeout.unwrap_or_default());
        tokio::pin!(deadline);
        let mut countdown = interval_at(started + COUNTDOWN_TICK, COUNTDOWN_TICK);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut reveals = interval(session.config().opponent_reveal_interval());
        let mut revealed = 0;

        loop {
            tokio::select! {
                answer = answers.recv() => {
                    let Some(answer) = answer else {
                        return Err(SessionError::InputClosed);
                    };
                    if let Some(reveal) = self.service.select_answer(session, &answer) {
                        return Ok(reveal);
                    }
                }
                () = &mut deadline, if timeout.is_some() => {
                    if let Some(reveal) = self.service.time_out(session) {
                        return Ok(reveal);
                    }
                }
                _ = countdown.tick(), if timeout.is_some() => {
                    let left = timeout
                        .unwrap_or_default()
                        .saturating_sub(started.elapsed());
                    emit(events, DriverEvent::Countdown { seconds_left: left.as_secs() });
                }
                _ = reveals.tick(), if revealed < table.len() => {
                    let seat = &table[revealed];
                    emit(events, DriverEvent::OpponentRevealed {
                        seat: seat.seat,
                        action: seat.action.clone(),
                    });
                    revealed += 1;
                }
            }
        }
    }
}

fn emit(events: &mpsc::UnboundedSender<DriverEvent>, event: DriverEvent) {
    if events.send(event).is_err() {
        tracing::trace!("driver event dropped; no listener");
    }
}
