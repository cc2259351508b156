use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};

use quiz_core::model::{
    OpponentAction, Position, ProgressRecord, Question, QuestionId, QuizId, UserId,
};
use quiz_core::time::fixed_clock;
use quiz_core::{Advance, AnswerSource, QuizConfig, SessionPhase};
use quiz_services::{
    DriverEvent, LocalAuth, SessionDriver, SessionError, SessionLoopService, StaticQuestionSource,
};
use quiz_storage::repository::{ProgressRepository, Storage, StorageError};

fn hand(id: u64) -> Question {
    Question::new(
        QuestionId::new(id),
        "You have JJ in BB facing a raise and a call. Action?",
        vec!["Fold".into(), "Call".into(), "Raise".into()],
        "Call",
    )
    .unwrap()
    .with_opponent_actions(vec![
        OpponentAction::new("UTG", "Raise"),
        OpponentAction::new("CO", "Call"),
    ])
}

fn loop_service(config: QuizConfig, n: u64, storage: &Storage) -> Arc<SessionLoopService> {
    let deck = Arc::new(StaticQuestionSource::new((1..=n).map(hand).collect()));
    Arc::new(
        SessionLoopService::new(
            fixed_clock(),
            QuizId::quiz_one(),
            deck,
            Arc::new(LocalAuth::signed_in(UserId::random())),
            storage,
        )
        .with_config(config),
    )
}

/// A progress store that takes half a minute per write.
struct SluggishProgress;

#[async_trait]
impl ProgressRepository for SluggishProgress {
    async fn upsert_progress(&self, _record: &ProgressRecord) -> Result<(), StorageError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }

    async fn get_progress(
        &self,
        _user_id: UserId,
        _quiz_id: &QuizId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        Ok(None)
    }
}

#[tokio::test(start_paused = true)]
async fn silent_player_times_out_into_game_over() {
    let storage = Storage::in_memory();
    let service = loop_service(QuizConfig::lives_mode(), 5, &storage);
    let driver = SessionDriver::new(Arc::clone(&service));
    let mut session = service.start().await.unwrap();

    let (_answers_tx, mut answers) = mpsc::channel(4);
    let (events_tx, mut events) = mpsc::unbounded_channel();

    let outcome = driver.run(&mut session, &mut answers, &events_tx).await.unwrap();
    assert_eq!(outcome.advance, Advance::GameOver);
    drop(events_tx);

    let mut seen = Vec::new();
    while let Some(event) = events.recv().await {
        seen.push(event);
    }

    let reveals: Vec<_> = seen
        .iter()
        .filter_map(|e| match e {
            DriverEvent::AnswerRevealed(reveal) => Some(reveal),
            _ => None,
        })
        .collect();
    assert_eq!(reveals.len(), 3);
    assert!(reveals.iter().all(|r| r.source == AnswerSource::Timeout && !r.is_correct));
    assert_eq!(reveals[2].lives_remaining, Some(0));

    let opponents: Vec<_> = seen
        .iter()
        .filter_map(|e| match e {
            DriverEvent::OpponentRevealed { seat, .. } => Some(*seat),
            _ => None,
        })
        .collect();
    assert_eq!(opponents.len(), 6);
    assert_eq!(&opponents[..2], &[Position::Utg, Position::Co]);

    assert!(seen.contains(&DriverEvent::Countdown { seconds_left: 19 }));
    assert_eq!(
        seen.first(),
        Some(&DriverEvent::QuestionShown {
            index: 0,
            total: 5,
            seconds_left: Some(20),
        })
    );

    let again = driver.run(&mut session, &mut answers, &mpsc::unbounded_channel().0).await;
    assert!(matches!(again, Err(SessionError::Finished)));
}

#[tokio::test(start_paused = true)]
async fn responder_answers_every_question() {
    let storage = Storage::in_memory();
    let service = loop_service(QuizConfig::progress_mode(), 3, &storage);
    let driver = SessionDriver::new(Arc::clone(&service));
    let mut session = service.start().await.unwrap();

    let (answers_tx, mut answers) = mpsc::channel(4);
    let (events_tx, mut events) = mpsc::unbounded_channel();

    let responder = tokio::spawn(async move {
        let mut shown = 0;
        while let Some(event) = events.recv().await {
            if let DriverEvent::QuestionShown { seconds_left, .. } = event {
                assert_eq!(seconds_left, None);
                shown += 1;
                if answers_tx.send("Call".to_owned()).await.is_err() {
                    break;
                }
            }
        }
        shown
    });

    let outcome = driver.run(&mut session, &mut answers, &events_tx).await.unwrap();
    drop(events_tx);

    assert_eq!(outcome.advance, Advance::Completed);
    assert!(service.settle().await);
    assert_eq!(session.score(), 3);
    assert_eq!(responder.await.unwrap(), 3);
}

#[tokio::test(start_paused = true)]
async fn closed_input_stops_the_driver() {
    let storage = Storage::in_memory();
    let service = loop_service(QuizConfig::progress_mode(), 2, &storage);
    let driver = SessionDriver::new(Arc::clone(&service));
    let mut session = service.start().await.unwrap();

    let (answers_tx, mut answers) = mpsc::channel::<String>(1);
    drop(answers_tx);
    let (events_tx, _events) = mpsc::unbounded_channel();

    let result = driver.run(&mut session, &mut answers, &events_tx).await;
    assert!(matches!(result, Err(SessionError::InputClosed)));
}

#[tokio::test(start_paused = true)]
async fn slow_progress_store_does_not_hold_up_the_next_question() {
    let mut storage = Storage::in_memory();
    storage.progress = Arc::new(SluggishProgress);
    let service = loop_service(QuizConfig::progress_mode(), 2, &storage);
    let driver = SessionDriver::new(Arc::clone(&service));
    let mut session = service.start().await.unwrap();

    let (answers_tx, mut answers) = mpsc::channel(4);
    let (events_tx, mut events) = mpsc::unbounded_channel();

    let responder = tokio::spawn(async move {
        let mut shown_at = Vec::new();
        while let Some(event) = events.recv().await {
            if let DriverEvent::QuestionShown { .. } = event {
                shown_at.push(Instant::now());
                if answers_tx.send("Call".to_owned()).await.is_err() {
                    break;
                }
            }
        }
        shown_at
    });

    let outcome = driver.run(&mut session, &mut answers, &events_tx).await.unwrap();
    drop(events_tx);
    assert_eq!(outcome.advance, Advance::Completed);

    let shown_at = responder.await.unwrap();
    assert_eq!(shown_at.len(), 2);
    let gap = shown_at[1] - shown_at[0];
    assert!(gap < Duration::from_secs(2), "second question took {gap:?}");

    // The writes are still pending and finish in the background.
    service.settle().await;
}

#[tokio::test(start_paused = true)]
async fn driver_picks_up_a_session_with_its_answer_on_screen() {
    let storage = Storage::in_memory();
    let service = loop_service(QuizConfig::progress_mode(), 2, &storage);
    let driver = SessionDriver::new(Arc::clone(&service));
    let mut session = service.start().await.unwrap();

    service.select_answer(&mut session, "Call").unwrap();
    assert_eq!(session.phase(), SessionPhase::AnswerRevealed);

    let (answers_tx, mut answers) = mpsc::channel(4);
    let (events_tx, mut events) = mpsc::unbounded_channel();

    let responder = tokio::spawn(async move {
        let mut shown = Vec::new();
        while let Some(event) = events.recv().await {
            if let DriverEvent::QuestionShown { index, .. } = event {
                shown.push(index);
                if answers_tx.send("Call".to_owned()).await.is_err() {
                    break;
                }
            }
        }
        shown
    });

    let outcome = timeout(
        Duration::from_secs(10),
        driver.run(&mut session, &mut answers, &events_tx),
    )
    .await
    .expect("driver should not spin on a revealed answer")
    .unwrap();
    drop(events_tx);

    assert_eq!(outcome.advance, Advance::Completed);
    assert_eq!(session.score(), 2);
    assert_eq!(responder.await.unwrap(), vec![1]);
}
