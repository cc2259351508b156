use chrono::{Duration, NaiveDate};
use quiz_core::model::{
    GameplayTally, LeaderboardEntry, PokerLogDraft, PokerLogId, ProgressRecord, QuizId, UserId,
};
use quiz_core::time::fixed_now;
use quiz_storage::StorageError;
use quiz_storage::repository::{
    GameplayRepository, LeaderboardRepository, PokerLogRepository, ProgressRepository,
};
use quiz_storage::sqlite::SqliteRepository;

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = repo("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn connect_creates_a_missing_file_in_wal_mode() {
    let path = std::env::temp_dir().join(format!("quiz-storage-{}.sqlite3", UserId::random()));
    assert!(!path.exists());

    let repo = SqliteRepository::connect(&format!("sqlite://{}", path.display()))
        .await
        .expect("connect");
    let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(mode, "wal");
    assert!(path.exists());

    repo.pool().close().await;
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn progress_upserts_on_user_and_quiz() {
    let repo = repo("memdb_progress").await;
    let user = UserId::random();
    let quiz = QuizId::quiz_two();

    repo.upsert_progress(&ProgressRecord::new(user, quiz.clone(), 2, 1, fixed_now()))
        .await
        .unwrap();
    let later = fixed_now() + Duration::minutes(3);
    repo.upsert_progress(&ProgressRecord::new(user, quiz.clone(), 5, 4, later))
        .await
        .unwrap();

    let stored = repo.get_progress(user, &quiz).await.unwrap().unwrap();
    assert_eq!(stored.last_question_index, 5);
    assert_eq!(stored.score, 4);
    assert_eq!(stored.updated_at, later);

    assert!(
        repo.get_progress(user, &QuizId::quiz_one())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn leaderboard_only_accepts_higher_scores() {
    let repo = repo("memdb_leaderboard").await;
    let (a, b) = (UserId::random(), UserId::random());
    let entry = |user_id, score, minutes| LeaderboardEntry {
        user_id,
        quiz_id: QuizId::quiz_one(),
        score,
        updated_at: fixed_now() + Duration::minutes(minutes),
    };

    assert!(repo.submit_if_greater(&entry(a, 6, 0)).await.unwrap());
    assert!(!repo.submit_if_greater(&entry(a, 6, 1)).await.unwrap());
    assert!(!repo.submit_if_greater(&entry(a, 3, 2)).await.unwrap());
    assert!(repo.submit_if_greater(&entry(b, 8, 3)).await.unwrap());
    assert!(repo.submit_if_greater(&entry(a, 8, 4)).await.unwrap());

    let top = repo.top_scores(&QuizId::quiz_one(), 10).await.unwrap();
    let order: Vec<_> = top.iter().map(|e| (e.user_id, e.score)).collect();
    assert_eq!(order, vec![(b, 8), (a, 8)]);

    let best = repo.get_best(a, &QuizId::quiz_one()).await.unwrap().unwrap();
    assert_eq!(best.updated_at, fixed_now() + Duration::minutes(4));
}

#[tokio::test]
async fn gameplay_tally_round_trips() {
    let repo = repo("memdb_tally").await;
    let day = fixed_now().date_naive();
    assert!(repo.get_tally(day).await.unwrap().is_none());

    let mut tally = GameplayTally::new(day);
    tally.record_loop();
    tally.record_prompt();
    tally.record_loop();
    repo.save_tally(&tally).await.unwrap();

    let stored = repo.get_tally(day).await.unwrap().unwrap();
    assert_eq!(stored.loops(), 2);
    assert_eq!(stored.prompted_at_loop(), Some(1));
}

#[tokio::test]
async fn poker_logs_are_owner_scoped() {
    let repo = repo("memdb_poker_logs").await;
    let (me, other) = (UserId::random(), UserId::random());
    let log = |user, day| {
        PokerLogDraft {
            played_on: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            buy_in: 200.0,
            small_blind: 1.0,
            big_blind: 3.0,
            cash_out: 260.5,
            notes: Some("Deep stacked".into()),
        }
        .validate(PokerLogId::random(), user, fixed_now())
        .unwrap()
    };

    let first = log(me, 17);
    repo.insert_log(&first).await.unwrap();
    repo.insert_log(&log(me, 20)).await.unwrap();
    repo.insert_log(&log(other, 18)).await.unwrap();
    assert!(matches!(
        repo.insert_log(&first).await,
        Err(StorageError::Conflict)
    ));

    let mine = repo.list_logs(me).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].played_on(), NaiveDate::from_ymd_opt(2025, 4, 20).unwrap());

    let fetched = repo.get_log(me, first.id()).await.unwrap();
    assert_eq!(fetched, first);
    assert!(matches!(
        repo.get_log(other, first.id()).await,
        Err(StorageError::NotFound)
    ));

    assert!(!repo.delete_log(other, first.id()).await.unwrap());
    assert!(repo.delete_log(me, first.id()).await.unwrap());
    assert_eq!(repo.list_logs(me).await.unwrap().len(), 1);
}
