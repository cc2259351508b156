use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{QuizId, UserId};

/// Where a user left a quiz. At most one record exists per (user, quiz).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub last_question_index: u32,
    pub score: u32,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new(
        user_id: UserId,
        quiz_id: QuizId,
        last_question_index: u32,
        score: u32,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            quiz_id,
            last_question_index,
            score,
            updated_at,
        }
    }
}

/// Summary of a user's previous play of a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizHistory {
    pub quiz_id: QuizId,
    pub best_score: u32,
    pub last_played: DateTime<Utc>,
    /// Always 1: attempts are not tracked separately from the progress record.
    pub total_attempts: u32,
}

impl From<ProgressRecord> for QuizHistory {
    fn from(record: ProgressRecord) -> Self {
        Self {
            quiz_id: record.quiz_id,
            best_score: record.score,
            last_played: record.updated_at,
            total_attempts: 1,
        }
    }
}

/// A user's single best score for a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub score: u32,
    pub updated_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// True when this entry should replace `stored`.
    #[must_use]
    pub fn beats(&self, stored: &LeaderboardEntry) -> bool {
        self.score > stored.score
    }
}

/// Leaderboard row as shown to players; names are anonymised by rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: u32,
    pub user_id: UserId,
    pub display_name: String,
    pub score: u32,
}

/// Ranks entries already ordered best-first, starting at 1.
#[must_use]
pub fn rank_entries(entries: Vec<LeaderboardEntry>) -> Vec<RankedEntry> {
    entries
        .into_iter()
        .zip(1_u32..)
        .map(|(entry, rank)| RankedEntry {
            rank,
            user_id: entry.user_id,
            display_name: format!("Player {rank}"),
            score: entry.score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn entry(score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: UserId::random(),
            quiz_id: QuizId::quiz_one(),
            score,
            updated_at: fixed_now(),
        }
    }

    #[test]
    fn only_strictly_greater_scores_win() {
        assert!(entry(5).beats(&entry(4)));
        assert!(!entry(4).beats(&entry(4)));
        assert!(!entry(3).beats(&entry(4)));
    }

    #[test]
    fn ranks_are_one_based_and_anonymised() {
        let ranked = rank_entries(vec![entry(9), entry(7)]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].display_name, "Player 1");
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[1].score, 7);
    }

    #[test]
    fn history_mirrors_progress_record() {
        let record =
            ProgressRecord::new(UserId::random(), QuizId::quiz_two(), 4, 3, fixed_now());
        let history = QuizHistory::from(record);
        assert_eq!(history.best_score, 3);
        assert_eq!(history.last_played, fixed_now());
        assert_eq!(history.total_attempts, 1);
    }
}
