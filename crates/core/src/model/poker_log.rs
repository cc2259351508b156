use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{PokerLogId, UserId};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PokerLogError {
    #[error("{field} must be a finite, non-negative amount (got {value})")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("small blind cannot exceed big blind")]
    BlindsOutOfOrder,
}

/// One live or online session in the bankroll tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokerLog {
    id: PokerLogId,
    user_id: UserId,
    played_on: NaiveDate,
    buy_in: f64,
    small_blind: f64,
    big_blind: f64,
    cash_out: f64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

/// Unvalidated form input for a new log.
#[derive(Debug, Clone, PartialEq)]
pub struct PokerLogDraft {
    pub played_on: NaiveDate,
    pub buy_in: f64,
    pub small_blind: f64,
    pub big_blind: f64,
    pub cash_out: f64,
    pub notes: Option<String>,
}

impl PokerLogDraft {
    /// Validate the draft and stamp it with an owner and id.
    ///
    /// # Errors
    ///
    /// Returns `PokerLogError` for negative or non-finite amounts, or blinds out of order.
    pub fn validate(
        self,
        id: PokerLogId,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<PokerLog, PokerLogError> {
        check_amount("buy_in", self.buy_in)?;
        check_amount("small_blind", self.small_blind)?;
        check_amount("big_blind", self.big_blind)?;
        check_amount("cash_out", self.cash_out)?;
        if self.small_blind > self.big_blind {
            return Err(PokerLogError::BlindsOutOfOrder);
        }

        let notes = self
            .notes
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());

        Ok(PokerLog {
            id,
            user_id,
            played_on: self.played_on,
            buy_in: self.buy_in,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            cash_out: self.cash_out,
            notes,
            created_at,
        })
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), PokerLogError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PokerLogError::InvalidAmount { field, value })
    }
}

impl PokerLog {
    /// Rehydrate a stored log, re-running draft validation.
    ///
    /// # Errors
    ///
    /// Returns `PokerLogError` if the stored amounts are invalid.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: PokerLogId,
        user_id: UserId,
        played_on: NaiveDate,
        buy_in: f64,
        small_blind: f64,
        big_blind: f64,
        cash_out: f64,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PokerLogError> {
        PokerLogDraft {
            played_on,
            buy_in,
            small_blind,
            big_blind,
            cash_out,
            notes,
        }
        .validate(id, user_id, created_at)
    }

    #[must_use]
    pub fn id(&self) -> PokerLogId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn played_on(&self) -> NaiveDate {
        self.played_on
    }

    #[must_use]
    pub fn buy_in(&self) -> f64 {
        self.buy_in
    }

    #[must_use]
    pub fn small_blind(&self) -> f64 {
        self.small_blind
    }

    #[must_use]
    pub fn big_blind(&self) -> f64 {
        self.big_blind
    }

    #[must_use]
    pub fn cash_out(&self) -> f64 {
        self.cash_out
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Profit and loss for the session.
    #[must_use]
    pub fn pnl(&self) -> f64 {
        self.cash_out - self.buy_in
    }
}

/// Ordering for the Poker Companion list. Both orders are descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogSort {
    #[default]
    Date,
    Pnl,
}

impl LogSort {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            LogSort::Date => LogSort::Pnl,
            LogSort::Pnl => LogSort::Date,
        }
    }

    /// Sorts newest (or most profitable) first; ties fall back to creation time.
    pub fn apply(self, logs: &mut [PokerLog]) {
        match self {
            LogSort::Date => logs.sort_by(|a, b| {
                b.played_on
                    .cmp(&a.played_on)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
            LogSort::Pnl => logs.sort_by(|a, b| {
                b.pnl()
                    .total_cmp(&a.pnl())
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft(day: u32, buy_in: f64, cash_out: f64) -> PokerLogDraft {
        PokerLogDraft {
            played_on: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            buy_in,
            small_blind: 1.0,
            big_blind: 2.0,
            cash_out,
            notes: None,
        }
    }

    fn log(day: u32, buy_in: f64, cash_out: f64) -> PokerLog {
        draft(day, buy_in, cash_out)
            .validate(PokerLogId::random(), UserId::random(), fixed_now())
            .unwrap()
    }

    #[test]
    fn pnl_is_cash_out_minus_buy_in() {
        assert!((log(1, 200.0, 350.5).pnl() - 150.5).abs() < f64::EPSILON);
        assert!(log(1, 200.0, 0.0).pnl() < 0.0);
    }

    #[test]
    fn rejects_negative_and_nan_amounts() {
        let err = draft(1, -5.0, 10.0)
            .validate(PokerLogId::random(), UserId::random(), fixed_now())
            .unwrap_err();
        assert!(matches!(err, PokerLogError::InvalidAmount { field: "buy_in", .. }));

        let err = draft(1, 5.0, f64::NAN)
            .validate(PokerLogId::random(), UserId::random(), fixed_now())
            .unwrap_err();
        assert!(matches!(err, PokerLogError::InvalidAmount { field: "cash_out", .. }));
    }

    #[test]
    fn rejects_small_blind_above_big_blind() {
        let mut d = draft(1, 100.0, 100.0);
        d.small_blind = 5.0;
        let err = d
            .validate(PokerLogId::random(), UserId::random(), fixed_now())
            .unwrap_err();
        assert_eq!(err, PokerLogError::BlindsOutOfOrder);
    }

    #[test]
    fn blank_notes_are_dropped() {
        let mut d = draft(1, 100.0, 100.0);
        d.notes = Some("   ".into());
        let log = d
            .validate(PokerLogId::random(), UserId::random(), fixed_now())
            .unwrap();
        assert_eq!(log.notes(), None);
    }

    #[test]
    fn sorts_by_date_then_by_pnl() {
        let mut logs = vec![log(3, 100.0, 90.0), log(10, 100.0, 50.0), log(5, 100.0, 400.0)];

        LogSort::Date.apply(&mut logs);
        let days: Vec<_> = logs.iter().map(|l| l.played_on().to_string()).collect();
        assert_eq!(days, vec!["2025-04-10", "2025-04-05", "2025-04-03"]);

        LogSort::Date.toggled().apply(&mut logs);
        let pnls: Vec<_> = logs.iter().map(PokerLog::pnl).collect();
        assert_eq!(pnls, vec![300.0, -10.0, -50.0]);
    }
}
