use chrono::NaiveDate;

use quiz_core::model::{LogSort, PokerLog, PokerLogDraft, PokerLogId};
use quiz_services::{CompanionService, pnl_label};

use crate::ArgsError;

/// What `poker-quiz logs` was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum LogsAction {
    List,
    Add,
    Show(PokerLogId),
    Delete(PokerLogId),
}

impl LogsAction {
    /// Consume the action word (and id) from the front of `args`, if present.
    pub fn parse(
        args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
    ) -> Result<Self, ArgsError> {
        let action = match args.peek().map(String::as_str) {
            Some("list") => Self::List,
            Some("add") => Self::Add,
            Some("show" | "delete") => {
                let word = args.next().unwrap_or_default();
                let raw = args.next().ok_or(ArgsError::MissingValue { flag: "<log id>" })?;
                let id = raw
                    .trim()
                    .parse()
                    .map_err(|_| ArgsError::InvalidLogId { raw: raw.clone() })?;
                return Ok(if word == "show" {
                    Self::Show(id)
                } else {
                    Self::Delete(id)
                });
            }
            _ => return Ok(Self::List),
        };
        args.next();
        Ok(action)
    }
}

/// `logs add` flags, collected before they are checked for completeness.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LogFields {
    pub played_on: Option<NaiveDate>,
    pub buy_in: Option<f64>,
    pub small_blind: Option<f64>,
    pub big_blind: Option<f64>,
    pub cash_out: Option<f64>,
    pub notes: Option<String>,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ArgsError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ArgsError::InvalidDate { raw: raw.into() })
}

pub fn parse_amount(flag: &'static str, raw: &str) -> Result<f64, ArgsError> {
    raw.trim()
        .trim_start_matches('$')
        .parse()
        .map_err(|_| ArgsError::InvalidNumber {
            flag,
            raw: raw.into(),
        })
}

impl LogFields {
    /// Range checks are left to `PokerLogDraft::validate`.
    pub fn into_draft(self) -> Result<PokerLogDraft, ArgsError> {
        Ok(PokerLogDraft {
            played_on: self.played_on.ok_or(ArgsError::MissingValue { flag: "--date" })?,
            buy_in: self.buy_in.ok_or(ArgsError::MissingValue { flag: "--buy-in" })?,
            small_blind: self
                .small_blind
                .ok_or(ArgsError::MissingValue { flag: "--small-blind" })?,
            big_blind: self
                .big_blind
                .ok_or(ArgsError::MissingValue { flag: "--big-blind" })?,
            cash_out: self
                .cash_out
                .ok_or(ArgsError::MissingValue { flag: "--cash-out" })?,
            notes: self.notes,
        })
    }
}

fn print_summary(log: &PokerLog) {
    println!("{}  {}  {}", log.id(), log.played_on(), pnl_label(log));
}

fn print_detail(log: &PokerLog) {
    println!("Log {}", log.id());
    println!("  Date:      {}", log.played_on());
    println!("  Blinds:    ${:.2}/${:.2}", log.small_blind(), log.big_blind());
    println!("  Buy-in:    ${:.2}", log.buy_in());
    println!("  Cash-out:  ${:.2}", log.cash_out());
    println!("  {}", pnl_label(log));
    if let Some(notes) = log.notes() {
        println!("  Notes:     {notes}");
    }
}

pub async fn run_logs(
    companion: &CompanionService,
    action: LogsAction,
    fields: LogFields,
    sort: LogSort,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        LogsAction::List => {
            let logs = companion.list(sort).await?;
            if logs.is_empty() {
                println!("No sessions logged yet.");
            }
            logs.iter().for_each(print_summary);
        }
        LogsAction::Add => {
            let log = companion.create(fields.into_draft()?).await?;
            println!("Saved.");
            print_detail(&log);
        }
        LogsAction::Show(id) => print_detail(&companion.get(id).await?),
        LogsAction::Delete(id) => {
            if companion.delete(id).await? {
                println!("Deleted {id}.");
            } else {
                println!("No log {id} to delete.");
            }
        }
    }
    Ok(())
}
