use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Loops between two login prompts on the same day.
pub const LOGIN_PROMPT_EVERY: u32 = 4;

/// Finished quiz runs for one calendar day, plus when the last login prompt fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameplayTally {
    day: NaiveDate,
    loops: u32,
    prompted_at_loop: Option<u32>,
}

impl GameplayTally {
    #[must_use]
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            loops: 0,
            prompted_at_loop: None,
        }
    }

    #[must_use]
    pub fn from_persisted(day: NaiveDate, loops: u32, prompted_at_loop: Option<u32>) -> Self {
        Self {
            day,
            loops,
            prompted_at_loop,
        }
    }

    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    #[must_use]
    pub fn loops(&self) -> u32 {
        self.loops
    }

    #[must_use]
    pub fn prompted_at_loop(&self) -> Option<u32> {
        self.prompted_at_loop
    }

    /// Counts one more finished run and returns the new total.
    pub fn record_loop(&mut self) -> u32 {
        self.loops = self.loops.saturating_add(1);
        self.loops
    }

    /// Prompt on loops 1, 5, 9, ... unless a prompt already fired fewer than
    /// `LOGIN_PROMPT_EVERY` loops ago.
    #[must_use]
    pub fn should_prompt(&self) -> bool {
        if let Some(at) = self.prompted_at_loop {
            if self.loops.saturating_sub(at) < LOGIN_PROMPT_EVERY {
                return false;
            }
        }
        self.loops >= 1 && (self.loops - 1) % LOGIN_PROMPT_EVERY == 0
    }

    pub fn record_prompt(&mut self) {
        self.prompted_at_loop = Some(self.loops);
    }
}
