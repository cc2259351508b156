use std::sync::Arc;

use quiz_core::model::GameplayTally;
use quiz_storage::repository::{GameplayRepository, StorageError};

use crate::Clock;

/// Daily gameplay-loop counter that throttles login prompts.
#[derive(Clone)]
pub struct GameplayService {
    clock: Clock,
    tallies: Arc<dyn GameplayRepository>,
}

impl GameplayService {
    #[must_use]
    pub fn new(clock: Clock, tallies: Arc<dyn GameplayRepository>) -> Self {
        Self { clock, tallies }
    }

    async fn today(&self) -> Result<GameplayTally, StorageError> {
        let day = self.clock.today();
        Ok(self
            .tallies
            .get_tally(day)
            .await?
            .unwrap_or_else(|| GameplayTally::new(day)))
    }

    /// Count a finished run for today and return the new total.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the tally cannot be read or saved.
    pub async fn record_loop(&self) -> Result<u32, StorageError> {
        let mut tally = self.today().await?;
        let loops = tally.record_loop();
        self.tallies.save_tally(&tally).await?;
        Ok(loops)
    }

    /// Whether a login prompt is due now.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the tally cannot be read.
    pub async fn should_prompt(&self) -> Result<bool, StorageError> {
        match self.tallies.get_tally(self.clock.today()).await? {
            None => Ok(true),
            Some(tally) => Ok(tally.should_prompt()),
        }
    }

    /// Remember that a prompt was shown at today's loop count.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the tally cannot be read or saved.
    pub async fn record_prompt(&self) -> Result<(), StorageError> {
        let mut tally = self.today().await?;
        tally.record_prompt();
        self.tallies.save_tally(&tally).await
    }

    /// `should_prompt` followed by `record_prompt` when it fires.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the tally cannot be read or saved.
    pub async fn take_prompt(&self) -> Result<bool, StorageError> {
        if !self.should_prompt().await? {
            return Ok(false);
        }
        self.record_prompt().await?;
        Ok(true)
    }
}
