use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::{DateTime, Duration, Utc};

use crate::{clock::Clock, errors::TriviaError, settings::TriviaSettingsRepository};

/// Remembers when each channel's last super game ended.
pub struct SuperTriviaCooldownHelper {
    clock: Arc<dyn Clock>,
    settings: Arc<TriviaSettingsRepository>,
    last_end_times: HashMap<String, DateTime<Utc>>,
}

impl SuperTriviaCooldownHelper {
    pub fn new(clock: Arc<dyn Clock>, settings: Arc<TriviaSettingsRepository>) -> SuperTriviaCooldownHelper {
        SuperTriviaCooldownHelper {
            clock,
            settings,
            last_end_times: HashMap::new(),
        }
    }

    fn cooldown(&self) -> Result<Duration, TriviaError> {
        Ok(Duration::seconds(self.settings.get()?.super_trivia_cooldown_seconds))
    }

    /// True when a new super game may start in the channel.
    pub fn is_ready(&self, twitch_channel: &str) -> Result<bool, TriviaError> {
        match self.last_end_times.get(&twitch_channel.to_lowercase()) {
            Some(last_end) => Ok(self.clock.now() - *last_end >= self.cooldown()?),
            None => Ok(true),
        }
    }

    pub fn update(&mut self, twitch_channel: &str) {
        self.last_end_times
            .insert(twitch_channel.to_lowercase(), self.clock.now());
    }

    /// Lowercased channels that are still cooling down.
    pub fn get_twitch_channels_in_cooldown(&self) -> Result<HashSet<String>, TriviaError> {
        let now = self.clock.now();
        let cooldown = self.cooldown()?;

        Ok(self
            .last_end_times
            .iter()
            .filter(|(_, last_end)| now - **last_end < cooldown)
            .map(|(twitch_channel, _)| twitch_channel.clone())
            .collect())
    }
}
