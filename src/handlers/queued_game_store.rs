use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

use log::{info, warn};
use serde::Serialize;

use crate::{
    errors::TriviaError, models::actions::StartNewSuperTriviaGameAction,
    settings::TriviaSettingsRepository,
};

const MAX_REMEMBERED_ACTION_IDS: usize = 1024;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddQueuedGamesResult {
    pub amount_added: usize,
    pub new_queue_size: usize,
    pub old_queue_size: usize,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearQueuedGamesResult {
    pub amount_removed: usize,
    pub old_queue_size: usize,
}

/// Super games waiting for their channel to free up, FIFO per channel.
pub struct QueuedTriviaGameStore {
    settings: Arc<TriviaSettingsRepository>,
    queues: HashMap<String, VecDeque<StartNewSuperTriviaGameAction>>,
    expanded_action_ids: VecDeque<String>,
}

impl QueuedTriviaGameStore {
    pub fn new(settings: Arc<TriviaSettingsRepository>) -> QueuedTriviaGameStore {
        QueuedTriviaGameStore {
            settings,
            queues: HashMap::new(),
            expanded_action_ids: VecDeque::new(),
        }
    }

    /// Queues the games this action asks for. An action that already went
    /// through here (flagged consumed, or seen by id) adds nothing.
    pub fn add_super_games(
        &mut self,
        is_super_game_in_progress: bool,
        action: &mut StartNewSuperTriviaGameAction,
    ) -> Result<AddQueuedGamesResult, TriviaError> {
        let twitch_channel = action.twitch_channel.to_lowercase();
        let old_queue_size = self.size(&twitch_channel);

        if action.is_queue_action_consumed || self.expanded_action_ids.contains(&action.action_id) {
            action.is_queue_action_consumed = true;
            return Ok(AddQueuedGamesResult {
                amount_added: 0,
                new_queue_size: old_queue_size,
                old_queue_size,
            });
        }

        action.is_queue_action_consumed = true;
        self.remember_action_id(&action.action_id);

        let max_queue_size = self.settings.get()?.max_super_game_queue_size;
        let intended = if is_super_game_in_progress {
            action.number_of_games
        } else {
            action.number_of_games.saturating_sub(1)
        } as usize;

        let queue = self.queues.entry(twitch_channel.clone()).or_default();
        let mut amount_added = 0;

        while amount_added < intended && queue.len() < max_queue_size {
            queue.push_back(action.queued_copy());
            amount_added += 1;
        }

        if amount_added < intended {
            warn!(
                "Super trivia queue for {} is full (max {}), dropped {} game(s)",
                twitch_channel,
                max_queue_size,
                intended - amount_added
            );
        }

        let new_queue_size = queue.len();
        info!(
            "Queued {} super trivia game(s) for {} (queue size {} -> {})",
            amount_added, twitch_channel, old_queue_size, new_queue_size
        );

        Ok(AddQueuedGamesResult {
            amount_added,
            new_queue_size,
            old_queue_size,
        })
    }

    fn remember_action_id(&mut self, action_id: &str) {
        if self.expanded_action_ids.len() >= MAX_REMEMBERED_ACTION_IDS {
            self.expanded_action_ids.pop_front();
        }
        self.expanded_action_ids.push_back(action_id.to_string());
    }

    pub fn clear_queued_super_games(&mut self, twitch_channel: &str) -> ClearQueuedGamesResult {
        let old_queue_size = self.size(twitch_channel);
        let amount_removed = match self.queues.remove(&twitch_channel.to_lowercase()) {
            Some(queue) => queue.len(),
            None => 0,
        };

        info!(
            "Cleared {} queued super trivia game(s) for {}",
            amount_removed, twitch_channel
        );

        ClearQueuedGamesResult {
            amount_removed,
            old_queue_size,
        }
    }

    pub fn size(&self, twitch_channel: &str) -> usize {
        self.queues
            .get(&twitch_channel.to_lowercase())
            .map(VecDeque::len)
            .unwrap_or(0)
    }

    /// Pops one game for every channel with a queue that is not in `active_channels`
    /// (lowercased).
    pub fn pop_queued_super_games(
        &mut self,
        active_channels: &HashSet<String>,
    ) -> Vec<StartNewSuperTriviaGameAction> {
        let mut popped = Vec::new();

        for (twitch_channel, queue) in self.queues.iter_mut() {
            if active_channels.contains(twitch_channel) {
                continue;
            }

            match queue.pop_front() {
                Some(action) => popped.push(action),
                None => continue,
            }
        }

        self.queues.retain(|_, queue| !queue.is_empty());

        if !popped.is_empty() {
            info!("Popped {} queued super trivia game(s)", popped.len());
        }

        popped
    }

    /// Puts a popped game back at the front of its channel's queue.
    pub fn requeue(&mut self, action: StartNewSuperTriviaGameAction) {
        self.queues
            .entry(action.twitch_channel.to_lowercase())
            .or_default()
            .push_front(action);
    }
}
