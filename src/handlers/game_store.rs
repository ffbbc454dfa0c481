use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::{
    helpers::equals_ignore_case,
    models::game_state::{GameState, SuperTriviaGameState, TriviaGameState},
};

/// Every running game. Callers keep (channel, user) unique for normal games
/// and channel unique for super games.
#[derive(Debug, Default)]
pub struct TriviaGameStore {
    games: Vec<GameState>,
}

impl TriviaGameStore {
    pub fn new() -> TriviaGameStore {
        TriviaGameStore { games: Vec::new() }
    }

    pub fn add(&mut self, state: GameState) {
        self.games.push(state);
    }

    pub fn get_all(&self) -> &[GameState] {
        &self.games
    }

    pub fn get_normal_game(&self, twitch_channel: &str, user_id: &str) -> Option<&TriviaGameState> {
        self.games.iter().find_map(|game| match game {
            GameState::Normal(state)
                if equals_ignore_case(&state.details.twitch_channel, twitch_channel)
                    && equals_ignore_case(&state.user_id, user_id) =>
            {
                Some(state)
            }
            _ => None,
        })
    }

    pub fn get_super_game(&self, twitch_channel: &str) -> Option<&SuperTriviaGameState> {
        self.games.iter().find_map(|game| match game {
            GameState::Super(state)
                if equals_ignore_case(&state.details.twitch_channel, twitch_channel) =>
            {
                Some(state)
            }
            _ => None,
        })
    }

    pub fn get_super_game_mut(&mut self, twitch_channel: &str) -> Option<&mut SuperTriviaGameState> {
        self.games.iter_mut().find_map(|game| match game {
            GameState::Super(state)
                if equals_ignore_case(&state.details.twitch_channel, twitch_channel) =>
            {
                Some(state)
            }
            _ => None,
        })
    }

    pub fn remove_normal_game(&mut self, twitch_channel: &str, user_id: &str) -> bool {
        let before = self.games.len();
        self.games.retain(|game| match game {
            GameState::Normal(state) => {
                !(equals_ignore_case(&state.details.twitch_channel, twitch_channel)
                    && equals_ignore_case(&state.user_id, user_id))
            }
            GameState::Super(_) => true,
        });
        self.games.len() != before
    }

    pub fn remove_super_game(&mut self, twitch_channel: &str) -> bool {
        let before = self.games.len();
        self.games.retain(|game| match game {
            GameState::Super(state) => {
                !equals_ignore_case(&state.details.twitch_channel, twitch_channel)
            }
            GameState::Normal(_) => true,
        });
        self.games.len() != before
    }

    /// Lowercased channels that currently have a super game.
    pub fn get_twitch_channels_with_active_super_games(&self) -> HashSet<String> {
        self.games
            .iter()
            .filter(|game| game.is_super())
            .map(|game| game.twitch_channel().to_lowercase())
            .collect()
    }

    /// Removes and returns every game whose end time has passed.
    pub fn remove_expired(&mut self, now: DateTime<Utc>) -> Vec<GameState> {
        let (expired, active): (Vec<GameState>, Vec<GameState>) = self
            .games
            .drain(..)
            .partition(|game| game.end_time() < now);
        self.games = active;
        expired
    }
}
