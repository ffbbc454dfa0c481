use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::{errors::DatabaseError, storage::backing_database::BackingDatabase};

pub const TRIVIA_EMOTES: [&str; 31] = [
    "🧮", "👽", "🎒", "🌍", "🫑", "🏫", "📚", "🚌", "📇", "🧀", "🐒", "🖍️", "🧬", "🐧", "🍇", "🍏",
    "📒", "🐈", "🤓", "📓", "📎", "🍎", "📝", "✏️", "🍫", "📐", "🍊", "🤔", "💭", "🍓", "🍉",
];

/// Hands out a different emote for every question asked in a channel.
pub struct TriviaEmoteGenerator {
    database: Arc<BackingDatabase>,
}

impl TriviaEmoteGenerator {
    pub fn new(database: Arc<BackingDatabase>) -> Result<TriviaEmoteGenerator, DatabaseError> {
        database.create_table_if_not_exists(
            "CREATE TABLE IF NOT EXISTS triviaEmotes (
                emoteIndex INTEGER NOT NULL DEFAULT 0,
                twitchChannel TEXT NOT NULL PRIMARY KEY COLLATE NOCASE
            )",
        )?;

        Ok(TriviaEmoteGenerator { database })
    }

    fn current_index(&self, twitch_channel: &str) -> Result<usize, DatabaseError> {
        let index = self.database.fetch_row(
            "SELECT emoteIndex FROM triviaEmotes WHERE twitchChannel = ? LIMIT 1",
            &[&twitch_channel],
            |row| row.get::<_, i64>(0),
        )?;

        Ok(match index {
            Some(index) if index >= 0 => index as usize % TRIVIA_EMOTES.len(),
            _ => 0,
        })
    }

    pub fn get_current_emote_for(&self, twitch_channel: &str) -> Result<String, DatabaseError> {
        Ok(TRIVIA_EMOTES[self.current_index(twitch_channel)?].to_string())
    }

    pub fn get_next_emote_for(&self, twitch_channel: &str) -> Result<String, DatabaseError> {
        let index = (self.current_index(twitch_channel)? + 1) % TRIVIA_EMOTES.len();

        self.database.execute(
            "INSERT INTO triviaEmotes (emoteIndex, twitchChannel) VALUES (?, ?)
            ON CONFLICT (twitchChannel) DO UPDATE SET emoteIndex = excluded.emoteIndex",
            &[&(index as i64), &twitch_channel],
        )?;

        Ok(TRIVIA_EMOTES[index].to_string())
    }

    pub fn get_random_emote(&self) -> String {
        TRIVIA_EMOTES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(TRIVIA_EMOTES[0])
            .to_string()
    }

    /// Returns the emote if it is one of ours.
    pub fn get_validated_and_normalized_emote(&self, emote: &str) -> Option<String> {
        let emote = emote.trim();
        TRIVIA_EMOTES
            .iter()
            .find(|candidate| **candidate == emote)
            .map(|candidate| candidate.to_string())
    }
}
