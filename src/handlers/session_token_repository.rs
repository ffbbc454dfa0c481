use std::sync::Arc;

use log::info;

use crate::{errors::DatabaseError, storage::backing_database::BackingDatabase};

/// Per-channel session tokens for the Open Trivia Database, which uses them
/// to avoid serving the same question twice.
pub struct OpenTriviaDatabaseSessionTokenRepository {
    database: Arc<BackingDatabase>,
}

impl OpenTriviaDatabaseSessionTokenRepository {
    pub fn new(
        database: Arc<BackingDatabase>,
    ) -> Result<OpenTriviaDatabaseSessionTokenRepository, DatabaseError> {
        database.create_table_if_not_exists(
            "CREATE TABLE IF NOT EXISTS openTriviaDatabaseSessionTokens (
                sessionToken TEXT,
                twitchChannel TEXT NOT NULL PRIMARY KEY COLLATE NOCASE
            )",
        )?;

        Ok(OpenTriviaDatabaseSessionTokenRepository { database })
    }

    pub fn get(&self, twitch_channel: &str) -> Result<Option<String>, DatabaseError> {
        let token = self.database.fetch_row(
            "SELECT sessionToken FROM openTriviaDatabaseSessionTokens WHERE twitchChannel = ? LIMIT 1",
            &[&twitch_channel],
            |row| row.get::<_, Option<String>>(0),
        )?;

        Ok(token.flatten().filter(|token| !token.trim().is_empty()))
    }

    pub fn update(&self, session_token: &str, twitch_channel: &str) -> Result<(), DatabaseError> {
        self.database.execute(
            "INSERT INTO openTriviaDatabaseSessionTokens (sessionToken, twitchChannel) VALUES (?, ?)
            ON CONFLICT (twitchChannel) DO UPDATE SET sessionToken = excluded.sessionToken",
            &[&session_token, &twitch_channel],
        )?;

        info!("Stored Open Trivia Database session token for {}", twitch_channel);
        Ok(())
    }

    pub fn remove(&self, twitch_channel: &str) -> Result<(), DatabaseError> {
        self.database.execute(
            "DELETE FROM openTriviaDatabaseSessionTokens WHERE twitchChannel = ?",
            &[&twitch_channel],
        )?;

        info!("Removed Open Trivia Database session token for {}", twitch_channel);
        Ok(())
    }
}
