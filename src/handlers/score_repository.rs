use std::sync::Arc;

use log::info;

use crate::{
    errors::{DatabaseError, TriviaError},
    models::score::TriviaScoreResult,
    storage::backing_database::BackingDatabase,
};

pub struct TriviaScoreRepository {
    database: Arc<BackingDatabase>,
}

impl TriviaScoreRepository {
    pub fn new(database: Arc<BackingDatabase>) -> Result<TriviaScoreRepository, DatabaseError> {
        database.create_table_if_not_exists(
            "CREATE TABLE IF NOT EXISTS triviaScores (
                streak INTEGER NOT NULL DEFAULT 0,
                totalLosses INTEGER NOT NULL DEFAULT 0,
                totalWins INTEGER NOT NULL DEFAULT 0,
                twitchChannel TEXT NOT NULL COLLATE NOCASE,
                userId TEXT NOT NULL COLLATE NOCASE,
                PRIMARY KEY (twitchChannel, userId)
            )",
        )?;

        Ok(TriviaScoreRepository { database })
    }

    fn validate(twitch_channel: &str, user_id: &str) -> Result<(), TriviaError> {
        if twitch_channel.trim().is_empty() {
            return Err(TriviaError::InvalidInput("twitch channel is blank".to_string()));
        }
        if user_id.trim().is_empty() || user_id == "0" {
            return Err(TriviaError::InvalidInput(format!(
                "user id is malformed: \"{}\"",
                user_id
            )));
        }
        Ok(())
    }

    /// Current score, creating an empty row on first sight.
    pub fn fetch_trivia_score(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> Result<TriviaScoreResult, TriviaError> {
        Self::validate(twitch_channel, user_id)?;

        let row = self.database.fetch_row(
            "SELECT streak, totalLosses, totalWins FROM triviaScores
            WHERE twitchChannel = ? AND userId = ?
            LIMIT 1",
            &[&twitch_channel, &user_id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?)),
        )?;

        let (streak, total_losses, total_wins) = match row {
            Some(row) => row,
            None => {
                self.database.execute(
                    "INSERT INTO triviaScores (streak, totalLosses, totalWins, twitchChannel, userId)
                    VALUES (0, 0, 0, ?, ?)",
                    &[&twitch_channel, &user_id],
                )?;
                (0, 0, 0)
            }
        };

        Ok(TriviaScoreResult {
            twitch_channel: twitch_channel.to_string(),
            user_id: user_id.to_string(),
            streak,
            total_losses: total_losses.max(0) as u64,
            total_wins: total_wins.max(0) as u64,
        })
    }

    pub fn increment_total_wins(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> Result<TriviaScoreResult, TriviaError> {
        let score = self.fetch_trivia_score(twitch_channel, user_id)?;
        let streak = if score.streak >= 1 { score.streak + 1 } else { 1 };

        self.store(TriviaScoreResult {
            streak,
            total_wins: score.total_wins + 1,
            ..score
        })
    }

    pub fn increment_total_losses(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> Result<TriviaScoreResult, TriviaError> {
        let score = self.fetch_trivia_score(twitch_channel, user_id)?;
        let streak = if score.streak <= -1 { score.streak - 1 } else { -1 };

        self.store(TriviaScoreResult {
            streak,
            total_losses: score.total_losses + 1,
            ..score
        })
    }

    fn store(&self, score: TriviaScoreResult) -> Result<TriviaScoreResult, TriviaError> {
        self.database.execute(
            "UPDATE triviaScores SET streak = ?, totalLosses = ?, totalWins = ?
            WHERE twitchChannel = ? AND userId = ?",
            &[
                &score.streak,
                &(score.total_losses as i64),
                &(score.total_wins as i64),
                &score.twitch_channel,
                &score.user_id,
            ],
        )?;

        info!(
            "Trivia score for {} in {}: {} win(s), {} loss(es), streak {}",
            score.user_id, score.twitch_channel, score.total_wins, score.total_losses, score.streak
        );
        Ok(score)
    }
}
