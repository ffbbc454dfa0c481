use std::sync::Arc;

use log::info;

use crate::{
    errors::DatabaseError, models::question::TriviaSource,
    storage::backing_database::BackingDatabase,
};

pub struct BannedTriviaIdsRepository {
    database: Arc<BackingDatabase>,
}

impl BannedTriviaIdsRepository {
    pub fn new(database: Arc<BackingDatabase>) -> Result<BannedTriviaIdsRepository, DatabaseError> {
        database.create_table_if_not_exists(
            "CREATE TABLE IF NOT EXISTS bannedTriviaIds (
                triviaId TEXT NOT NULL COLLATE NOCASE,
                triviaSource TEXT NOT NULL COLLATE NOCASE,
                PRIMARY KEY (triviaId, triviaSource)
            )",
        )?;

        Ok(BannedTriviaIdsRepository { database })
    }

    pub fn ban(&self, trivia_id: &str, trivia_source: TriviaSource) -> Result<(), DatabaseError> {
        self.database.execute(
            "INSERT INTO bannedTriviaIds (triviaId, triviaSource) VALUES (?, ?)
            ON CONFLICT (triviaId, triviaSource) DO NOTHING",
            &[&trivia_id, &trivia_source.as_str()],
        )?;

        info!("Banned trivia question {}:{}", trivia_source, trivia_id);
        Ok(())
    }

    pub fn unban(&self, trivia_id: &str, trivia_source: TriviaSource) -> Result<(), DatabaseError> {
        self.database.execute(
            "DELETE FROM bannedTriviaIds WHERE triviaId = ? AND triviaSource = ?",
            &[&trivia_id, &trivia_source.as_str()],
        )?;

        info!("Unbanned trivia question {}:{}", trivia_source, trivia_id);
        Ok(())
    }

    pub fn is_banned(&self, trivia_id: &str, trivia_source: TriviaSource) -> Result<bool, DatabaseError> {
        let found = self.database.fetch_row(
            "SELECT triviaId FROM bannedTriviaIds WHERE triviaId = ? AND triviaSource = ? LIMIT 1",
            &[&trivia_id, &trivia_source.as_str()],
            |row| row.get::<_, String>(0),
        )?;

        Ok(found.is_some())
    }
}
