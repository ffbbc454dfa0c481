use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::{
    errors::{DatabaseError, TriviaError},
    models::question::{TriviaSource, TriviaType},
    storage::backing_database::BackingDatabase,
};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AddTriviaAnswerResult {
    pub additional_answers: Vec<String>,
    pub trivia_id: String,
    pub trivia_source: TriviaSource,
    pub trivia_type: TriviaType,
}

/// Extra answers that moderators accepted for a question after the fact.
pub struct AdditionalTriviaAnswersRepository {
    database: Arc<BackingDatabase>,
}

impl AdditionalTriviaAnswersRepository {
    pub fn new(database: Arc<BackingDatabase>) -> Result<AdditionalTriviaAnswersRepository, DatabaseError> {
        database.create_table_if_not_exists(
            "CREATE TABLE IF NOT EXISTS additionalTriviaAnswers (
                additionalAnswers TEXT NOT NULL,
                triviaId TEXT NOT NULL COLLATE NOCASE,
                triviaSource TEXT NOT NULL COLLATE NOCASE,
                triviaType TEXT NOT NULL COLLATE NOCASE,
                PRIMARY KEY (triviaId, triviaSource, triviaType)
            )",
        )?;

        Ok(AdditionalTriviaAnswersRepository { database })
    }

    pub fn add_additional_answer(
        &self,
        additional_answer: &str,
        trivia_id: &str,
        trivia_source: TriviaSource,
        trivia_type: TriviaType,
    ) -> Result<AddTriviaAnswerResult, TriviaError> {
        let additional_answer = additional_answer.trim();
        if additional_answer.is_empty() {
            return Err(TriviaError::InvalidInput("additional answer is blank".to_string()));
        }
        if trivia_id.trim().is_empty() {
            return Err(TriviaError::InvalidInput("trivia id is blank".to_string()));
        }

        let mut additional_answers = self.get_additional_answers(trivia_id, trivia_source, trivia_type)?;
        if !additional_answers
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(additional_answer))
        {
            additional_answers.push(additional_answer.to_string());
        }

        let json = serde_json::to_string(&additional_answers)
            .map_err(|error| DatabaseError::Malformed(error.to_string()))?;

        self.database.execute(
            "INSERT INTO additionalTriviaAnswers (additionalAnswers, triviaId, triviaSource, triviaType)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (triviaId, triviaSource, triviaType)
            DO UPDATE SET additionalAnswers = excluded.additionalAnswers",
            &[&json, &trivia_id, &trivia_source.as_str(), &trivia_type.as_str()],
        )?;

        info!(
            "Added additional answer \"{}\" for {}:{} (all answers: {:?})",
            additional_answer, trivia_source, trivia_id, additional_answers
        );

        Ok(AddTriviaAnswerResult {
            additional_answers,
            trivia_id: trivia_id.to_string(),
            trivia_source,
            trivia_type,
        })
    }

    pub fn get_additional_answers(
        &self,
        trivia_id: &str,
        trivia_source: TriviaSource,
        trivia_type: TriviaType,
    ) -> Result<Vec<String>, TriviaError> {
        let json = self.database.fetch_row(
            "SELECT additionalAnswers FROM additionalTriviaAnswers
            WHERE triviaId = ? AND triviaSource = ? AND triviaType = ?
            LIMIT 1",
            &[&trivia_id, &trivia_source.as_str(), &trivia_type.as_str()],
            |row| row.get::<_, String>(0),
        )?;

        match json {
            Some(json) => serde_json::from_str(&json).map_err(|error| {
                TriviaError::Database(DatabaseError::Malformed(format!(
                    "additional answers for {}:{}: {}",
                    trivia_source, trivia_id, error
                )))
            }),
            None => Ok(Vec::new()),
        }
    }

    pub fn delete_additional_answers(
        &self,
        trivia_id: &str,
        trivia_source: TriviaSource,
        trivia_type: TriviaType,
    ) -> Result<bool, TriviaError> {
        let deleted = self.database.execute(
            "DELETE FROM additionalTriviaAnswers
            WHERE triviaId = ? AND triviaSource = ? AND triviaType = ?",
            &[&trivia_id, &trivia_source.as_str(), &trivia_type.as_str()],
        )?;

        Ok(deleted > 0)
    }
}
