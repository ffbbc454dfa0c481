use std::sync::Arc;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use log::info;
use serde::Serialize;

use crate::{
    clock::Clock,
    errors::{DatabaseError, TriviaError},
    models::{
        content_code::TriviaContentCode,
        question::{Question, TriviaSource},
    },
    settings::TriviaSettingsRepository,
    storage::backing_database::BackingDatabase,
};

/// The last question that was asked with a given emote in a channel.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TriviaQuestionReference {
    pub emote: String,
    pub trivia_id: String,
    pub trivia_source: TriviaSource,
    pub twitch_channel: String,
}

pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(text)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|error| DatabaseError::Malformed(format!("timestamp \"{}\": {}", text, error)))
}

pub struct TriviaHistoryRepository {
    database: Arc<BackingDatabase>,
    settings: Arc<TriviaSettingsRepository>,
    clock: Arc<dyn Clock>,
}

impl TriviaHistoryRepository {
    pub fn new(
        database: Arc<BackingDatabase>,
        settings: Arc<TriviaSettingsRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<TriviaHistoryRepository, DatabaseError> {
        database.create_table_if_not_exists(
            "CREATE TABLE IF NOT EXISTS triviaHistory (
                datetime TEXT NOT NULL,
                emote TEXT NOT NULL,
                triviaId TEXT NOT NULL COLLATE NOCASE,
                triviaSource TEXT NOT NULL COLLATE NOCASE,
                twitchChannel TEXT NOT NULL COLLATE NOCASE,
                PRIMARY KEY (triviaId, triviaSource, twitchChannel)
            )",
        )?;

        Ok(TriviaHistoryRepository {
            database,
            settings,
            clock,
        })
    }

    /// Records the question for the channel unless it was asked there too recently.
    pub fn verify(
        &self,
        question: &Question,
        emote: &str,
        twitch_channel: &str,
    ) -> Result<TriviaContentCode, TriviaError> {
        let source = question.trivia_source.as_str();
        let stored = self.database.fetch_row(
            "SELECT datetime FROM triviaHistory
            WHERE triviaId = ? AND triviaSource = ? AND twitchChannel = ?
            LIMIT 1",
            &[&question.trivia_id, &source, &twitch_channel],
            |row| row.get::<_, String>(0),
        )?;

        let now = self.clock.now();

        if let Some(stored) = stored {
            let asked_at = parse_timestamp(&stored)?;
            let min_days = self.settings.get()?.min_days_before_repeat_question;

            if now - asked_at < Duration::days(min_days) {
                info!(
                    "Trivia question {} ({}) was asked in {} on {}, rejecting as a repeat",
                    question.trivia_id, source, twitch_channel, stored
                );
                return Ok(TriviaContentCode::Repeat);
            }
        }

        self.database.execute(
            "INSERT INTO triviaHistory (datetime, emote, triviaId, triviaSource, twitchChannel)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (triviaId, triviaSource, twitchChannel)
            DO UPDATE SET datetime = excluded.datetime, emote = excluded.emote",
            &[
                &format_timestamp(now),
                &emote,
                &question.trivia_id,
                &source,
                &twitch_channel,
            ],
        )?;

        Ok(TriviaContentCode::Ok)
    }

    pub fn get_most_recent_trivia_question_details(
        &self,
        emote: &str,
        twitch_channel: &str,
    ) -> Result<Option<TriviaQuestionReference>, TriviaError> {
        let row = self.database.fetch_row(
            "SELECT emote, triviaId, triviaSource, twitchChannel FROM triviaHistory
            WHERE emote = ? AND twitchChannel = ?
            ORDER BY datetime DESC
            LIMIT 1",
            &[&emote, &twitch_channel],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )?;

        match row {
            Some((emote, trivia_id, trivia_source, twitch_channel)) => {
                Ok(Some(TriviaQuestionReference {
                    emote,
                    trivia_id,
                    trivia_source: trivia_source.parse()?,
                    twitch_channel,
                }))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{
        clock::ManualClock,
        models::question::{QuestionKind, TriviaDifficulty},
        settings::TriviaSettings,
    };

    fn question(trivia_id: &str) -> Question {
        Question::new(
            trivia_id.to_string(),
            TriviaSource::WillFryTrivia,
            TriviaDifficulty::Easy,
            None,
            "Is the sky blue?".to_string(),
            QuestionKind::TrueFalse {
                correct_answers: BTreeSet::from([true]),
            },
        )
        .unwrap()
    }

    fn repository(clock: Arc<ManualClock>) -> TriviaHistoryRepository {
        TriviaHistoryRepository::new(
            Arc::new(BackingDatabase::open_in_memory().unwrap()),
            Arc::new(TriviaSettingsRepository::from_settings(TriviaSettings {
                min_days_before_repeat_question: 10,
                ..TriviaSettings::default()
            })),
            clock,
        )
        .unwrap()
    }

    #[test]
    fn repeats_are_rejected_until_enough_days_pass() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let repository = repository(clock.clone());
        let question = question("abc");

        assert_eq!(
            repository.verify(&question, "🧮", "smCharles").unwrap(),
            TriviaContentCode::Ok
        );
        assert_eq!(
            repository.verify(&question, "🧮", "SMCHARLES").unwrap(),
            TriviaContentCode::Repeat
        );
        assert_eq!(
            repository.verify(&question, "🧮", "imyt").unwrap(),
            TriviaContentCode::Ok
        );

        clock.advance_seconds(10 * 24 * 60 * 60);
        assert_eq!(
            repository.verify(&question, "👽", "smCharles").unwrap(),
            TriviaContentCode::Ok
        );
        assert_eq!(
            repository.verify(&question, "👽", "smCharles").unwrap(),
            TriviaContentCode::Repeat
        );
    }

    #[test]
    fn most_recent_question_for_an_emote() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let repository = repository(clock.clone());

        repository.verify(&question("first"), "🧮", "smCharles").unwrap();
        clock.advance_seconds(30);
        repository.verify(&question("second"), "🧮", "smCharles").unwrap();
        clock.advance_seconds(30);
        repository.verify(&question("third"), "👽", "smCharles").unwrap();

        let reference = repository
            .get_most_recent_trivia_question_details("🧮", "smcharles")
            .unwrap()
            .unwrap();
        assert_eq!(reference.trivia_id, "second");
        assert_eq!(reference.trivia_source, TriviaSource::WillFryTrivia);

        assert!(repository
            .get_most_recent_trivia_question_details("🎒", "smCharles")
            .unwrap()
            .is_none());
    }
}
