use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::{types::Value, Connection, OpenFlags, OptionalExtension, Row};

use crate::{
    errors::{DatabaseError, TriviaError},
    models::question::{TriviaDifficulty, TriviaSource},
};

use super::malformed;

/// Reads a column that some question sets store as text and others as a number.
pub fn column_text(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<String>> {
    let text = match row.get::<_, Value>(index)? {
        Value::Text(text) => Some(text),
        Value::Integer(number) => Some(number.to_string()),
        Value::Real(number) => Some(number.to_string()),
        Value::Null | Value::Blob(_) => None,
    };

    Ok(text.filter(|text| !text.trim().is_empty()))
}

/// Difficulty stored either as 1..=3 or as a name.
pub fn column_difficulty(row: &Row<'_>, index: usize) -> rusqlite::Result<TriviaDifficulty> {
    Ok(match column_text(row, index)? {
        Some(text) => match text.trim().parse::<i64>() {
            Ok(number) => TriviaDifficulty::from_int(number),
            Err(_) => TriviaDifficulty::from_str_or_unknown(Some(&text)),
        },
        None => TriviaDifficulty::Unknown,
    })
}

/// A read-only SQLite file of questions that ships next to the bot.
#[derive(Debug, Clone)]
pub struct QuestionSetFile {
    trivia_source: TriviaSource,
    path: PathBuf,
}

impl QuestionSetFile {
    pub fn new(trivia_source: TriviaSource, path: impl AsRef<Path>) -> QuestionSetFile {
        QuestionSetFile {
            trivia_source,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.path.is_file()
    }

    /// Runs `sql` (expected to end in `ORDER BY RANDOM() LIMIT 1`) and maps the single row.
    pub fn fetch_random_row<T, F>(&self, sql: &str, map: F) -> Result<T, TriviaError>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        debug!("Reading {} question from {}", self.trivia_source, self.path.display());

        let connection = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(DatabaseError::from)?;

        let row = connection
            .query_row(sql, [], map)
            .optional()
            .map_err(DatabaseError::from)?;

        row.ok_or_else(|| malformed(self.trivia_source, "question set is empty"))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::Connection;
    use tempfile::NamedTempFile;

    /// A temporary question set file built from `statements`.
    pub(crate) fn question_set(statements: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let connection = Connection::open(file.path()).unwrap();
        connection.execute_batch(statements).unwrap();
        file
    }
}
