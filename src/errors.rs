use thiserror::Error;

use crate::models::question::{TriviaSource, TriviaType};

#[derive(Error, Debug)]
pub enum TriviaError {
    #[error("No trivia sources are currently available")]
    NoTriviaSourcesAvailable,

    #[error("Unable to fetch a trivia question after {attempts} attempt(s)")]
    TooManyTriviaFetchAttempts { attempts: u32 },

    #[error("Network error from {trivia_source}: {cause}")]
    GenericTriviaNetwork {
        trivia_source: TriviaSource,
        cause: String,
    },

    #[error("Malformed trivia data from {trivia_source}: {reason}")]
    MalformedTriviaJson {
        trivia_source: TriviaSource,
        reason: String,
    },

    #[error("Trivia type {trivia_type} is not supported by {trivia_source}")]
    UnsupportedTriviaType {
        trivia_source: TriviaSource,
        trivia_type: TriviaType,
    },

    #[error("Trivia question from {trivia_source} has no correct answers")]
    NoTriviaCorrectAnswers { trivia_source: TriviaSource },

    #[error("Bad trivia answer: \"{0}\"")]
    BadTriviaAnswer(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl TriviaError {
    /// Errors that count against a source's stability.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            TriviaError::GenericTriviaNetwork { .. }
                | TriviaError::MalformedTriviaJson { .. }
                | TriviaError::UnsupportedTriviaType { .. }
                | TriviaError::NoTriviaCorrectAnswers { .. }
                | TriviaError::Database(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Request to {url} failed: {cause}")]
    Transport { url: String, cause: String },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} could not be decoded: {cause}")]
    Decode { url: String, cause: String },

    #[error("Network timeout must be within 2..=16 seconds, got {0}")]
    InvalidTimeout(u64),
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database connection is closed")]
    Closed,

    #[error("Stored value is malformed: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Unable to read settings file {path}: {cause}")]
    Io { path: String, cause: std::io::Error },

    #[error("Settings file {path} is not valid JSON: {cause}")]
    Json {
        path: String,
        cause: serde_json::Error,
    },

    #[error("Setting {key} is out of range: {value}")]
    OutOfRange { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Unable to create log file: {0}")]
    Appender(#[from] std::io::Error),

    #[error("Invalid logger configuration: {0}")]
    Config(#[from] log4rs::config::runtime::ConfigErrors),

    #[error("Logger already initialized: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}
