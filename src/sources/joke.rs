use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use log::info;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::{
    errors::TriviaError,
    models::{
        fetch_options::TriviaFetchOptions,
        question::{Question, TriviaDifficulty, TriviaSource, TriviaType},
    },
};

use super::{malformed, parse_bool, QuestionDraft, QuestionSource, TriviaQuestionBuilder};

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum JokeAnswer {
    Bool(bool),
    Text(String),
}

impl JokeAnswer {
    fn as_text(&self) -> String {
        match self {
            JokeAnswer::Bool(value) => value.to_string(),
            JokeAnswer::Text(text) => text.clone(),
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            JokeAnswer::Bool(value) => Some(*value),
            JokeAnswer::Text(text) => parse_bool(text),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct JokeTrivia {
    id: String,
    category: Option<String>,
    difficulty: Option<String>,
    question: String,
    #[serde(rename = "type")]
    trivia_type: String,
    correct_answers: Vec<JokeAnswer>,
    #[serde(default)]
    responses: Vec<String>,
    #[serde(default)]
    compatible_with: Vec<String>,
}

impl JokeTrivia {
    /// No allow-list means every channel may get this question.
    fn is_compatible_with(&self, twitch_channel: &str) -> bool {
        self.compatible_with.is_empty()
            || self
                .compatible_with
                .iter()
                .any(|channel| channel.eq_ignore_ascii_case(twitch_channel))
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JokeTriviaFile {
    #[serde(default)]
    trivia_questions: Vec<JokeTrivia>,
}

/// Hand written questions kept in a local JSON file, optionally restricted to
/// particular channels.
pub struct JokeQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    joke_trivia_file: PathBuf,
}

impl JokeQuestionSource {
    pub fn new(builder: Arc<TriviaQuestionBuilder>, joke_trivia_file: impl AsRef<Path>) -> JokeQuestionSource {
        JokeQuestionSource {
            builder,
            joke_trivia_file: joke_trivia_file.as_ref().to_path_buf(),
        }
    }

    async fn read_questions(&self) -> Result<Vec<JokeTrivia>, TriviaError> {
        let contents = tokio::fs::read_to_string(&self.joke_trivia_file)
            .await
            .map_err(|error| {
                malformed(
                    TriviaSource::JokeTriviaRepository,
                    format!("unable to read {}: {}", self.joke_trivia_file.display(), error),
                )
            })?;

        let file: JokeTriviaFile = serde_json::from_str(&contents).map_err(|error| {
            malformed(TriviaSource::JokeTriviaRepository, error.to_string())
        })?;

        Ok(file.trivia_questions)
    }
}

#[async_trait]
impl QuestionSource for JokeQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::JokeTriviaRepository
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[
            TriviaType::MultipleChoice,
            TriviaType::QuestionAnswer,
            TriviaType::TrueFalse,
        ]
    }

    fn has_question_set_available(&self) -> bool {
        self.joke_trivia_file.is_file()
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        let twitch_channel = fetch_options.twitch_channel.as_str();
        info!("Fetching joke trivia question for {}", twitch_channel);

        let compatible: Vec<JokeTrivia> = self
            .read_questions()
            .await?
            .into_iter()
            .filter(|trivia| trivia.is_compatible_with(twitch_channel))
            .collect();

        let trivia = compatible
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| {
                malformed(
                    TriviaSource::JokeTriviaRepository,
                    format!("no joke trivia question is compatible with {}", twitch_channel),
                )
            })?;

        self.builder.log_payload(TriviaSource::JokeTriviaRepository, &trivia);

        let trivia_type: TriviaType = trivia.trivia_type.parse().map_err(|_| {
            malformed(
                TriviaSource::JokeTriviaRepository,
                format!("unknown type \"{}\"", trivia.trivia_type),
            )
        })?;

        let compiler = self.builder.question_compiler();
        let draft = QuestionDraft {
            trivia_id: trivia.id.clone(),
            trivia_source: TriviaSource::JokeTriviaRepository,
            difficulty: TriviaDifficulty::from_str_or_unknown(trivia.difficulty.as_deref()),
            category: compiler.compile_category(trivia.category.as_deref(), false),
            question: compiler.compile_question(&trivia.question, false),
        };

        let correct_answers: Vec<String> = trivia
            .correct_answers
            .iter()
            .map(JokeAnswer::as_text)
            .collect();

        match trivia_type {
            TriviaType::MultipleChoice => self.builder.multiple_choice(
                draft,
                compiler.compile_responses(&correct_answers, false),
                compiler.compile_responses(&trivia.responses, false),
            ),
            TriviaType::QuestionAnswer => self
                .builder
                .question_answer(draft, compiler.compile_responses(&correct_answers, false)),
            TriviaType::TrueFalse => {
                let correct_answers: BTreeSet<bool> = trivia
                    .correct_answers
                    .iter()
                    .filter_map(JokeAnswer::as_bool)
                    .collect();
                self.builder.true_false(draft, correct_answers)
            }
        }
    }
}
