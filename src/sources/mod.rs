//! Upstream question providers.
//!
//! Every provider decodes its own wire format into private structs and hands a
//! finished [`Question`] back through [`QuestionSource`]. Shared conversion work
//! (text compilation, multiple choice response lists, cleaned answers) lives in
//! [`TriviaQuestionBuilder`].

pub mod bongo;
pub mod funtoon;
pub mod joke;
pub mod jservice;
pub mod lotr;
pub mod millionaire;
pub mod network_client;
pub mod open_trivia_database;
pub mod open_trivia_qa;
pub mod pokemon;
pub mod question_set_file;
pub mod quiz_api;
pub mod trivia_database;
pub mod trivia_question_company;
pub mod will_fry;
pub mod wwtbam;

use std::{collections::BTreeSet, fmt, sync::Arc};

use async_trait::async_trait;
use log::{debug, warn};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    errors::TriviaError,
    handlers::{
        additional_answers_repository::AdditionalTriviaAnswersRepository,
        answer_compiler::TriviaAnswerCompiler, question_compiler::TriviaQuestionCompiler,
    },
    models::{
        fetch_options::TriviaFetchOptions,
        question::{Question, QuestionKind, TriviaDifficulty, TriviaSource, TriviaType},
    },
    settings::TriviaSettingsRepository,
};

use self::network_client::NetworkClient;

#[async_trait]
pub trait QuestionSource: Send + Sync {
    fn trivia_source(&self) -> TriviaSource;

    fn supported_trivia_types(&self) -> &'static [TriviaType];

    /// Whether a fetch can currently succeed at all (question file present, API key set...).
    fn has_question_set_available(&self) -> bool {
        true
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError>;
}

// ============================================================================
// Wire helpers
// ============================================================================

/// Ids arrive as numbers from some providers and strings from others.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub(crate) enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    pub(crate) fn into_trivia_id(self) -> Option<String> {
        let id = match self {
            WireId::Number(number) => number.to_string(),
            WireId::Text(text) => text.trim().to_string(),
        };

        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }
}

/// Fetches `url` and decodes the body into `T`, mapping failures onto the source.
pub(crate) async fn fetch_wire<T: DeserializeOwned>(
    network_client: &dyn NetworkClient,
    builder: &TriviaQuestionBuilder,
    trivia_source: TriviaSource,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<T, TriviaError> {
    let json = network_client
        .get_json(url, headers)
        .await
        .map_err(|error| TriviaError::GenericTriviaNetwork {
            trivia_source,
            cause: error.to_string(),
        })?;

    builder.log_payload(trivia_source, &json);

    serde_json::from_value(json).map_err(|error| TriviaError::MalformedTriviaJson {
        trivia_source,
        reason: error.to_string(),
    })
}

pub(crate) fn malformed(trivia_source: TriviaSource, reason: impl Into<String>) -> TriviaError {
    TriviaError::MalformedTriviaJson {
        trivia_source,
        reason: reason.into(),
    }
}

/// `true`/`false` in any case, as providers spell booleans inside strings.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Correct answers first, then distinct (case-insensitive) distractors up to `max_responses`.
/// Numeric response sets sort by value, everything else alphabetically.
pub fn build_multiple_choice_responses(
    correct_answers: &[String],
    responses: &[String],
    max_responses: usize,
) -> Vec<String> {
    let mut filtered: Vec<String> = correct_answers
        .iter()
        .map(|answer| answer.trim().to_string())
        .filter(|answer| !answer.is_empty())
        .collect();

    for response in responses {
        if filtered.len() >= max_responses {
            break;
        }

        let response = response.trim();
        if response.is_empty() {
            continue;
        }

        if !filtered
            .iter()
            .any(|existing| existing.to_lowercase() == response.to_lowercase())
        {
            filtered.push(response.to_string());
        }
    }

    if filtered.iter().all(|response| response.parse::<i64>().is_ok()) {
        filtered.sort_by_key(|response| response.parse::<i64>().unwrap_or_default());
    } else {
        filtered.sort_by_key(|response| response.to_lowercase());
    }

    filtered
}

fn is_true_false_responses(responses: &[String]) -> bool {
    responses.len() == 2
        && responses.iter().any(|response| parse_bool(response) == Some(true))
        && responses.iter().any(|response| parse_bool(response) == Some(false))
}

// ============================================================================
// Question builder
// ============================================================================

/// The parts every question has, whatever its kind.
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub trivia_id: String,
    pub trivia_source: TriviaSource,
    pub difficulty: TriviaDifficulty,
    pub category: Option<String>,
    pub question: String,
}

pub struct TriviaQuestionBuilder {
    settings: Arc<TriviaSettingsRepository>,
    question_compiler: TriviaQuestionCompiler,
    answer_compiler: TriviaAnswerCompiler,
    additional_answers: Option<Arc<AdditionalTriviaAnswersRepository>>,
}

impl TriviaQuestionBuilder {
    pub fn new(settings: Arc<TriviaSettingsRepository>) -> TriviaQuestionBuilder {
        TriviaQuestionBuilder {
            settings,
            question_compiler: TriviaQuestionCompiler::new(),
            answer_compiler: TriviaAnswerCompiler::new(),
            additional_answers: None,
        }
    }

    /// Question/answer questions will also accept answers stored in `repository`.
    pub fn with_additional_answers(
        mut self,
        repository: Arc<AdditionalTriviaAnswersRepository>,
    ) -> TriviaQuestionBuilder {
        self.additional_answers = Some(repository);
        self
    }

    pub fn question_compiler(&self) -> &TriviaQuestionCompiler {
        &self.question_compiler
    }

    pub(crate) fn log_payload(&self, trivia_source: TriviaSource, payload: &impl fmt::Debug) {
        let debug_logging_enabled = self
            .settings
            .get()
            .map(|settings| settings.debug_logging_enabled)
            .unwrap_or(false);

        if debug_logging_enabled {
            debug!("{} payload: {:?}", trivia_source, payload);
        }
    }

    /// Builds a multiple choice question, or a true/false one when the responses
    /// turn out to be exactly "true" and "false".
    pub fn multiple_choice(
        &self,
        draft: QuestionDraft,
        correct_answers: Vec<String>,
        incorrect_answers: Vec<String>,
    ) -> Result<Question, TriviaError> {
        if correct_answers.iter().all(|answer| answer.trim().is_empty()) {
            return Err(TriviaError::NoTriviaCorrectAnswers {
                trivia_source: draft.trivia_source,
            });
        }

        let max_responses = self.settings.get()?.max_multiple_choice_responses;
        let responses =
            build_multiple_choice_responses(&correct_answers, &incorrect_answers, max_responses);

        if is_true_false_responses(&responses) {
            let correct_answers: BTreeSet<bool> = correct_answers
                .iter()
                .filter_map(|answer| parse_bool(answer))
                .collect();
            return self.true_false(draft, correct_answers);
        }

        let correct_answers: Vec<String> = correct_answers
            .iter()
            .map(|answer| answer.trim().to_string())
            .filter(|answer| !answer.is_empty())
            .collect();
        let kind = QuestionKind::multiple_choice(&correct_answers, responses)?;

        self.finish(draft, kind)
    }

    pub fn true_false(
        &self,
        draft: QuestionDraft,
        correct_answers: BTreeSet<bool>,
    ) -> Result<Question, TriviaError> {
        self.finish(draft, QuestionKind::TrueFalse { correct_answers })
    }

    /// Builds a question/answer question with its cleaned and numeral-expanded answers.
    pub fn question_answer(
        &self,
        draft: QuestionDraft,
        correct_answers: Vec<String>,
    ) -> Result<Question, TriviaError> {
        let mut correct_answers: Vec<String> = correct_answers
            .into_iter()
            .filter(|answer| !answer.trim().is_empty())
            .collect();

        if let Some(repository) = &self.additional_answers {
            match repository.get_additional_answers(
                &draft.trivia_id,
                draft.trivia_source,
                TriviaType::QuestionAnswer,
            ) {
                Ok(additional_answers) => {
                    if !additional_answers.is_empty() {
                        debug!(
                            "Adding additional answers to {}:{}: {:?}",
                            draft.trivia_source, draft.trivia_id, additional_answers
                        );
                    }
                    for answer in additional_answers {
                        if !correct_answers
                            .iter()
                            .any(|existing| existing.to_lowercase() == answer.to_lowercase())
                        {
                            correct_answers.push(answer);
                        }
                    }
                }
                Err(error) => warn!(
                    "Unable to read additional answers for {}:{}: {}",
                    draft.trivia_source, draft.trivia_id, error
                ),
            }
        }

        if correct_answers.is_empty() {
            return Err(TriviaError::NoTriviaCorrectAnswers {
                trivia_source: draft.trivia_source,
            });
        }

        let cleaned_correct_answers: Vec<String> = self
            .answer_compiler
            .compile_cleaned_correct_answers(&correct_answers)
            .into_iter()
            .filter(|answer| !answer.is_empty())
            .collect();

        self.log_payload(draft.trivia_source, &cleaned_correct_answers);

        self.finish(
            draft,
            QuestionKind::QuestionAnswer {
                correct_answers,
                cleaned_correct_answers,
            },
        )
    }

    fn finish(&self, draft: QuestionDraft, kind: QuestionKind) -> Result<Question, TriviaError> {
        Question::new(
            draft.trivia_id,
            draft.trivia_source,
            draft.difficulty,
            draft.category,
            draft.question,
            kind,
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::settings::TriviaSettings;

    pub(crate) fn builder() -> Arc<TriviaQuestionBuilder> {
        Arc::new(TriviaQuestionBuilder::new(Arc::new(
            TriviaSettingsRepository::from_settings(TriviaSettings::default()),
        )))
    }

    pub(crate) fn network_client() -> Arc<dyn NetworkClient> {
        Arc::new(network_client::ReqwestNetworkClient::new(4).unwrap())
    }
}
