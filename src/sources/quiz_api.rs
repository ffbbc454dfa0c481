use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use log::info;
use serde::Deserialize;

use crate::{
    errors::TriviaError,
    helpers::generate_trivia_id,
    models::{
        fetch_options::TriviaFetchOptions,
        question::{Question, TriviaDifficulty, TriviaSource, TriviaType},
    },
};

use super::{
    fetch_wire, malformed, network_client::NetworkClient, parse_bool, QuestionDraft,
    QuestionSource, TriviaQuestionBuilder, WireId,
};

const QUIZ_API_URL: &str = "https://quizapi.io/api/v1/questions?limit=1";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:97.0) Gecko/20100101 Firefox/97.0";

#[derive(Deserialize, Debug)]
struct QuizApiTrivia {
    id: Option<WireId>,
    question: String,
    category: Option<String>,
    difficulty: Option<String>,
    answers: BTreeMap<String, Option<String>>,
    correct_answers: BTreeMap<String, Option<String>>,
}

/// quizapi.io. Needs an API key; without one the source reports no question set.
pub struct QuizApiQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    network_client: Arc<dyn NetworkClient>,
    api_key: Option<String>,
    url: String,
}

impl QuizApiQuestionSource {
    pub fn new(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
        api_key: Option<String>,
    ) -> QuizApiQuestionSource {
        QuizApiQuestionSource::with_url(builder, network_client, api_key, QUIZ_API_URL)
    }

    pub fn with_url(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
        api_key: Option<String>,
        url: &str,
    ) -> QuizApiQuestionSource {
        QuizApiQuestionSource {
            builder,
            network_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl QuestionSource for QuizApiQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::QuizApi
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[TriviaType::MultipleChoice, TriviaType::TrueFalse]
    }

    fn has_question_set_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        info!("Fetching Quiz API trivia question for {}", fetch_options.twitch_channel);

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TriviaError::GenericTriviaNetwork {
                trivia_source: TriviaSource::QuizApi,
                cause: "no API key configured".to_string(),
            })?;

        let trivia: Vec<QuizApiTrivia> = fetch_wire(
            self.network_client.as_ref(),
            &self.builder,
            TriviaSource::QuizApi,
            &self.url,
            &[("X-Api-Key", api_key), ("User-Agent", USER_AGENT)],
        )
        .await?;

        let trivia = trivia
            .into_iter()
            .next()
            .ok_or_else(|| malformed(TriviaSource::QuizApi, "response contained no questions"))?;

        if trivia.answers.is_empty() || trivia.answers.len() != trivia.correct_answers.len() {
            return Err(malformed(
                TriviaSource::QuizApi,
                "answers and correct_answers do not line up",
            ));
        }

        let compiler = self.builder.question_compiler();
        let difficulty = TriviaDifficulty::from_str_or_unknown(trivia.difficulty.as_deref());
        let category = compiler.compile_category(trivia.category.as_deref(), false);
        let question = compiler.compile_question(&trivia.question, false);
        let trivia_id = trivia
            .id
            .and_then(WireId::into_trivia_id)
            .unwrap_or_else(|| {
                generate_trivia_id(&question, category.as_deref(), Some(difficulty.as_str()))
            });

        let mut correct_answers = Vec::new();
        let mut responses = Vec::new();

        for ((_, answer), (_, is_correct)) in trivia.answers.iter().zip(trivia.correct_answers.iter()) {
            let answer = match answer {
                Some(answer) => compiler.compile_response(answer, false),
                None => continue,
            };
            if answer.is_empty() {
                continue;
            }

            if is_correct.as_deref().and_then(parse_bool) == Some(true) {
                correct_answers.push(answer.clone());
            }
            responses.push(answer);
        }

        if correct_answers.is_empty() {
            return Err(TriviaError::NoTriviaCorrectAnswers {
                trivia_source: TriviaSource::QuizApi,
            });
        }

        self.builder.multiple_choice(
            QuestionDraft {
                trivia_id,
                trivia_source: TriviaSource::QuizApi,
                difficulty,
                category,
                question,
            },
            correct_answers,
            responses,
        )
    }
}
