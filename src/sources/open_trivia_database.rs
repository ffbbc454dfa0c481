use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use log::{info, warn};
use serde::Deserialize;

use crate::{
    errors::TriviaError,
    handlers::session_token_repository::OpenTriviaDatabaseSessionTokenRepository,
    helpers::generate_trivia_id,
    models::{
        fetch_options::TriviaFetchOptions,
        question::{Question, TriviaDifficulty, TriviaSource, TriviaType},
    },
};

use super::{
    fetch_wire, malformed, network_client::NetworkClient, parse_bool, QuestionDraft,
    QuestionSource, TriviaQuestionBuilder,
};

const OPEN_TRIVIA_DATABASE_URL: &str = "https://opentdb.com";

#[derive(Deserialize, Debug)]
struct SessionTokenResponse {
    response_code: i64,
    token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OpenTriviaDatabaseResponse {
    response_code: i64,
    #[serde(default)]
    results: Vec<OpenTriviaDatabaseTrivia>,
}

#[derive(Deserialize, Debug)]
struct OpenTriviaDatabaseTrivia {
    category: Option<String>,
    difficulty: Option<String>,
    question: String,
    #[serde(rename = "type")]
    trivia_type: String,
    correct_answer: String,
    #[serde(default)]
    incorrect_answers: Vec<String>,
}

/// Questions from opentdb.com. A session token per channel keeps the API from
/// serving the same question twice; a rejected token is dropped and the fetch
/// retried without one.
pub struct OpenTriviaDatabaseQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    network_client: Arc<dyn NetworkClient>,
    session_tokens: Arc<OpenTriviaDatabaseSessionTokenRepository>,
    base_url: String,
}

impl OpenTriviaDatabaseQuestionSource {
    pub fn new(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
        session_tokens: Arc<OpenTriviaDatabaseSessionTokenRepository>,
    ) -> OpenTriviaDatabaseQuestionSource {
        OpenTriviaDatabaseQuestionSource::with_base_url(
            builder,
            network_client,
            session_tokens,
            OPEN_TRIVIA_DATABASE_URL,
        )
    }

    pub fn with_base_url(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
        session_tokens: Arc<OpenTriviaDatabaseSessionTokenRepository>,
        base_url: &str,
    ) -> OpenTriviaDatabaseQuestionSource {
        OpenTriviaDatabaseQuestionSource {
            builder,
            network_client,
            session_tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn session_token(&self, twitch_channel: &str) -> Result<Option<String>, TriviaError> {
        if let Some(token) = self.session_tokens.get(twitch_channel)? {
            return Ok(Some(token));
        }

        let url = format!("{}/api_token.php?command=request", self.base_url);
        let response: SessionTokenResponse = match fetch_wire(
            self.network_client.as_ref(),
            &self.builder,
            TriviaSource::OpenTriviaDatabase,
            &url,
            &[],
        )
        .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!("Unable to fetch Open Trivia Database session token: {}", error);
                return Ok(None);
            }
        };

        match response.token {
            Some(token) if response.response_code == 0 && !token.trim().is_empty() => {
                self.session_tokens.update(&token, twitch_channel)?;
                info!("Stored new Open Trivia Database session token for {}", twitch_channel);
                Ok(Some(token))
            }
            _ => {
                warn!(
                    "Open Trivia Database refused a session token (response_code {})",
                    response.response_code
                );
                Ok(None)
            }
        }
    }

    async fn fetch_response(&self, token: Option<&str>) -> Result<OpenTriviaDatabaseResponse, TriviaError> {
        let url = match token {
            Some(token) => format!("{}/api.php?amount=1&token={}", self.base_url, token),
            None => format!("{}/api.php?amount=1", self.base_url),
        };

        fetch_wire(
            self.network_client.as_ref(),
            &self.builder,
            TriviaSource::OpenTriviaDatabase,
            &url,
            &[],
        )
        .await
    }

    fn build_question(&self, trivia: OpenTriviaDatabaseTrivia) -> Result<Question, TriviaError> {
        let compiler = self.builder.question_compiler();
        let difficulty = TriviaDifficulty::from_str_or_unknown(trivia.difficulty.as_deref());
        let category = compiler.compile_category(trivia.category.as_deref(), true);
        let question = compiler.compile_question(&trivia.question, true);
        let trivia_id =
            generate_trivia_id(&question, category.as_deref(), Some(difficulty.as_str()));

        let trivia_type: TriviaType = trivia.trivia_type.parse().map_err(|_| {
            malformed(
                TriviaSource::OpenTriviaDatabase,
                format!("unknown type \"{}\"", trivia.trivia_type),
            )
        })?;

        let draft = QuestionDraft {
            trivia_id,
            trivia_source: TriviaSource::OpenTriviaDatabase,
            difficulty,
            category,
            question,
        };

        match trivia_type {
            TriviaType::MultipleChoice => self.builder.multiple_choice(
                draft,
                vec![compiler.compile_response(&trivia.correct_answer, true)],
                compiler.compile_responses(&trivia.incorrect_answers, true),
            ),
            TriviaType::TrueFalse => {
                let correct_answer = parse_bool(&trivia.correct_answer).ok_or_else(|| {
                    malformed(
                        TriviaSource::OpenTriviaDatabase,
                        format!("bad boolean answer \"{}\"", trivia.correct_answer),
                    )
                })?;
                self.builder.true_false(draft, BTreeSet::from([correct_answer]))
            }
            TriviaType::QuestionAnswer => Err(TriviaError::UnsupportedTriviaType {
                trivia_source: TriviaSource::OpenTriviaDatabase,
                trivia_type,
            }),
        }
    }
}

#[async_trait]
impl QuestionSource for OpenTriviaDatabaseQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::OpenTriviaDatabase
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[TriviaType::MultipleChoice, TriviaType::TrueFalse]
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        let twitch_channel = fetch_options.twitch_channel.as_str();
        info!("Fetching Open Trivia Database question for {}", twitch_channel);

        let token = self.session_token(twitch_channel).await?;
        let mut response = self.fetch_response(token.as_deref()).await?;

        if response.response_code != 0 && token.is_some() {
            warn!(
                "Open Trivia Database rejected the session token for {} (response_code {}), retrying without one",
                twitch_channel, response.response_code
            );
            self.session_tokens.remove(twitch_channel)?;
            response = self.fetch_response(None).await?;
        }

        if response.response_code != 0 {
            return Err(malformed(
                TriviaSource::OpenTriviaDatabase,
                format!("response_code {}", response.response_code),
            ));
        }

        let trivia = response.results.into_iter().next().ok_or_else(|| {
            malformed(TriviaSource::OpenTriviaDatabase, "response contained no results")
        })?;

        self.build_question(trivia)
    }
}
