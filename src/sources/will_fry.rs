use std::sync::Arc;

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
    fetch_wire, malformed, network_client::NetworkClient, QuestionDraft, QuestionSource,
    TriviaQuestionBuilder, WireId,
};

const WILL_FRY_URL: &str = "https://the-trivia-api.com/api/questions?limit=1";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WillFryTrivia {
    id: Option<WireId>,
    category: Option<String>,
    difficulty: Option<String>,
    question: String,
    correct_answer: String,
    #[serde(default)]
    incorrect_answers: Vec<String>,
}

pub struct WillFryQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    network_client: Arc<dyn NetworkClient>,
    url: String,
}

impl WillFryQuestionSource {
    pub fn new(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
    ) -> WillFryQuestionSource {
        WillFryQuestionSource::with_url(builder, network_client, WILL_FRY_URL)
    }

    pub fn with_url(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
        url: &str,
    ) -> WillFryQuestionSource {
        WillFryQuestionSource {
            builder,
            network_client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl QuestionSource for WillFryQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::WillFryTrivia
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[TriviaType::MultipleChoice]
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        info!("Fetching Will Fry trivia question for {}", fetch_options.twitch_channel);

        let trivia: Vec<WillFryTrivia> = fetch_wire(
            self.network_client.as_ref(),
            &self.builder,
            TriviaSource::WillFryTrivia,
            &self.url,
            &[],
        )
        .await?;

        let trivia = trivia.into_iter().next().ok_or_else(|| {
            malformed(TriviaSource::WillFryTrivia, "response contained no questions")
        })?;

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

        self.builder.multiple_choice(
            QuestionDraft {
                trivia_id,
                trivia_source: TriviaSource::WillFryTrivia,
                difficulty,
                category,
                question,
            },
            vec![compiler.compile_response(&trivia.correct_answer, false)],
            compiler.compile_responses(&trivia.incorrect_answers, false),
        )
    }
}
