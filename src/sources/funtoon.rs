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
    fetch_wire, network_client::NetworkClient, QuestionDraft, QuestionSource,
    TriviaQuestionBuilder, WireId,
};

const FUNTOON_URL: &str = "https://funtoon.party/api/trivia/random";

#[derive(Deserialize, Debug)]
struct FuntoonTrivia {
    id: Option<WireId>,
    category: Option<String>,
    clue: String,
    answer: String,
}

pub struct FuntoonQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    network_client: Arc<dyn NetworkClient>,
    url: String,
}

impl FuntoonQuestionSource {
    pub fn new(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
    ) -> FuntoonQuestionSource {
        FuntoonQuestionSource::with_url(builder, network_client, FUNTOON_URL)
    }

    pub fn with_url(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
        url: &str,
    ) -> FuntoonQuestionSource {
        FuntoonQuestionSource {
            builder,
            network_client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl QuestionSource for FuntoonQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::Funtoon
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[TriviaType::QuestionAnswer]
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        info!("Fetching Funtoon trivia question for {}", fetch_options.twitch_channel);

        let trivia: FuntoonTrivia = fetch_wire(
            self.network_client.as_ref(),
            &self.builder,
            TriviaSource::Funtoon,
            &self.url,
            &[],
        )
        .await?;

        let compiler = self.builder.question_compiler();
        let category = compiler.compile_category(trivia.category.as_deref(), false);
        let question = compiler.compile_question(&trivia.clue, false);
        let trivia_id = trivia
            .id
            .and_then(WireId::into_trivia_id)
            .unwrap_or_else(|| generate_trivia_id(&question, category.as_deref(), None));

        self.builder.question_answer(
            QuestionDraft {
                trivia_id,
                trivia_source: TriviaSource::Funtoon,
                difficulty: TriviaDifficulty::Unknown,
                category,
                question,
            },
            vec![compiler.compile_response(&trivia.answer, false)],
        )
    }
}
