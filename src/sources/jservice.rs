use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use serde::Deserialize;

use crate::{
    errors::TriviaError,
    helpers::{fix_latin1_mojibake, generate_trivia_id},
    models::{
        fetch_options::TriviaFetchOptions,
        question::{Question, TriviaDifficulty, TriviaSource, TriviaType},
    },
};

use super::{
    fetch_wire, malformed, network_client::NetworkClient, QuestionDraft, QuestionSource,
    TriviaQuestionBuilder, WireId,
};

const JSERVICE_URL: &str = "https://jservice.io/api/random?count=1";

#[derive(Deserialize, Debug)]
struct JServiceCategory {
    title: Option<String>,
}

#[derive(Deserialize, Debug)]
struct JServiceTrivia {
    id: Option<WireId>,
    question: String,
    answer: String,
    category: Option<JServiceCategory>,
}

/// Jeopardy clues. Text comes back latin-1 mangled often enough that every
/// field is re-decoded.
pub struct JServiceQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    network_client: Arc<dyn NetworkClient>,
    url: String,
}

impl JServiceQuestionSource {
    pub fn new(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
    ) -> JServiceQuestionSource {
        JServiceQuestionSource::with_url(builder, network_client, JSERVICE_URL)
    }

    pub fn with_url(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
        url: &str,
    ) -> JServiceQuestionSource {
        JServiceQuestionSource {
            builder,
            network_client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl QuestionSource for JServiceQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::JService
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[TriviaType::QuestionAnswer]
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        info!("Fetching J-Service trivia question for {}", fetch_options.twitch_channel);

        let trivia: Vec<JServiceTrivia> = fetch_wire(
            self.network_client.as_ref(),
            &self.builder,
            TriviaSource::JService,
            &self.url,
            &[],
        )
        .await?;

        let trivia = trivia
            .into_iter()
            .next()
            .ok_or_else(|| malformed(TriviaSource::JService, "response contained no clues"))?;

        let compiler = self.builder.question_compiler();
        let category_title = trivia
            .category
            .and_then(|category| category.title)
            .map(|title| fix_latin1_mojibake(&title));
        let category = compiler.compile_category(category_title.as_deref(), false);
        let question = compiler.compile_question(&fix_latin1_mojibake(&trivia.question), false);
        let answer = compiler.compile_response(&fix_latin1_mojibake(&trivia.answer), false);

        let trivia_id = trivia
            .id
            .and_then(WireId::into_trivia_id)
            .unwrap_or_else(|| generate_trivia_id(&question, category.as_deref(), None));

        self.builder.question_answer(
            QuestionDraft {
                trivia_id,
                trivia_source: TriviaSource::JService,
                difficulty: TriviaDifficulty::Unknown,
                category,
                question,
            },
            vec![answer],
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::{
        models::question::QuestionKind,
        sources::test_support::{builder, network_client},
    };

    #[tokio::test]
    async fn clue_is_repaired_and_compiled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/random"))
            .and(query_param("count", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 87411,
                "question": "This PokÃ©mon evolves from Pichu",
                "answer": "<i>Pikachu</i>",
                "category": { "title": "pokÃ©mon" }
            }])))
            .mount(&server)
            .await;

        let url = format!("{}/api/random?count=1", server.uri());
        let source = JServiceQuestionSource::with_url(builder(), network_client(), &url);
        let question = source
            .fetch_trivia_question(&TriviaFetchOptions::new("smCharles"))
            .await
            .unwrap();

        assert_eq!(question.trivia_id, "87411");
        assert_eq!(question.question, "This Pokémon evolves from Pichu");
        assert_eq!(question.category.as_deref(), Some("pokémon"));
        match question.kind {
            QuestionKind::QuestionAnswer {
                correct_answers,
                cleaned_correct_answers,
            } => {
                assert_eq!(correct_answers, vec!["Pikachu".to_string()]);
                assert!(cleaned_correct_answers.contains(&"pikachu".to_string()));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_id_is_generated_from_category_and_question() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "question": "The capital of France",
                "answer": "Paris",
                "category": { "title": "capitals" }
            }])))
            .mount(&server)
            .await;

        let source = JServiceQuestionSource::with_url(builder(), network_client(), &server.uri());
        let question = source
            .fetch_trivia_question(&TriviaFetchOptions::new("smCharles"))
            .await
            .unwrap();

        assert_eq!(
            question.trivia_id,
            generate_trivia_id("The capital of France", Some("capitals"), None)
        );
        assert_eq!(source.supported_trivia_types(), &[TriviaType::QuestionAnswer]);
    }
}
