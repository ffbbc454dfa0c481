use std::{collections::BTreeSet, sync::Arc};

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

const BONGO_URL: &str = "https://beta-trivia.bongo.best/?limit=1";

#[derive(Deserialize, Debug)]
struct BongoTrivia {
    id: Option<WireId>,
    category: Option<String>,
    difficulty: Option<String>,
    question: String,
    #[serde(rename = "type")]
    trivia_type: String,
    correct_answer: String,
    #[serde(default)]
    incorrect_answers: Vec<String>,
}

pub struct BongoQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    network_client: Arc<dyn NetworkClient>,
    url: String,
}

impl BongoQuestionSource {
    pub fn new(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
    ) -> BongoQuestionSource {
        BongoQuestionSource::with_url(builder, network_client, BONGO_URL)
    }

    pub fn with_url(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
        url: &str,
    ) -> BongoQuestionSource {
        BongoQuestionSource {
            builder,
            network_client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl QuestionSource for BongoQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::Bongo
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[TriviaType::MultipleChoice, TriviaType::TrueFalse]
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        info!("Fetching Bongo trivia question for {}", fetch_options.twitch_channel);

        let trivia: Vec<BongoTrivia> = fetch_wire(
            self.network_client.as_ref(),
            &self.builder,
            TriviaSource::Bongo,
            &self.url,
            &[],
        )
        .await?;

        let trivia = trivia
            .into_iter()
            .next()
            .ok_or_else(|| malformed(TriviaSource::Bongo, "response contained no questions"))?;

        let compiler = self.builder.question_compiler();
        let difficulty = TriviaDifficulty::from_str_or_unknown(trivia.difficulty.as_deref());
        let category = compiler.compile_category(trivia.category.as_deref(), true);
        let question = compiler.compile_question(&trivia.question, true);
        let trivia_id = trivia
            .id
            .and_then(WireId::into_trivia_id)
            .unwrap_or_else(|| {
                generate_trivia_id(&question, category.as_deref(), Some(difficulty.as_str()))
            });

        let trivia_type: TriviaType = trivia
            .trivia_type
            .parse()
            .map_err(|_| malformed(TriviaSource::Bongo, format!("unknown type \"{}\"", trivia.trivia_type)))?;

        let draft = QuestionDraft {
            trivia_id,
            trivia_source: TriviaSource::Bongo,
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
                        TriviaSource::Bongo,
                        format!("bad boolean answer \"{}\"", trivia.correct_answer),
                    )
                })?;
                self.builder.true_false(draft, BTreeSet::from([correct_answer]))
            }
            TriviaType::QuestionAnswer => Err(TriviaError::UnsupportedTriviaType {
                trivia_source: TriviaSource::Bongo,
                trivia_type,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::{
        models::question::QuestionKind,
        sources::test_support::{builder, network_client},
    };

    async fn source_for(body: serde_json::Value) -> (MockServer, BongoQuestionSource) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let url = format!("{}/?limit=1", server.uri());
        let source = BongoQuestionSource::with_url(builder(), network_client(), &url);
        (server, source)
    }

    #[tokio::test]
    async fn multiple_choice_question_is_unescaped_and_sorted() {
        let (_server, source) = source_for(json!([{
            "id": "bongo-1",
            "category": "Entertainment: Music",
            "difficulty": "easy",
            "type": "multiple",
            "question": "Which band wrote &quot;Colors&quot;?",
            "correct_answer": "Between the Buried &amp; Me",
            "incorrect_answers": ["Opeth", "Tool", "Gojira"]
        }]))
        .await;

        let question = source
            .fetch_trivia_question(&TriviaFetchOptions::new("smCharles"))
            .await
            .unwrap();

        assert_eq!(question.trivia_id, "bongo-1");
        assert_eq!(question.question, "Which band wrote \"Colors\"?");
        assert_eq!(question.difficulty, TriviaDifficulty::Easy);
        assert_eq!(question.correct_answers(), vec!["Between the Buried & Me".to_string()]);
        assert_eq!(question.responses().len(), 4);
    }

    #[tokio::test]
    async fn boolean_question_without_id_gets_generated_id() {
        let (_server, source) = source_for(json!([{
            "category": "Science",
            "difficulty": "medium",
            "type": "boolean",
            "question": "The sun is a star.",
            "correct_answer": "True",
            "incorrect_answers": ["False"]
        }]))
        .await;

        let question = source
            .fetch_trivia_question(&TriviaFetchOptions::new("smCharles"))
            .await
            .unwrap();

        assert_eq!(
            question.kind,
            QuestionKind::TrueFalse {
                correct_answers: BTreeSet::from([true])
            }
        );
        assert_eq!(
            question.trivia_id,
            generate_trivia_id("The sun is a star.", Some("Science"), Some("medium"))
        );
    }

    #[tokio::test]
    async fn empty_or_broken_payloads_are_malformed() {
        let (_server, source) = source_for(json!([])).await;
        assert!(matches!(
            source.fetch_trivia_question(&TriviaFetchOptions::new("smCharles")).await,
            Err(TriviaError::MalformedTriviaJson { .. })
        ));

        let (_server, source) = source_for(json!({ "question": 5 })).await;
        assert!(matches!(
            source.fetch_trivia_question(&TriviaFetchOptions::new("smCharles")).await,
            Err(TriviaError::MalformedTriviaJson { .. })
        ));
    }

    #[tokio::test]
    async fn server_error_is_a_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = BongoQuestionSource::with_url(builder(), network_client(), &server.uri());
        let error = source
            .fetch_trivia_question(&TriviaFetchOptions::new("smCharles"))
            .await
            .unwrap_err();

        assert!(matches!(error, TriviaError::GenericTriviaNetwork { .. }));
        assert!(error.is_source_failure());
    }
}
