use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use rand::{seq::SliceRandom, Rng};
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
    TriviaQuestionBuilder,
};

const POKE_API_URL: &str = "https://pokeapi.co/api/v2";

const CATEGORY: &str = "Pokémon";

/// Moves up to the end of generation three.
const MAX_MOVE_ID: u32 = 354;

const MAX_NATURE_ID: u32 = 25;

const NONE_OF_THESE: &str = "None of these";

const ELEMENT_TYPES: [&str; 18] = [
    "Bug", "Dark", "Dragon", "Electric", "Fairy", "Fighting", "Fire", "Flying", "Ghost", "Grass",
    "Ground", "Ice", "Normal", "Poison", "Psychic", "Rock", "Steel", "Water",
];

const BERRY_FLAVORS: [&str; 5] = ["Bitter", "Dry", "Sour", "Spicy", "Sweet"];

#[derive(Deserialize, Debug)]
struct NamedResource {
    name: String,
}

#[derive(Deserialize, Debug)]
struct LocalizedName {
    name: String,
    language: NamedResource,
}

#[derive(Deserialize, Debug)]
struct PokeApiMove {
    name: String,
    #[serde(default)]
    names: Vec<LocalizedName>,
    #[serde(rename = "type")]
    element_type: NamedResource,
}

#[derive(Deserialize, Debug)]
struct PokeApiNature {
    name: String,
    #[serde(default)]
    names: Vec<LocalizedName>,
    likes_flavor: Option<NamedResource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PokemonQuestion {
    MoveType(u32),
    NatureFlavor(u32),
}

fn pick_question() -> PokemonQuestion {
    let mut rng = rand::thread_rng();
    if rng.gen_bool(0.5) {
        PokemonQuestion::MoveType(rng.gen_range(1..=MAX_MOVE_ID))
    } else {
        PokemonQuestion::NatureFlavor(rng.gen_range(1..=MAX_NATURE_ID))
    }
}

/// `thunder-punch` -> `Thunder Punch`
fn title_case(name: &str) -> String {
    name.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut characters = word.chars();
            match characters.next() {
                Some(first) => first.to_uppercase().chain(characters).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn english_name(names: &[LocalizedName], fallback: &str) -> String {
    names
        .iter()
        .find(|name| name.language.name == "en")
        .map(|name| name.name.clone())
        .unwrap_or_else(|| title_case(fallback))
}

/// Distractors drawn from `pool`, never equal to `correct_answer`.
fn distractors(pool: &[&str], correct_answer: &str, amount: usize) -> Vec<String> {
    let mut candidates: Vec<String> = pool
        .iter()
        .filter(|candidate| !candidate.eq_ignore_ascii_case(correct_answer))
        .map(|candidate| candidate.to_string())
        .collect();
    candidates.shuffle(&mut rand::thread_rng());
    candidates.truncate(amount);
    candidates
}

/// Questions generated from PokeAPI data: move types and nature flavor preferences.
pub struct PokemonQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    network_client: Arc<dyn NetworkClient>,
    base_url: String,
}

impl PokemonQuestionSource {
    pub fn new(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
    ) -> PokemonQuestionSource {
        PokemonQuestionSource::with_base_url(builder, network_client, POKE_API_URL)
    }

    pub fn with_base_url(
        builder: Arc<TriviaQuestionBuilder>,
        network_client: Arc<dyn NetworkClient>,
        base_url: &str,
    ) -> PokemonQuestionSource {
        PokemonQuestionSource {
            builder,
            network_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn draft(&self, question: String) -> QuestionDraft {
        QuestionDraft {
            trivia_id: generate_trivia_id(&question, Some(CATEGORY), None),
            trivia_source: TriviaSource::Pokemon,
            difficulty: TriviaDifficulty::Unknown,
            category: Some(CATEGORY.to_string()),
            question,
        }
    }

    async fn fetch_move_type_question(&self, move_id: u32) -> Result<Question, TriviaError> {
        let url = format!("{}/move/{}", self.base_url, move_id);
        let pokemon_move: PokeApiMove = fetch_wire(
            self.network_client.as_ref(),
            &self.builder,
            TriviaSource::Pokemon,
            &url,
            &[],
        )
        .await?;

        let move_name = english_name(&pokemon_move.names, &pokemon_move.name);
        let correct_answer = title_case(&pokemon_move.element_type.name);

        self.builder.multiple_choice(
            self.draft(format!("In Pokémon, what type is the move {}?", move_name)),
            vec![correct_answer.clone()],
            distractors(&ELEMENT_TYPES, &correct_answer, 3),
        )
    }

    async fn fetch_nature_flavor_question(&self, nature_id: u32) -> Result<Question, TriviaError> {
        let url = format!("{}/nature/{}", self.base_url, nature_id);
        let nature: PokeApiNature = fetch_wire(
            self.network_client.as_ref(),
            &self.builder,
            TriviaSource::Pokemon,
            &url,
            &[],
        )
        .await?;

        let nature_name = english_name(&nature.names, &nature.name);
        let question = format!(
            "In Pokémon, which berry flavor does a Pokémon with the {} nature like?",
            nature_name
        );

        match nature.likes_flavor {
            Some(flavor) => {
                let correct_answer = title_case(&flavor.name);
                let mut incorrect_answers = distractors(&BERRY_FLAVORS, &correct_answer, 3);
                incorrect_answers.push(NONE_OF_THESE.to_string());
                self.builder
                    .multiple_choice(self.draft(question), vec![correct_answer], incorrect_answers)
            }
            None => self.builder.multiple_choice(
                self.draft(question),
                vec![NONE_OF_THESE.to_string()],
                distractors(&BERRY_FLAVORS, NONE_OF_THESE, 3),
            ),
        }
    }
}

#[async_trait]
impl QuestionSource for PokemonQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::Pokemon
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[TriviaType::MultipleChoice]
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        let pick = pick_question();
        info!(
            "Fetching Pokémon trivia question ({:?}) for {}",
            pick, fetch_options.twitch_channel
        );

        match pick {
            PokemonQuestion::MoveType(move_id) => self.fetch_move_type_question(move_id).await,
            PokemonQuestion::NatureFlavor(nature_id) => {
                self.fetch_nature_flavor_question(nature_id).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, path_regex},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::sources::test_support::{builder, network_client};

    #[test]
    fn names_are_title_cased() {
        assert_eq!(title_case("thunder-punch"), "Thunder Punch");
        assert_eq!(title_case("psychic"), "Psychic");
        assert_eq!(english_name(&[], "double-edge"), "Double Edge");
    }

    #[tokio::test]
    async fn move_type_question_uses_english_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/move/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 9,
                "name": "thunder-punch",
                "names": [
                    { "name": "Donnerschlag", "language": { "name": "de" } },
                    { "name": "Thunder Punch", "language": { "name": "en" } }
                ],
                "type": { "name": "electric" }
            })))
            .mount(&server)
            .await;

        let source = PokemonQuestionSource::with_base_url(builder(), network_client(), &server.uri());
        let question = source.fetch_move_type_question(9).await.unwrap();

        assert_eq!(question.question, "In Pokémon, what type is the move Thunder Punch?");
        assert_eq!(question.correct_answers(), vec!["Electric".to_string()]);
        assert_eq!(question.responses().len(), 4);
        assert_eq!(question.category.as_deref(), Some(CATEGORY));
    }

    #[tokio::test]
    async fn neutral_nature_answers_none_of_these() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nature/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "name": "hardy",
                "names": [],
                "likes_flavor": null,
                "hates_flavor": null
            })))
            .mount(&server)
            .await;

        let source = PokemonQuestionSource::with_base_url(builder(), network_client(), &server.uri());
        let question = source.fetch_nature_flavor_question(1).await.unwrap();

        assert!(question.question.contains("Hardy nature"));
        assert_eq!(question.correct_answers(), vec![NONE_OF_THESE.to_string()]);
        assert_eq!(question.responses().len(), 4);
    }

    #[tokio::test]
    async fn random_question_is_multiple_choice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/move/\d+$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "tackle",
                "type": { "name": "normal" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/nature/\d+$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "modest",
                "likes_flavor": { "name": "dry" }
            })))
            .mount(&server)
            .await;

        let source = PokemonQuestionSource::with_base_url(builder(), network_client(), &server.uri());
        let question = source
            .fetch_trivia_question(&TriviaFetchOptions::new("smCharles"))
            .await
            .unwrap();

        assert_eq!(question.trivia_type(), TriviaType::MultipleChoice);
        assert_eq!(question.trivia_source, TriviaSource::Pokemon);
    }
}
