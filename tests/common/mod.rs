#![allow(dead_code)]

use std::{
    collections::{BTreeSet, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::Utc;
use trivia_engine::{
    clock::{Clock, ManualClock},
    errors::TriviaError,
    handlers::{
        answer_checker::TriviaAnswerChecker,
        answer_compiler::TriviaAnswerCompiler,
        banned_trivia_ids_repository::BannedTriviaIdsRepository,
        banned_words_repository::BannedWordsRepository,
        content_scanner::TriviaContentScanner,
        cooldown_helper::SuperTriviaCooldownHelper,
        emote_generator::TriviaEmoteGenerator,
        game_machine::{TriviaActionSubmitter, TriviaEventListener, TriviaGameMachine},
        history_repository::TriviaHistoryRepository,
        instability_helper::TriviaSourceInstabilityHelper,
        queued_game_store::QueuedTriviaGameStore,
        score_repository::TriviaScoreRepository,
        special_status::{ShinyTriviaHelper, ToxicTriviaHelper},
        trivia_repository::TriviaRepository,
        trivia_verifier::TriviaVerifier,
    },
    models::{
        actions::TriviaAction,
        events::TriviaEvent,
        fetch_options::TriviaFetchOptions,
        question::{Question, QuestionKind, TriviaDifficulty, TriviaSource, TriviaType},
    },
    settings::{TriviaSettings, TriviaSettingsRepository, TriviaSourceSettings},
    sources::QuestionSource,
    storage::backing_database::BackingDatabase,
};

pub const CHANNEL: &str = "smCharles";

/// Serves the questions it was given, in order. Runs dry with a malformed error.
pub struct ScriptedQuestionSource {
    questions: Mutex<VecDeque<Question>>,
}

impl ScriptedQuestionSource {
    pub fn new() -> ScriptedQuestionSource {
        ScriptedQuestionSource {
            questions: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, question: Question) {
        self.questions.lock().unwrap().push_back(question);
    }

    pub fn remaining(&self) -> usize {
        self.questions.lock().unwrap().len()
    }
}

#[async_trait]
impl QuestionSource for ScriptedQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::Bongo
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[
            TriviaType::MultipleChoice,
            TriviaType::QuestionAnswer,
            TriviaType::TrueFalse,
        ]
    }

    async fn fetch_trivia_question(
        &self,
        _fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        self.questions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TriviaError::MalformedTriviaJson {
                trivia_source: TriviaSource::Bongo,
                reason: "script is empty".to_string(),
            })
    }
}

#[derive(Default)]
pub struct CollectingListener {
    events: Mutex<Vec<TriviaEvent>>,
}

impl CollectingListener {
    pub fn take(&self) -> Vec<TriviaEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

#[async_trait]
impl TriviaEventListener for CollectingListener {
    async fn on_new_trivia_event(&self, event: TriviaEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Shiny/toxic decisions fixed up front; toxic punishments are recorded.
#[derive(Default)]
pub struct FixedSpecialStatus {
    pub shiny: bool,
    pub toxic: bool,
    pub punishments: Mutex<Vec<(String, Vec<String>, u32)>>,
}

impl ShinyTriviaHelper for FixedSpecialStatus {
    fn is_shiny_trivia_question(&self, _twitch_channel: &str) -> bool {
        self.shiny
    }
}

impl ToxicTriviaHelper for FixedSpecialStatus {
    fn is_toxic_trivia_question(&self, _twitch_channel: &str) -> bool {
        self.toxic
    }

    fn apply_toxic_punishment(
        &self,
        _twitch_channel: &str,
        winner_user_id: &str,
        punished_user_ids: &[String],
        punishment_points: u32,
    ) {
        self.punishments.lock().unwrap().push((
            winner_user_id.to_string(),
            punished_user_ids.to_vec(),
            punishment_points,
        ));
    }
}

pub fn settings() -> TriviaSettings {
    TriviaSettings {
        trivia_sources: [(
            "bongo".to_string(),
            TriviaSourceSettings {
                is_enabled: true,
                weight: 1,
            },
        )]
        .into_iter()
        .collect(),
        retry_sleep_seconds: 0.0,
        super_trivia_cooldown_seconds: 30,
        max_super_game_queue_size: 5,
        levenshtein_threshold_fraction: 0.2,
        max_trivia_question_spool_size: 0,
        max_super_trivia_question_spool_size: 0,
        ..TriviaSettings::default()
    }
}

pub struct TestRepository {
    pub repository: TriviaRepository,
    pub source: Arc<ScriptedQuestionSource>,
    pub banned_trivia_ids: Arc<BannedTriviaIdsRepository>,
    pub database: Arc<BackingDatabase>,
    pub settings: Arc<TriviaSettingsRepository>,
}

pub fn repository(settings: TriviaSettings, clock: Arc<dyn Clock>) -> TestRepository {
    let database = Arc::new(BackingDatabase::open_in_memory().unwrap());
    let settings = Arc::new(TriviaSettingsRepository::from_settings(settings));
    let source = Arc::new(ScriptedQuestionSource::new());
    let banned_trivia_ids = Arc::new(BannedTriviaIdsRepository::new(database.clone()).unwrap());

    let verifier = TriviaVerifier::new(
        banned_trivia_ids.clone(),
        Arc::new(TriviaContentScanner::new(
            Arc::new(BannedWordsRepository::empty()),
            settings.clone(),
        )),
        Arc::new(
            TriviaHistoryRepository::new(database.clone(), settings.clone(), clock.clone())
                .unwrap(),
        ),
    );

    let repository = TriviaRepository::new(
        settings.clone(),
        Arc::new(TriviaSourceInstabilityHelper::new(clock)),
        Arc::new(TriviaEmoteGenerator::new(database.clone()).unwrap()),
        verifier,
    )
    .with_source(source.clone());

    TestRepository {
        repository,
        source,
        banned_trivia_ids,
        database,
        settings,
    }
}

pub struct TestEngine {
    pub machine: TriviaGameMachine,
    pub submitter: TriviaActionSubmitter,
    pub listener: Arc<CollectingListener>,
    pub clock: Arc<ManualClock>,
    pub source: Arc<ScriptedQuestionSource>,
    pub scores: Arc<TriviaScoreRepository>,
    pub special_status: Arc<FixedSpecialStatus>,
    pub database: Arc<BackingDatabase>,
}

impl TestEngine {
    pub fn new() -> TestEngine {
        TestEngine::with(settings(), FixedSpecialStatus::default())
    }

    pub fn with(settings: TriviaSettings, special_status: FixedSpecialStatus) -> TestEngine {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let TestRepository {
            repository,
            source,
            database,
            settings,
            ..
        } = repository(settings, clock.clone());

        let scores = Arc::new(TriviaScoreRepository::new(database.clone()).unwrap());
        let special_status = Arc::new(special_status);
        let listener = Arc::new(CollectingListener::default());

        let mut machine = TriviaGameMachine::new(
            clock.clone(),
            TriviaAnswerChecker::new(TriviaAnswerCompiler::new(), settings.clone()),
            Arc::new(repository),
            scores.clone(),
            special_status.clone(),
            special_status.clone(),
            QueuedTriviaGameStore::new(settings.clone()),
            SuperTriviaCooldownHelper::new(clock.clone(), settings),
        );
        machine.set_event_listener(listener.clone());
        let submitter = machine.submitter();

        TestEngine {
            machine,
            submitter,
            listener,
            clock,
            source,
            scores,
            special_status,
            database,
        }
    }

    pub async fn submit(&self, action: TriviaAction) {
        self.submitter.submit_action(action).await.unwrap();
    }

    /// Runs one machine turn and returns the events it delivered.
    pub async fn tick(&mut self) -> Vec<TriviaEvent> {
        self.machine.run_once().await;
        self.listener.take()
    }

    pub async fn submit_and_tick(&mut self, action: TriviaAction) -> Vec<TriviaEvent> {
        self.submit(action).await;
        self.tick().await
    }
}

pub fn multiple_choice(trivia_id: &str, responses: &[&str], correct_ordinal: usize) -> Question {
    Question::new(
        trivia_id.to_string(),
        TriviaSource::Bongo,
        TriviaDifficulty::Medium,
        Some("Streamers".to_string()),
        "Who is the best streamer?".to_string(),
        QuestionKind::MultipleChoice {
            responses: responses.iter().map(|response| response.to_string()).collect(),
            correct_answer_ordinals: BTreeSet::from([correct_ordinal]),
        },
    )
    .unwrap()
}

pub fn true_false(trivia_id: &str, correct_answers: &[bool]) -> Question {
    Question::new(
        trivia_id.to_string(),
        TriviaSource::Bongo,
        TriviaDifficulty::Easy,
        None,
        "Is this question a trick?".to_string(),
        QuestionKind::TrueFalse {
            correct_answers: correct_answers.iter().copied().collect(),
        },
    )
    .unwrap()
}

pub fn question_answer(trivia_id: &str, question: &str, correct_answer: &str) -> Question {
    let correct_answers = vec![correct_answer.to_string()];
    let cleaned_correct_answers =
        TriviaAnswerCompiler::new().compile_cleaned_correct_answers(&correct_answers);

    Question::new(
        trivia_id.to_string(),
        TriviaSource::Bongo,
        TriviaDifficulty::Hard,
        Some("Music".to_string()),
        question.to_string(),
        QuestionKind::QuestionAnswer {
            correct_answers,
            cleaned_correct_answers,
        },
    )
    .unwrap()
}

pub fn event_names(events: &[TriviaEvent]) -> Vec<&'static str> {
    events.iter().map(TriviaEvent::name).collect()
}
