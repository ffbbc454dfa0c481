use std::{env, error::Error, path::Path, sync::Arc};

use async_trait::async_trait;
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use trivia_engine::{
    clock::{Clock, SystemClock},
    handlers::{
        additional_answers_repository::AdditionalTriviaAnswersRepository,
        answer_checker::TriviaAnswerChecker,
        answer_compiler::TriviaAnswerCompiler,
        banned_trivia_ids_repository::BannedTriviaIdsRepository,
        banned_words_repository::BannedWordsRepository,
        content_scanner::TriviaContentScanner,
        cooldown_helper::SuperTriviaCooldownHelper,
        emote_generator::TriviaEmoteGenerator,
        game_machine::{TriviaEventListener, TriviaGameMachine},
        history_repository::TriviaHistoryRepository,
        instability_helper::TriviaSourceInstabilityHelper,
        queued_game_store::QueuedTriviaGameStore,
        score_repository::TriviaScoreRepository,
        session_token_repository::OpenTriviaDatabaseSessionTokenRepository,
        special_status::{ProbabilityShinyTriviaHelper, ProbabilityToxicTriviaHelper},
        trivia_repository::TriviaRepository,
        trivia_verifier::TriviaVerifier,
    },
    helpers::parse_action,
    loggers::file_logger::init_file_logger,
    models::events::TriviaEvent,
    settings::TriviaSettingsRepository,
    sources::{
        bongo::BongoQuestionSource, funtoon::FuntoonQuestionSource, joke::JokeQuestionSource,
        jservice::JServiceQuestionSource, lotr::LotrQuestionSource,
        millionaire::MillionaireQuestionSource,
        network_client::{NetworkClient, ReqwestNetworkClient},
        open_trivia_database::OpenTriviaDatabaseQuestionSource,
        open_trivia_qa::OpenTriviaQaQuestionSource, pokemon::PokemonQuestionSource,
        quiz_api::QuizApiQuestionSource, trivia_database::TriviaDatabaseQuestionSource,
        trivia_question_company::TriviaQuestionCompanyQuestionSource,
        will_fry::WillFryQuestionSource, wwtbam::WwtbamQuestionSource, TriviaQuestionBuilder,
    },
    storage::backing_database::BackingDatabase,
};

const QUESTION_SET_DIRECTORY: &str = "data";

struct StdoutEventListener;

#[async_trait]
impl TriviaEventListener for StdoutEventListener {
    async fn on_new_trivia_event(&self, event: TriviaEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => println!("{}", json),
            Err(error) => error!("Unable to serialize {} event: {}", event.name(), error),
        }
    }
}

fn data_file(name: &str) -> String {
    Path::new(QUESTION_SET_DIRECTORY)
        .join(name)
        .to_string_lossy()
        .into_owned()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let settings_file = env::args()
        .nth(1)
        .unwrap_or_else(|| "triviaSettings.json".to_string());
    let database_file = env::args()
        .nth(2)
        .unwrap_or_else(|| "trivia.sqlite".to_string());

    let settings_repository = Arc::new(TriviaSettingsRepository::from_file(&settings_file));
    let debug_logging_enabled = settings_repository
        .get()
        .map(|settings| settings.debug_logging_enabled)
        .unwrap_or(false);

    init_file_logger(debug_logging_enabled)?;
    info!("App started!");

    let settings = settings_repository.get()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let database = Arc::new(BackingDatabase::open(&database_file)?);
    info!("Opened {:?} database at {}", database.database_type(), database_file);

    let banned_words_file = data_file("bannedWords.txt");
    let banned_words = if Path::new(&banned_words_file).is_file() {
        BannedWordsRepository::from_file(&banned_words_file)
    } else {
        warn!("No banned words file at {}, nothing will be banned by word", banned_words_file);
        BannedWordsRepository::empty()
    };

    let verifier = TriviaVerifier::new(
        Arc::new(BannedTriviaIdsRepository::new(database.clone())?),
        Arc::new(TriviaContentScanner::new(
            Arc::new(banned_words),
            settings_repository.clone(),
        )),
        Arc::new(TriviaHistoryRepository::new(
            database.clone(),
            settings_repository.clone(),
            clock.clone(),
        )?),
    );

    let builder = Arc::new(
        TriviaQuestionBuilder::new(settings_repository.clone()).with_additional_answers(Arc::new(
            AdditionalTriviaAnswersRepository::new(database.clone())?,
        )),
    );
    let network_client: Arc<dyn NetworkClient> =
        Arc::new(ReqwestNetworkClient::new(settings.network_timeout_seconds)?);
    let session_tokens = Arc::new(OpenTriviaDatabaseSessionTokenRepository::new(database.clone())?);
    let quiz_api_key = env::var("QUIZ_API_KEY").ok();

    let trivia_repository = TriviaRepository::new(
        settings_repository.clone(),
        Arc::new(TriviaSourceInstabilityHelper::new(clock.clone())),
        Arc::new(TriviaEmoteGenerator::new(database.clone())?),
        verifier,
    )
    .with_source(Arc::new(BongoQuestionSource::new(builder.clone(), network_client.clone())))
    .with_source(Arc::new(FuntoonQuestionSource::new(builder.clone(), network_client.clone())))
    .with_source(Arc::new(JServiceQuestionSource::new(builder.clone(), network_client.clone())))
    .with_source(Arc::new(OpenTriviaDatabaseQuestionSource::new(
        builder.clone(),
        network_client.clone(),
        session_tokens,
    )))
    .with_source(Arc::new(PokemonQuestionSource::new(builder.clone(), network_client.clone())))
    .with_source(Arc::new(QuizApiQuestionSource::new(
        builder.clone(),
        network_client.clone(),
        quiz_api_key,
    )))
    .with_source(Arc::new(WillFryQuestionSource::new(builder.clone(), network_client)))
    .with_source(Arc::new(JokeQuestionSource::new(
        builder.clone(),
        data_file("jokeTriviaQuestions.json"),
    )))
    .with_source(Arc::new(LotrQuestionSource::new(
        builder.clone(),
        data_file("lotrTriviaQuestionsDatabase.sqlite"),
    )))
    .with_source(Arc::new(MillionaireQuestionSource::new(
        builder.clone(),
        data_file("millionaireTriviaQuestionsDatabase.sqlite"),
    )))
    .with_source(Arc::new(OpenTriviaQaQuestionSource::new(
        builder.clone(),
        data_file("openTriviaQaQuestionsDatabase.sqlite"),
    )))
    .with_source(Arc::new(TriviaDatabaseQuestionSource::new(
        builder.clone(),
        data_file("triviaDatabaseQuestionsDatabase.sqlite"),
    )))
    .with_source(Arc::new(TriviaQuestionCompanyQuestionSource::new(
        builder.clone(),
        data_file("tqcTriviaQuestionsDatabase.sqlite"),
    )))
    .with_source(Arc::new(WwtbamQuestionSource::new(
        builder,
        data_file("wwtbamTriviaQuestionsDatabase.sqlite"),
    )));

    info!(
        "Registered trivia sources: {:?}",
        trivia_repository.registered_sources()
    );

    let mut machine = TriviaGameMachine::new(
        clock.clone(),
        TriviaAnswerChecker::new(TriviaAnswerCompiler::new(), settings_repository.clone()),
        Arc::new(trivia_repository),
        Arc::new(TriviaScoreRepository::new(database.clone())?),
        Arc::new(ProbabilityShinyTriviaHelper::new(settings_repository.clone())),
        Arc::new(ProbabilityToxicTriviaHelper::new(settings_repository.clone())),
        QueuedTriviaGameStore::new(settings_repository.clone()),
        SuperTriviaCooldownHelper::new(clock, settings_repository),
    );
    machine.set_event_listener(Arc::new(StdoutEventListener));

    let submitter = machine.submitter();
    tokio::spawn(machine.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let action = match parse_action(&line) {
            Ok(action) => action,
            Err(error) => {
                warn!("Ignoring unreadable action \"{}\": {}", line, error);
                continue;
            }
        };

        if let Err(error) = submitter.submit_action(action).await {
            warn!("Rejected action \"{}\": {}", line, error);
        }
    }

    info!("Input closed, running until interrupted");
    tokio::signal::ctrl_c().await?;
    database.close()?;
    info!("App stopped");

    Ok(())
}
