use std::{collections::HashMap, sync::Arc, time::Duration};

use futures_timer::Delay;
use log::{error, info, warn};
use rand::distributions::{Distribution, WeightedIndex};

use crate::{
    errors::TriviaError,
    models::{
        fetch_options::{QuestionAnswerTriviaConditions, TriviaFetchOptions},
        question::{Question, TriviaSource, TriviaType},
    },
    settings::TriviaSettingsRepository,
    sources::QuestionSource,
};

use super::{
    emote_generator::TriviaEmoteGenerator,
    instability_helper::TriviaSourceInstabilityHelper,
    question_spooler::{SpoolKind, TriviaQuestionSpooler},
    trivia_verifier::TriviaVerifier,
};

/// A verified question together with the emote it was recorded under.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTrivia {
    pub question: Question,
    pub emote: String,
}

pub struct TriviaRepository {
    sources: HashMap<TriviaSource, Arc<dyn QuestionSource>>,
    settings: Arc<TriviaSettingsRepository>,
    instability_helper: Arc<TriviaSourceInstabilityHelper>,
    emote_generator: Arc<TriviaEmoteGenerator>,
    verifier: TriviaVerifier,
    spooler: TriviaQuestionSpooler,
}

impl TriviaRepository {
    pub fn new(
        settings: Arc<TriviaSettingsRepository>,
        instability_helper: Arc<TriviaSourceInstabilityHelper>,
        emote_generator: Arc<TriviaEmoteGenerator>,
        verifier: TriviaVerifier,
    ) -> TriviaRepository {
        TriviaRepository {
            sources: HashMap::new(),
            settings,
            instability_helper,
            emote_generator,
            verifier,
            spooler: TriviaQuestionSpooler::new(),
        }
    }

    /// Registers `source`, replacing any earlier source with the same tag.
    pub fn with_source(mut self, source: Arc<dyn QuestionSource>) -> TriviaRepository {
        self.sources.insert(source.trivia_source(), source);
        self
    }

    pub fn registered_sources(&self) -> Vec<TriviaSource> {
        let mut sources: Vec<TriviaSource> = self.sources.keys().copied().collect();
        sources.sort_by_key(|trivia_source| trivia_source.as_str());
        sources
    }

    fn is_eligible(
        &self,
        source: &dyn QuestionSource,
        fetch_options: &TriviaFetchOptions,
        instability_threshold: u32,
    ) -> bool {
        let trivia_source = source.trivia_source();
        let supported = source.supported_trivia_types();
        let supports_question_answer = supported.contains(&TriviaType::QuestionAnswer);

        let type_ok = match fetch_options.question_answer_conditions {
            QuestionAnswerTriviaConditions::Allowed => true,
            QuestionAnswerTriviaConditions::Required => supports_question_answer,
            QuestionAnswerTriviaConditions::NotAllowed => supported
                .iter()
                .any(|trivia_type| *trivia_type != TriviaType::QuestionAnswer),
        };

        if !type_ok {
            return false;
        }

        if trivia_source == TriviaSource::JokeTriviaRepository
            && !fetch_options.is_joke_trivia_repository_enabled
        {
            return false;
        }

        if !source.has_question_set_available() {
            return false;
        }

        let error_count = self.instability_helper.get(trivia_source);
        if error_count >= instability_threshold {
            info!(
                "Skipping {} for now, it has failed {} time(s) recently",
                trivia_source, error_count
            );
            return false;
        }

        true
    }

    /// Picks a source at random by configured weight, among those that can
    /// serve `fetch_options` right now.
    pub fn choose_source(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Arc<dyn QuestionSource>, TriviaError> {
        let settings = self.settings.get()?;
        let weights = settings.available_trivia_source_weights();

        let mut candidates: Vec<(Arc<dyn QuestionSource>, u32)> = weights
            .into_iter()
            .filter(|(_, weight)| *weight > 0)
            .filter_map(|(trivia_source, weight)| {
                self.sources
                    .get(&trivia_source)
                    .map(|source| (source.clone(), weight))
            })
            .filter(|(source, _)| {
                self.is_eligible(
                    source.as_ref(),
                    fetch_options,
                    settings.trivia_source_instability_threshold,
                )
            })
            .collect();

        if candidates.is_empty() {
            warn!(
                "No trivia sources are available for {} ({:?})",
                fetch_options.twitch_channel, fetch_options.question_answer_conditions
            );
            return Err(TriviaError::NoTriviaSourcesAvailable);
        }

        candidates.sort_by_key(|(source, _)| source.trivia_source().as_str());

        let distribution = WeightedIndex::new(candidates.iter().map(|(_, weight)| *weight))
            .map_err(|_| TriviaError::NoTriviaSourcesAvailable)?;
        let index = distribution.sample(&mut rand::thread_rng());

        Ok(candidates[index].0.clone())
    }

    /// Fetches questions until one passes verification for the channel.
    /// Spooled questions are tried before the sources. Every attempt that
    /// ends without a usable question is followed by a linear backoff sleep.
    pub async fn fetch_trivia(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<FetchedTrivia, TriviaError> {
        let settings = self.settings.get()?;

        for attempt in 1..=settings.max_retry_count {
            if let Some(fetched) = self.try_fetch_trivia(fetch_options, attempt).await? {
                return Ok(fetched);
            }

            let sleep_seconds = settings.retry_sleep_seconds * f64::from(attempt);
            if attempt < settings.max_retry_count && sleep_seconds > 0.0 {
                Delay::new(Duration::from_secs_f64(sleep_seconds)).await;
            }
        }

        Err(TriviaError::TooManyTriviaFetchAttempts {
            attempts: settings.max_retry_count,
        })
    }

    /// One fetch attempt. `Ok(None)` uses the attempt up without a question.
    async fn try_fetch_trivia(
        &self,
        fetch_options: &TriviaFetchOptions,
        attempt: u32,
    ) -> Result<Option<FetchedTrivia>, TriviaError> {
        let twitch_channel = fetch_options.twitch_channel.as_str();

        let question = match self.spooler.take(fetch_options) {
            Some(question) => question,
            None => {
                let source = self.choose_source(fetch_options)?;
                let trivia_source = source.trivia_source();

                match source.fetch_trivia_question(fetch_options).await {
                    Ok(question) => question,
                    Err(error @ TriviaError::Settings(_)) => return Err(error),
                    Err(error) => {
                        error!(
                            "Attempt {} to fetch trivia from {} for {} failed: {}",
                            attempt, trivia_source, twitch_channel, error
                        );

                        if error.is_source_failure() {
                            self.instability_helper.increment_error_count(trivia_source);
                        }
                        return Ok(None);
                    }
                }
            }
        };

        let emote = self.emote_generator.get_next_emote_for(twitch_channel)?;
        let content_code =
            self.verifier
                .verify(Some(&question), fetch_options, &emote, twitch_channel)?;

        if content_code.is_ok() {
            info!(
                "Fetched trivia question {} from {} for {} on attempt {}",
                question.trivia_id, question.trivia_source, twitch_channel, attempt
            );
            return Ok(Some(FetchedTrivia { question, emote }));
        }

        info!(
            "Rejected trivia question {} from {} for {}: {:?}",
            question.trivia_id, question.trivia_source, twitch_channel, content_code
        );
        Ok(None)
    }

    /// Adds at most one question to each spool that is below its configured size.
    pub async fn refresh_spools(&self) -> Result<(), TriviaError> {
        let settings = self.settings.get()?;

        for kind in SpoolKind::ALL {
            if self.spooler.len(kind) >= kind.max_size(&settings) {
                continue;
            }

            let fetch_options = kind.fetch_options();
            let source = match self.choose_source(&fetch_options) {
                Ok(source) => source,
                Err(error) => {
                    warn!("Unable to spool a {:?} trivia question: {}", kind, error);
                    continue;
                }
            };

            match source.fetch_trivia_question(&fetch_options).await {
                Ok(question) => {
                    self.spooler.spool(kind, question);
                }
                Err(error) => {
                    error!(
                        "Unable to spool a {:?} trivia question from {}: {}",
                        kind,
                        source.trivia_source(),
                        error
                    );

                    if error.is_source_failure() {
                        self.instability_helper
                            .increment_error_count(source.trivia_source());
                    }
                }
            }
        }

        Ok(())
    }

    pub fn spool_refresh_seconds(&self) -> Result<i64, TriviaError> {
        Ok(self.settings.get()?.spool_refresh_seconds)
    }

    pub fn spooled_questions(&self, kind: SpoolKind) -> usize {
        self.spooler.len(kind)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeSet,
        sync::atomic::{AtomicU32, Ordering},
    };

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::{
        clock::{Clock, ManualClock},
        handlers::{
            banned_trivia_ids_repository::BannedTriviaIdsRepository,
            banned_words_repository::BannedWordsRepository,
            content_scanner::TriviaContentScanner, history_repository::TriviaHistoryRepository,
        },
        models::question::{QuestionKind, TriviaDifficulty},
        settings::{TriviaSettings, TriviaSourceSettings},
        storage::backing_database::BackingDatabase,
    };

    struct FakeSource {
        trivia_source: TriviaSource,
        supported: &'static [TriviaType],
        fails: bool,
        malformed_calls: u32,
        calls: AtomicU32,
    }

    impl FakeSource {
        fn new(trivia_source: TriviaSource, supported: &'static [TriviaType]) -> FakeSource {
            FakeSource {
                trivia_source,
                supported,
                fails: false,
                malformed_calls: 0,
                calls: AtomicU32::new(0),
            }
        }

        /// Serves malformed data for the first `malformed_calls` calls.
        fn malformed_at_first(trivia_source: TriviaSource, malformed_calls: u32) -> FakeSource {
            FakeSource {
                malformed_calls,
                ..FakeSource::new(trivia_source, &[TriviaType::TrueFalse])
            }
        }

        fn failing(trivia_source: TriviaSource) -> FakeSource {
            FakeSource {
                fails: true,
                ..FakeSource::new(trivia_source, &[TriviaType::TrueFalse])
            }
        }
    }

    #[async_trait]
    impl QuestionSource for FakeSource {
        fn trivia_source(&self) -> TriviaSource {
            self.trivia_source
        }

        fn supported_trivia_types(&self) -> &'static [TriviaType] {
            self.supported
        }

        async fn fetch_trivia_question(
            &self,
            _fetch_options: &TriviaFetchOptions,
        ) -> Result<Question, TriviaError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

            if call <= self.malformed_calls {
                return Err(TriviaError::InvalidInput(
                    "question text is blank".to_string(),
                ));
            }

            if self.fails {
                return Err(TriviaError::GenericTriviaNetwork {
                    trivia_source: self.trivia_source,
                    cause: "connection refused".to_string(),
                });
            }

            Question::new(
                "same-question".to_string(),
                self.trivia_source,
                TriviaDifficulty::Easy,
                None,
                "Is the sky blue?".to_string(),
                QuestionKind::TrueFalse {
                    correct_answers: BTreeSet::from([true]),
                },
            )
        }
    }

    fn settings(weights: &[(&str, u32)]) -> TriviaSettings {
        TriviaSettings {
            trivia_sources: weights
                .iter()
                .map(|(name, weight)| {
                    (
                        name.to_string(),
                        TriviaSourceSettings {
                            is_enabled: true,
                            weight: *weight,
                        },
                    )
                })
                .collect(),
            retry_sleep_seconds: 0.0,
            ..TriviaSettings::default()
        }
    }

    fn repository(settings: TriviaSettings) -> TriviaRepository {
        let database = Arc::new(BackingDatabase::open_in_memory().unwrap());
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(Utc::now()));
        let settings = Arc::new(TriviaSettingsRepository::from_settings(settings));

        let verifier = TriviaVerifier::new(
            Arc::new(BannedTriviaIdsRepository::new(database.clone()).unwrap()),
            Arc::new(TriviaContentScanner::new(
                Arc::new(BannedWordsRepository::empty()),
                settings.clone(),
            )),
            Arc::new(
                TriviaHistoryRepository::new(database.clone(), settings.clone(), clock.clone())
                    .unwrap(),
            ),
        );

        TriviaRepository::new(
            settings,
            Arc::new(TriviaSourceInstabilityHelper::new(clock)),
            Arc::new(TriviaEmoteGenerator::new(database).unwrap()),
            verifier,
        )
    }

    #[test]
    fn zero_weight_sources_are_never_chosen() {
        let repository = repository(settings(&[("bongo", 0), ("funtoon", 1)]))
            .with_source(Arc::new(FakeSource::new(TriviaSource::Bongo, &[TriviaType::TrueFalse])))
            .with_source(Arc::new(FakeSource::new(TriviaSource::Funtoon, &[TriviaType::TrueFalse])));

        let options = TriviaFetchOptions::new("smCharles");
        for _ in 0..50 {
            assert_eq!(
                repository.choose_source(&options).unwrap().trivia_source(),
                TriviaSource::Funtoon
            );
        }
    }

    #[test]
    fn question_answer_conditions_filter_sources() {
        let repository = repository(settings(&[("bongo", 1), ("j_service", 1)]))
            .with_source(Arc::new(FakeSource::new(
                TriviaSource::Bongo,
                &[TriviaType::MultipleChoice, TriviaType::TrueFalse],
            )))
            .with_source(Arc::new(FakeSource::new(
                TriviaSource::JService,
                &[TriviaType::QuestionAnswer],
            )));

        let required = TriviaFetchOptions::new("smCharles")
            .with_question_answer_conditions(QuestionAnswerTriviaConditions::Required);
        let not_allowed = TriviaFetchOptions::new("smCharles")
            .with_question_answer_conditions(QuestionAnswerTriviaConditions::NotAllowed);

        for _ in 0..20 {
            assert_eq!(
                repository.choose_source(&required).unwrap().trivia_source(),
                TriviaSource::JService
            );
            assert_eq!(
                repository.choose_source(&not_allowed).unwrap().trivia_source(),
                TriviaSource::Bongo
            );
        }
    }

    #[test]
    fn joke_trivia_needs_to_be_enabled() {
        let repository = repository(settings(&[("joke_trivia_repository", 1)])).with_source(
            Arc::new(FakeSource::new(TriviaSource::JokeTriviaRepository, &[TriviaType::TrueFalse])),
        );

        assert!(matches!(
            repository.choose_source(&TriviaFetchOptions::new("smCharles")),
            Err(TriviaError::NoTriviaSourcesAvailable)
        ));
        assert!(repository
            .choose_source(&TriviaFetchOptions::new("smCharles").with_joke_trivia(true))
            .is_ok());
    }

    #[tokio::test]
    async fn unstable_sources_drop_out_of_rotation() {
        let failing = Arc::new(FakeSource::failing(TriviaSource::Bongo));
        let repository = repository(TriviaSettings {
            trivia_source_instability_threshold: 3,
            ..settings(&[("bongo", 1)])
        })
        .with_source(failing.clone());

        assert!(matches!(
            repository.fetch_trivia(&TriviaFetchOptions::new("smCharles")).await,
            Err(TriviaError::NoTriviaSourcesAvailable)
        ));
        assert_eq!(failing.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn repeats_are_discarded_until_attempts_run_out() {
        let source = Arc::new(FakeSource::new(TriviaSource::Bongo, &[TriviaType::TrueFalse]));
        let repository = repository(settings(&[("bongo", 1)])).with_source(source.clone());
        let options = TriviaFetchOptions::new("smCharles");

        let fetched = repository.fetch_trivia(&options).await.unwrap();
        assert_eq!(fetched.question.trivia_id, "same-question");
        assert!(!fetched.emote.is_empty());

        assert!(matches!(
            repository.fetch_trivia(&options).await,
            Err(TriviaError::TooManyTriviaFetchAttempts { attempts: 5 })
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 6);

        assert!(repository
            .fetch_trivia(&TriviaFetchOptions::new("imyt"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn malformed_questions_use_up_an_attempt_and_fetching_continues() {
        let source = Arc::new(FakeSource::malformed_at_first(TriviaSource::Bongo, 2));
        let repository = repository(settings(&[("bongo", 1)])).with_source(source.clone());

        let fetched = repository
            .fetch_trivia(&TriviaFetchOptions::new("smCharles"))
            .await
            .unwrap();

        assert_eq!(fetched.question.trivia_id, "same-question");
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn malformed_questions_do_not_count_towards_instability() {
        let source = Arc::new(FakeSource::malformed_at_first(TriviaSource::Bongo, 10));
        let repository = repository(TriviaSettings {
            trivia_source_instability_threshold: 2,
            max_retry_count: 4,
            ..settings(&[("bongo", 1)])
        })
        .with_source(source.clone());

        assert!(matches!(
            repository.fetch_trivia(&TriviaFetchOptions::new("smCharles")).await,
            Err(TriviaError::TooManyTriviaFetchAttempts { attempts: 4 })
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn every_failed_attempt_backs_off() {
        let source = Arc::new(FakeSource::new(TriviaSource::Bongo, &[TriviaType::TrueFalse]));
        let repository = repository(TriviaSettings {
            retry_sleep_seconds: 0.05,
            max_retry_count: 3,
            ..settings(&[("bongo", 1)])
        })
        .with_source(source.clone());
        let options = TriviaFetchOptions::new("smCharles");

        repository.fetch_trivia(&options).await.unwrap();

        let started = std::time::Instant::now();
        assert!(matches!(
            repository.fetch_trivia(&options).await,
            Err(TriviaError::TooManyTriviaFetchAttempts { attempts: 3 })
        ));
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn spooled_questions_are_served_before_sources() {
        let source = Arc::new(FakeSource::new(TriviaSource::Bongo, &[TriviaType::TrueFalse]));
        let repository = repository(TriviaSettings {
            max_trivia_question_spool_size: 1,
            max_super_trivia_question_spool_size: 0,
            ..settings(&[("bongo", 1)])
        })
        .with_source(source.clone());

        repository.refresh_spools().await.unwrap();
        assert_eq!(repository.spooled_questions(SpoolKind::Normal), 1);
        assert_eq!(repository.spooled_questions(SpoolKind::Super), 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        repository.refresh_spools().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let fetched = repository
            .fetch_trivia(&TriviaFetchOptions::new("smCharles"))
            .await
            .unwrap();
        assert_eq!(fetched.question.trivia_id, "same-question");
        assert_eq!(repository.spooled_questions(SpoolKind::Normal), 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
