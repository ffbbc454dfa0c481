use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crossbeam_queue::ArrayQueue;
use futures_timer::Delay;
use log::{error, info, warn};

use crate::{
    clock::Clock,
    errors::TriviaError,
    models::{
        actions::{
            CheckAnswerTriviaAction, ClearSuperTriviaQueueTriviaAction, StartNewSuperTriviaGameAction,
            StartNewTriviaGameAction, TriviaAction,
        },
        events::TriviaEvent,
        game_state::{
            GameState, GameStateDetails, SpecialTriviaStatus, SuperTriviaGameState,
            TriviaGameState,
        },
        score::TriviaScoreResult,
    },
};

use super::{
    answer_checker::{TriviaAnswerCheckResult, TriviaAnswerChecker},
    cooldown_helper::SuperTriviaCooldownHelper,
    game_store::TriviaGameStore,
    queued_game_store::QueuedTriviaGameStore,
    score_repository::TriviaScoreRepository,
    special_status::{ShinyTriviaHelper, ToxicTriviaHelper},
    trivia_repository::TriviaRepository,
};

pub const ACTION_QUEUE_CAPACITY: usize = 256;
pub const EVENT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_SLEEP_TIME_SECONDS: f64 = 0.5;
pub const DEFAULT_QUEUE_TIMEOUT_SECONDS: u64 = 3;

const QUEUE_RETRY_INTERVAL: Duration = Duration::from_millis(10);

#[async_trait]
pub trait TriviaEventListener: Send + Sync {
    async fn on_new_trivia_event(&self, event: TriviaEvent);
}

/// Cloneable producer side of the machine's action queue.
#[derive(Clone)]
pub struct TriviaActionSubmitter {
    action_queue: Arc<ArrayQueue<TriviaAction>>,
    queue_timeout: Duration,
}

impl TriviaActionSubmitter {
    /// Validates `action` and enqueues it. A queue that stays full for the
    /// whole timeout drops the action.
    pub async fn submit_action(&self, action: TriviaAction) -> Result<(), TriviaError> {
        action.validate()?;

        let started = Instant::now();
        let mut action = action;

        loop {
            match self.action_queue.push(action) {
                Ok(()) => return Ok(()),
                Err(rejected) => {
                    if started.elapsed() >= self.queue_timeout {
                        error!(
                            "Action queue is full, dropping action {} for {}",
                            rejected.action_id(),
                            rejected.twitch_channel()
                        );
                        return Ok(());
                    }

                    action = rejected;
                    Delay::new(QUEUE_RETRY_INTERVAL).await;
                }
            }
        }
    }

    pub fn pending_actions(&self) -> usize {
        self.action_queue.len()
    }
}

pub struct TriviaGameMachine {
    clock: Arc<dyn Clock>,
    answer_checker: TriviaAnswerChecker,
    trivia_repository: Arc<TriviaRepository>,
    score_repository: Arc<TriviaScoreRepository>,
    shiny_helper: Arc<dyn ShinyTriviaHelper>,
    toxic_helper: Arc<dyn ToxicTriviaHelper>,
    game_store: TriviaGameStore,
    queued_game_store: QueuedTriviaGameStore,
    cooldown_helper: SuperTriviaCooldownHelper,
    action_queue: Arc<ArrayQueue<TriviaAction>>,
    event_queue: ArrayQueue<TriviaEvent>,
    event_listener: Option<Arc<dyn TriviaEventListener>>,
    sleep_time: Duration,
    queue_timeout: Duration,
    next_spool_refresh: DateTime<Utc>,
}

impl TriviaGameMachine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        clock: Arc<dyn Clock>,
        answer_checker: TriviaAnswerChecker,
        trivia_repository: Arc<TriviaRepository>,
        score_repository: Arc<TriviaScoreRepository>,
        shiny_helper: Arc<dyn ShinyTriviaHelper>,
        toxic_helper: Arc<dyn ToxicTriviaHelper>,
        queued_game_store: QueuedTriviaGameStore,
        cooldown_helper: SuperTriviaCooldownHelper,
    ) -> TriviaGameMachine {
        let next_spool_refresh = clock.now();

        TriviaGameMachine {
            clock,
            answer_checker,
            trivia_repository,
            score_repository,
            shiny_helper,
            toxic_helper,
            game_store: TriviaGameStore::new(),
            queued_game_store,
            cooldown_helper,
            action_queue: Arc::new(ArrayQueue::new(ACTION_QUEUE_CAPACITY)),
            event_queue: ArrayQueue::new(EVENT_QUEUE_CAPACITY),
            event_listener: None,
            sleep_time: Duration::from_secs_f64(DEFAULT_SLEEP_TIME_SECONDS),
            queue_timeout: Duration::from_secs(DEFAULT_QUEUE_TIMEOUT_SECONDS),
            next_spool_refresh,
        }
    }

    /// Seconds to sleep between loop iterations, 0.25..=3.
    pub fn with_sleep_time_seconds(mut self, seconds: f64) -> Result<TriviaGameMachine, TriviaError> {
        if !(0.25..=3.0).contains(&seconds) {
            return Err(TriviaError::InvalidInput(format!(
                "sleep time must be within 0.25..=3 seconds, got {}",
                seconds
            )));
        }

        self.sleep_time = Duration::from_secs_f64(seconds);
        Ok(self)
    }

    /// Seconds `submit_action` waits on a full queue, 1..=5.
    pub fn with_queue_timeout_seconds(mut self, seconds: u64) -> Result<TriviaGameMachine, TriviaError> {
        if !(1..=5).contains(&seconds) {
            return Err(TriviaError::InvalidInput(format!(
                "queue timeout must be within 1..=5 seconds, got {}",
                seconds
            )));
        }

        self.queue_timeout = Duration::from_secs(seconds);
        Ok(self)
    }

    pub fn set_event_listener(&mut self, event_listener: Arc<dyn TriviaEventListener>) {
        self.event_listener = Some(event_listener);
    }

    pub fn submitter(&self) -> TriviaActionSubmitter {
        TriviaActionSubmitter {
            action_queue: self.action_queue.clone(),
            queue_timeout: self.queue_timeout,
        }
    }

    pub fn game_store(&self) -> &TriviaGameStore {
        &self.game_store
    }

    pub fn queued_game_store(&self) -> &QueuedTriviaGameStore {
        &self.queued_game_store
    }

    pub fn trivia_repository(&self) -> &TriviaRepository {
        &self.trivia_repository
    }

    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    pub async fn run(mut self) {
        info!("Trivia game machine started");

        loop {
            self.run_once().await;
            Delay::new(self.sleep_time).await;
        }
    }

    /// One scheduler turn: handle queued actions, expire games and launch
    /// queued super games, then hand events to the listener.
    pub async fn run_once(&mut self) {
        let pending = self.action_queue.len();

        for _ in 0..pending {
            let action = match self.action_queue.pop() {
                Some(action) => action,
                None => break,
            };

            let action_id = action.action_id().to_string();
            if let Err(error) = self.handle_action(action).await {
                error!("Failed to handle trivia action {}: {}", action_id, error);
            }
        }

        if let Err(error) = self.refresh_status().await {
            error!("Failed to refresh trivia game status: {}", error);
        }

        self.deliver_events().await;
    }

    async fn deliver_events(&mut self) {
        let event_listener = match &self.event_listener {
            Some(event_listener) => event_listener.clone(),
            None => return,
        };

        while let Some(event) = self.event_queue.pop() {
            event_listener.on_new_trivia_event(event).await;
        }
    }

    fn submit_event(&self, event: TriviaEvent) {
        if let Err(event) = self.event_queue.push(event) {
            error!(
                "Event queue is full, dropping {} event {} for {}",
                event.name(),
                event.action_id(),
                event.twitch_channel()
            );
        }
    }

    async fn handle_action(&mut self, action: TriviaAction) -> Result<(), TriviaError> {
        match action {
            TriviaAction::StartNewGame(action) => self.handle_start_new_game(action).await,
            TriviaAction::StartNewSuperGame(action) => self.handle_start_new_super_game(action).await,
            TriviaAction::CheckAnswer(action) => self.handle_check_answer(action),
            TriviaAction::CheckSuperAnswer(action) => self.handle_check_super_answer(action),
            TriviaAction::ClearSuperTriviaQueue(action) => {
                self.handle_clear_super_trivia_queue(action);
                Ok(())
            }
        }
    }

    async fn handle_start_new_game(&mut self, action: StartNewTriviaGameAction) -> Result<(), TriviaError> {
        let now = self.clock.now();

        if let Some(state) = self
            .game_store
            .get_normal_game(&action.twitch_channel, &action.user_id)
            .cloned()
        {
            if state.details.end_time >= now {
                self.submit_event(TriviaEvent::GameAlreadyInProgress {
                    action_id: action.action_id,
                    game_id: state.details.game_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                });
                return Ok(());
            }

            // Expired but not collected by the tick yet.
            self.game_store
                .remove_normal_game(&action.twitch_channel, &action.user_id);
            self.handle_out_of_time(state);
        }

        let fetched = match self.trivia_repository.fetch_trivia(&action.fetch_options).await {
            Ok(fetched) => fetched,
            Err(error) => {
                error!(
                    "Unable to fetch a trivia question for {} in {}: {}",
                    action.user_name, action.twitch_channel, error
                );
                self.submit_event(TriviaEvent::FailedToFetchQuestion {
                    action_id: action.action_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                });
                return Ok(());
            }
        };

        let mut points_for_winning = action.points_for_winning;
        let mut special_status = None;

        if action.is_shiny_trivia_enabled
            && self.shiny_helper.is_shiny_trivia_question(&action.twitch_channel)
        {
            special_status = Some(SpecialTriviaStatus::Shiny);
            points_for_winning = points_for_winning.saturating_mul(action.shiny_multiplier);
        }

        let details = GameStateDetails::new(
            &action.action_id,
            &action.twitch_channel,
            &fetched.emote,
            points_for_winning,
            action.seconds_to_live,
            special_status,
            fetched.question,
            self.clock.now(),
        )?;

        self.game_store.add(GameState::Normal(TriviaGameState {
            details: details.clone(),
            user_id: action.user_id.clone(),
            user_name: action.user_name.clone(),
        }));

        info!(
            "Started trivia game {} for {} in {}",
            details.game_id, action.user_name, action.twitch_channel
        );

        self.submit_event(TriviaEvent::NewGame {
            action_id: action.action_id,
            game_id: details.game_id,
            twitch_channel: action.twitch_channel,
            user_id: action.user_id,
            user_name: action.user_name,
            emote: details.emote,
            points_for_winning: details.points_for_winning,
            seconds_to_live: details.seconds_to_live,
            special_status: details.special_status,
            question: details.question,
        });

        Ok(())
    }

    async fn handle_start_new_super_game(
        &mut self,
        mut action: StartNewSuperTriviaGameAction,
    ) -> Result<(), TriviaError> {
        let twitch_channel = action.twitch_channel.clone();
        let game_in_progress = self
            .game_store
            .get_super_game(&twitch_channel)
            .map(|state| state.details.game_id.clone());
        let is_cooling_down = !self.cooldown_helper.is_ready(&twitch_channel)?;

        if game_in_progress.is_some() || is_cooling_down {
            if action.is_queue_action_consumed {
                info!(
                    "Super trivia in {} is busy, putting queued game {} back",
                    twitch_channel, action.action_id
                );
                self.queued_game_store.requeue(action);
                return Ok(());
            }

            let result = self.queued_game_store.add_super_games(true, &mut action)?;

            if result.amount_added > 0 {
                self.submit_event(TriviaEvent::NewQueuedSuperGame {
                    action_id: action.action_id,
                    twitch_channel,
                    number_of_games: result.amount_added as u32,
                    points_for_winning: action.points_for_winning,
                    seconds_to_live: action.seconds_to_live,
                });
            } else if let Some(game_id) = game_in_progress {
                self.submit_event(TriviaEvent::SuperGameAlreadyInProgress {
                    action_id: action.action_id,
                    game_id,
                    twitch_channel,
                });
            }

            return Ok(());
        }

        if !action.is_queue_action_consumed && action.number_of_games > 1 {
            let result = self.queued_game_store.add_super_games(false, &mut action)?;

            if result.amount_added > 0 {
                self.submit_event(TriviaEvent::NewQueuedSuperGame {
                    action_id: action.action_id.clone(),
                    twitch_channel: twitch_channel.clone(),
                    number_of_games: result.amount_added as u32,
                    points_for_winning: action.points_for_winning,
                    seconds_to_live: action.seconds_to_live,
                });
            }
        }

        let fetched = match self.trivia_repository.fetch_trivia(&action.fetch_options).await {
            Ok(fetched) => fetched,
            Err(error) => {
                error!(
                    "Unable to fetch a super trivia question for {}: {}",
                    twitch_channel, error
                );
                self.submit_event(TriviaEvent::FailedToFetchQuestionSuper {
                    action_id: action.action_id,
                    twitch_channel,
                });
                return Ok(());
            }
        };

        let mut points_for_winning = action.points_for_winning;
        let mut special_status = None;

        if action.is_shiny_trivia_enabled && self.shiny_helper.is_shiny_trivia_question(&twitch_channel) {
            special_status = Some(SpecialTriviaStatus::Shiny);
            points_for_winning = points_for_winning.saturating_mul(action.shiny_multiplier);
        } else if action.is_toxic_trivia_enabled
            && self.toxic_helper.is_toxic_trivia_question(&twitch_channel)
        {
            special_status = Some(SpecialTriviaStatus::Toxic);
            points_for_winning = points_for_winning.saturating_mul(action.toxic_multiplier);
        }

        let details = GameStateDetails::new(
            &action.action_id,
            &twitch_channel,
            &fetched.emote,
            points_for_winning,
            action.seconds_to_live,
            special_status,
            fetched.question,
            self.clock.now(),
        )?;

        let state = SuperTriviaGameState::new(
            details.clone(),
            action.per_user_attempts,
            action.regular_trivia_points_for_winning,
            action.toxic_trivia_punishment_multiplier,
        )?;
        self.game_store.add(GameState::Super(state));

        info!("Started super trivia game {} in {}", details.game_id, twitch_channel);

        self.submit_event(TriviaEvent::NewSuperGame {
            action_id: action.action_id,
            game_id: details.game_id,
            twitch_channel,
            emote: details.emote,
            points_for_winning: details.points_for_winning,
            per_user_attempts: action.per_user_attempts,
            seconds_to_live: details.seconds_to_live,
            special_status: details.special_status,
            question: details.question,
        });

        Ok(())
    }

    fn handle_check_answer(&mut self, action: CheckAnswerTriviaAction) -> Result<(), TriviaError> {
        let now = self.clock.now();

        let state = match self
            .game_store
            .get_normal_game(&action.twitch_channel, &action.user_id)
        {
            Some(state) if state.details.end_time >= now => state.clone(),
            _ => {
                self.submit_event(TriviaEvent::GameNotReadyCheckAnswer {
                    action_id: action.action_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                    answer: action.answer,
                });
                return Ok(());
            }
        };

        // Games are looked up by (channel, user), so this only fires if the
        // store hands back a game started by someone else.
        if !state.user_id.eq_ignore_ascii_case(&action.user_id) {
            self.submit_event(TriviaEvent::WrongUserCheckAnswer {
                action_id: action.action_id,
                game_id: state.details.game_id,
                twitch_channel: action.twitch_channel,
                user_id: action.user_id,
                user_name: action.user_name,
                answer: action.answer,
            });
            return Ok(());
        }

        let details = state.details;
        let result = self
            .answer_checker
            .check_answer(&action.answer, &details.question)?;

        match result {
            TriviaAnswerCheckResult::InvalidInput => {
                self.submit_event(TriviaEvent::InvalidAnswerInput {
                    action_id: action.action_id,
                    game_id: details.game_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                    answer: action.answer,
                    emote: details.emote,
                    question: details.question,
                });
            }
            TriviaAnswerCheckResult::Incorrect => {
                self.game_store
                    .remove_normal_game(&action.twitch_channel, &action.user_id);
                let score = self.record_loss(&action.twitch_channel, &action.user_id);

                self.submit_event(TriviaEvent::IncorrectAnswer {
                    action_id: action.action_id,
                    game_id: details.game_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                    answer: action.answer,
                    emote: details.emote,
                    question: details.question,
                    score,
                });
            }
            TriviaAnswerCheckResult::Correct => {
                self.game_store
                    .remove_normal_game(&action.twitch_channel, &action.user_id);
                let score = self.record_win(&action.twitch_channel, &action.user_id);

                self.submit_event(TriviaEvent::CorrectAnswer {
                    action_id: action.action_id,
                    game_id: details.game_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                    answer: action.answer,
                    emote: details.emote,
                    points_for_winning: details.points_for_winning,
                    special_status: details.special_status,
                    question: details.question,
                    score,
                });
            }
        }

        Ok(())
    }

    fn handle_check_super_answer(&mut self, action: CheckAnswerTriviaAction) -> Result<(), TriviaError> {
        let now = self.clock.now();

        let state = match self.game_store.get_super_game_mut(&action.twitch_channel) {
            Some(state) if state.details.end_time >= now => state,
            _ => {
                self.submit_event(TriviaEvent::SuperGameNotReadyCheckAnswer {
                    action_id: action.action_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                    answer: action.answer,
                });
                return Ok(());
            }
        };

        if !state.is_eligible_to_answer(&action.user_id) {
            info!(
                "{} has no super trivia attempts left in {}",
                action.user_name, action.twitch_channel
            );
            return Ok(());
        }

        let result = self
            .answer_checker
            .check_answer(&action.answer, &state.details.question)?;

        if result != TriviaAnswerCheckResult::InvalidInput {
            state.increment_answer_count(&action.user_id);
        }

        if result != TriviaAnswerCheckResult::Correct {
            let details = state.details.clone();

            self.submit_event(TriviaEvent::IncorrectSuperAnswer {
                action_id: action.action_id,
                game_id: details.game_id,
                twitch_channel: action.twitch_channel,
                user_id: action.user_id,
                user_name: action.user_name,
                answer: action.answer,
                emote: details.emote,
                question: details.question,
            });
            return Ok(());
        }

        let state = state.clone();
        self.game_store.remove_super_game(&action.twitch_channel);
        self.cooldown_helper.update(&action.twitch_channel);

        let score = self.record_win(&action.twitch_channel, &action.user_id);

        if state.details.is_toxic() {
            self.apply_toxic_punishment(&state, &action.user_id);
        }

        let details = state.details;

        self.submit_event(TriviaEvent::CorrectSuperAnswer {
            action_id: action.action_id,
            game_id: details.game_id,
            remaining_queue_size: self.queued_game_store.size(&action.twitch_channel),
            twitch_channel: action.twitch_channel,
            user_id: action.user_id,
            user_name: action.user_name,
            answer: action.answer,
            emote: details.emote,
            points_for_winning: details.points_for_winning,
            special_status: details.special_status,
            question: details.question,
            score,
        });

        Ok(())
    }

    /// A failed score update still lets the game outcome be reported.
    fn record_win(&self, twitch_channel: &str, user_id: &str) -> Option<TriviaScoreResult> {
        match self.score_repository.increment_total_wins(twitch_channel, user_id) {
            Ok(score) => Some(score),
            Err(error) => {
                error!(
                    "Unable to record trivia win for {} in {}: {}",
                    user_id, twitch_channel, error
                );
                None
            }
        }
    }

    fn record_loss(&self, twitch_channel: &str, user_id: &str) -> Option<TriviaScoreResult> {
        match self.score_repository.increment_total_losses(twitch_channel, user_id) {
            Ok(score) => Some(score),
            Err(error) => {
                error!(
                    "Unable to record trivia loss for {} in {}: {}",
                    user_id, twitch_channel, error
                );
                None
            }
        }
    }

    fn apply_toxic_punishment(&self, state: &SuperTriviaGameState, winner_user_id: &str) {
        let punished_user_ids: Vec<String> = state
            .answered_user_ids()
            .into_iter()
            .filter(|user_id| !user_id.eq_ignore_ascii_case(winner_user_id))
            .collect();

        if punished_user_ids.is_empty() {
            return;
        }

        let punishment_points = state
            .regular_trivia_points_for_winning
            .saturating_mul(state.toxic_trivia_punishment_multiplier);

        info!(
            "Applying toxic trivia punishment of {} point(s) to {} user(s) in {}",
            punishment_points,
            punished_user_ids.len(),
            state.details.twitch_channel
        );

        self.toxic_helper.apply_toxic_punishment(
            &state.details.twitch_channel,
            winner_user_id,
            &punished_user_ids,
            punishment_points,
        );
    }

    fn handle_clear_super_trivia_queue(&mut self, action: ClearSuperTriviaQueueTriviaAction) {
        let result = self
            .queued_game_store
            .clear_queued_super_games(&action.twitch_channel);

        self.submit_event(TriviaEvent::ClearedSuperTriviaQueue {
            action_id: action.action_id,
            twitch_channel: action.twitch_channel,
            number_of_games_removed: result.amount_removed,
            previous_queue_size: result.old_queue_size,
        });
    }

    async fn refresh_status(&mut self) -> Result<(), TriviaError> {
        let expired = self.game_store.remove_expired(self.clock.now());

        for state in expired {
            match state {
                GameState::Normal(state) => self.handle_out_of_time(state),
                GameState::Super(state) => self.handle_out_of_time_super(state),
            }
        }

        let mut busy_channels = self.game_store.get_twitch_channels_with_active_super_games();
        busy_channels.extend(self.cooldown_helper.get_twitch_channels_in_cooldown()?);

        for action in self.queued_game_store.pop_queued_super_games(&busy_channels) {
            self.submit_event(TriviaEvent::SuperGameLaunchpad {
                action_id: action.action_id.clone(),
                twitch_channel: action.twitch_channel.clone(),
                remaining_queue_size: self.queued_game_store.size(&action.twitch_channel),
            });

            let action_id = action.action_id.clone();
            if let Err(error) = self.handle_start_new_super_game(action).await {
                error!("Failed to launch queued super trivia game {}: {}", action_id, error);
            }
        }

        self.refresh_spools_if_due().await
    }

    async fn refresh_spools_if_due(&mut self) -> Result<(), TriviaError> {
        let now = self.clock.now();
        if now < self.next_spool_refresh {
            return Ok(());
        }

        if let Err(error) = self.trivia_repository.refresh_spools().await {
            error!("Failed to refresh the trivia question spools: {}", error);
        }

        let interval = self.trivia_repository.spool_refresh_seconds()?;
        self.next_spool_refresh = now + chrono::Duration::seconds(interval);
        Ok(())
    }

    fn handle_out_of_time(&mut self, state: TriviaGameState) {
        let details = state.details;

        let score = self.record_loss(&details.twitch_channel, &state.user_id);

        info!(
            "Trivia game {} for {} in {} ran out of time",
            details.game_id, state.user_name, details.twitch_channel
        );

        self.submit_event(TriviaEvent::OutOfTime {
            action_id: details.action_id,
            game_id: details.game_id,
            twitch_channel: details.twitch_channel,
            user_id: state.user_id,
            user_name: state.user_name,
            emote: details.emote,
            question: details.question,
            score,
        });
    }

    fn handle_out_of_time_super(&mut self, state: SuperTriviaGameState) {
        let details = state.details;
        self.cooldown_helper.update(&details.twitch_channel);

        warn!(
            "Super trivia game {} in {} ran out of time",
            details.game_id, details.twitch_channel
        );

        self.submit_event(TriviaEvent::OutOfTimeSuperTrivia {
            action_id: details.action_id,
            game_id: details.game_id,
            remaining_queue_size: self.queued_game_store.size(&details.twitch_channel),
            twitch_channel: details.twitch_channel,
            emote: details.emote,
            points_for_winning: details.points_for_winning,
            question: details.question,
        });
    }
}
