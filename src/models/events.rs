use serde::Serialize;

use super::{game_state::SpecialTriviaStatus, question::Question, score::TriviaScoreResult};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum TriviaEvent {
    CorrectAnswer {
        action_id: String,
        game_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
        answer: String,
        emote: String,
        points_for_winning: u32,
        special_status: Option<SpecialTriviaStatus>,
        question: Question,
        score: Option<TriviaScoreResult>,
    },
    IncorrectAnswer {
        action_id: String,
        game_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
        answer: String,
        emote: String,
        question: Question,
        score: Option<TriviaScoreResult>,
    },
    InvalidAnswerInput {
        action_id: String,
        game_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
        answer: String,
        emote: String,
        question: Question,
    },
    GameNotReadyCheckAnswer {
        action_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
        answer: String,
    },
    WrongUserCheckAnswer {
        action_id: String,
        game_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
        answer: String,
    },
    OutOfTime {
        action_id: String,
        game_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
        emote: String,
        question: Question,
        score: Option<TriviaScoreResult>,
    },
    NewGame {
        action_id: String,
        game_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
        emote: String,
        points_for_winning: u32,
        seconds_to_live: u32,
        special_status: Option<SpecialTriviaStatus>,
        question: Question,
    },
    NewSuperGame {
        action_id: String,
        game_id: String,
        twitch_channel: String,
        emote: String,
        points_for_winning: u32,
        per_user_attempts: u32,
        seconds_to_live: u32,
        special_status: Option<SpecialTriviaStatus>,
        question: Question,
    },
    NewQueuedSuperGame {
        action_id: String,
        twitch_channel: String,
        number_of_games: u32,
        points_for_winning: u32,
        seconds_to_live: u32,
    },
    CorrectSuperAnswer {
        action_id: String,
        game_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
        answer: String,
        emote: String,
        points_for_winning: u32,
        special_status: Option<SpecialTriviaStatus>,
        remaining_queue_size: usize,
        question: Question,
        score: Option<TriviaScoreResult>,
    },
    IncorrectSuperAnswer {
        action_id: String,
        game_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
        answer: String,
        emote: String,
        question: Question,
    },
    SuperGameNotReadyCheckAnswer {
        action_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
        answer: String,
    },
    OutOfTimeSuperTrivia {
        action_id: String,
        game_id: String,
        twitch_channel: String,
        emote: String,
        points_for_winning: u32,
        remaining_queue_size: usize,
        question: Question,
    },
    FailedToFetchQuestion {
        action_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
    },
    FailedToFetchQuestionSuper {
        action_id: String,
        twitch_channel: String,
    },
    GameAlreadyInProgress {
        action_id: String,
        game_id: String,
        twitch_channel: String,
        user_id: String,
        user_name: String,
    },
    SuperGameAlreadyInProgress {
        action_id: String,
        game_id: String,
        twitch_channel: String,
    },
    SuperGameLaunchpad {
        action_id: String,
        twitch_channel: String,
        remaining_queue_size: usize,
    },
    ClearedSuperTriviaQueue {
        action_id: String,
        twitch_channel: String,
        number_of_games_removed: usize,
        previous_queue_size: usize,
    },
}

impl TriviaEvent {
    pub fn action_id(&self) -> &str {
        match self {
            TriviaEvent::CorrectAnswer { action_id, .. }
            | TriviaEvent::IncorrectAnswer { action_id, .. }
            | TriviaEvent::InvalidAnswerInput { action_id, .. }
            | TriviaEvent::GameNotReadyCheckAnswer { action_id, .. }
            | TriviaEvent::WrongUserCheckAnswer { action_id, .. }
            | TriviaEvent::OutOfTime { action_id, .. }
            | TriviaEvent::NewGame { action_id, .. }
            | TriviaEvent::NewSuperGame { action_id, .. }
            | TriviaEvent::NewQueuedSuperGame { action_id, .. }
            | TriviaEvent::CorrectSuperAnswer { action_id, .. }
            | TriviaEvent::IncorrectSuperAnswer { action_id, .. }
            | TriviaEvent::SuperGameNotReadyCheckAnswer { action_id, .. }
            | TriviaEvent::OutOfTimeSuperTrivia { action_id, .. }
            | TriviaEvent::FailedToFetchQuestion { action_id, .. }
            | TriviaEvent::FailedToFetchQuestionSuper { action_id, .. }
            | TriviaEvent::GameAlreadyInProgress { action_id, .. }
            | TriviaEvent::SuperGameAlreadyInProgress { action_id, .. }
            | TriviaEvent::SuperGameLaunchpad { action_id, .. }
            | TriviaEvent::ClearedSuperTriviaQueue { action_id, .. } => action_id,
        }
    }

    pub fn twitch_channel(&self) -> &str {
        match self {
            TriviaEvent::CorrectAnswer { twitch_channel, .. }
            | TriviaEvent::IncorrectAnswer { twitch_channel, .. }
            | TriviaEvent::InvalidAnswerInput { twitch_channel, .. }
            | TriviaEvent::GameNotReadyCheckAnswer { twitch_channel, .. }
            | TriviaEvent::WrongUserCheckAnswer { twitch_channel, .. }
            | TriviaEvent::OutOfTime { twitch_channel, .. }
            | TriviaEvent::NewGame { twitch_channel, .. }
            | TriviaEvent::NewSuperGame { twitch_channel, .. }
            | TriviaEvent::NewQueuedSuperGame { twitch_channel, .. }
            | TriviaEvent::CorrectSuperAnswer { twitch_channel, .. }
            | TriviaEvent::IncorrectSuperAnswer { twitch_channel, .. }
            | TriviaEvent::SuperGameNotReadyCheckAnswer { twitch_channel, .. }
            | TriviaEvent::OutOfTimeSuperTrivia { twitch_channel, .. }
            | TriviaEvent::FailedToFetchQuestion { twitch_channel, .. }
            | TriviaEvent::FailedToFetchQuestionSuper { twitch_channel, .. }
            | TriviaEvent::GameAlreadyInProgress { twitch_channel, .. }
            | TriviaEvent::SuperGameAlreadyInProgress { twitch_channel, .. }
            | TriviaEvent::SuperGameLaunchpad { twitch_channel, .. }
            | TriviaEvent::ClearedSuperTriviaQueue { twitch_channel, .. } => twitch_channel,
        }
    }

    /// Short variant name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            TriviaEvent::CorrectAnswer { .. } => "CorrectAnswer",
            TriviaEvent::IncorrectAnswer { .. } => "IncorrectAnswer",
            TriviaEvent::InvalidAnswerInput { .. } => "InvalidAnswerInput",
            TriviaEvent::GameNotReadyCheckAnswer { .. } => "GameNotReadyCheckAnswer",
            TriviaEvent::WrongUserCheckAnswer { .. } => "WrongUserCheckAnswer",
            TriviaEvent::OutOfTime { .. } => "OutOfTime",
            TriviaEvent::NewGame { .. } => "NewGame",
            TriviaEvent::NewSuperGame { .. } => "NewSuperGame",
            TriviaEvent::NewQueuedSuperGame { .. } => "NewQueuedSuperGame",
            TriviaEvent::CorrectSuperAnswer { .. } => "CorrectSuperAnswer",
            TriviaEvent::IncorrectSuperAnswer { .. } => "IncorrectSuperAnswer",
            TriviaEvent::SuperGameNotReadyCheckAnswer { .. } => "SuperGameNotReadyCheckAnswer",
            TriviaEvent::OutOfTimeSuperTrivia { .. } => "OutOfTimeSuperTrivia",
            TriviaEvent::FailedToFetchQuestion { .. } => "FailedToFetchQuestion",
            TriviaEvent::FailedToFetchQuestionSuper { .. } => "FailedToFetchQuestionSuper",
            TriviaEvent::GameAlreadyInProgress { .. } => "GameAlreadyInProgress",
            TriviaEvent::SuperGameAlreadyInProgress { .. } => "SuperGameAlreadyInProgress",
            TriviaEvent::SuperGameLaunchpad { .. } => "SuperGameLaunchpad",
            TriviaEvent::ClearedSuperTriviaQueue { .. } => "ClearedSuperTriviaQueue",
        }
    }
}
