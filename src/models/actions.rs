use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TriviaError;

use super::fetch_options::TriviaFetchOptions;

pub fn new_action_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn default_multiplier() -> u32 {
    1
}

fn require_non_blank(field: &str, value: &str) -> Result<(), TriviaError> {
    if value.trim().is_empty() {
        return Err(TriviaError::InvalidInput(format!("{} is blank", field)));
    }
    Ok(())
}

fn require_same_channel(
    twitch_channel: &str,
    fetch_options: &TriviaFetchOptions,
) -> Result<(), TriviaError> {
    if !fetch_options
        .twitch_channel
        .eq_ignore_ascii_case(twitch_channel)
    {
        return Err(TriviaError::InvalidInput(format!(
            "fetch options are for {}, not {}",
            fetch_options.twitch_channel, twitch_channel
        )));
    }
    Ok(())
}

fn require_at_least(field: &str, value: u32, minimum: u32) -> Result<(), TriviaError> {
    if value < minimum {
        return Err(TriviaError::InvalidInput(format!(
            "{} must be at least {}, got {}",
            field, minimum, value
        )));
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StartNewTriviaGameAction {
    #[serde(default = "new_action_id")]
    pub action_id: String,
    pub twitch_channel: String,
    pub user_id: String,
    pub user_name: String,
    pub points_for_winning: u32,
    pub seconds_to_live: u32,
    #[serde(default)]
    pub is_shiny_trivia_enabled: bool,
    #[serde(default = "default_multiplier")]
    pub shiny_multiplier: u32,
    pub fetch_options: TriviaFetchOptions,
}

impl StartNewTriviaGameAction {
    pub fn new(
        twitch_channel: &str,
        user_id: &str,
        user_name: &str,
        points_for_winning: u32,
        seconds_to_live: u32,
    ) -> StartNewTriviaGameAction {
        StartNewTriviaGameAction {
            action_id: new_action_id(),
            twitch_channel: twitch_channel.to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            points_for_winning,
            seconds_to_live,
            is_shiny_trivia_enabled: false,
            shiny_multiplier: 1,
            fetch_options: TriviaFetchOptions::new(twitch_channel),
        }
    }
}

/// A request for one or more super games. Copies that sit in the queued game
/// store are flagged consumed so they are never expanded a second time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StartNewSuperTriviaGameAction {
    #[serde(default = "new_action_id")]
    pub action_id: String,
    pub twitch_channel: String,
    #[serde(default)]
    pub is_queue_action_consumed: bool,
    pub number_of_games: u32,
    pub per_user_attempts: u32,
    pub points_for_winning: u32,
    pub regular_trivia_points_for_winning: u32,
    pub seconds_to_live: u32,
    #[serde(default)]
    pub is_shiny_trivia_enabled: bool,
    #[serde(default = "default_multiplier")]
    pub shiny_multiplier: u32,
    #[serde(default)]
    pub is_toxic_trivia_enabled: bool,
    #[serde(default = "default_multiplier")]
    pub toxic_multiplier: u32,
    #[serde(default = "default_multiplier")]
    pub toxic_trivia_punishment_multiplier: u32,
    pub fetch_options: TriviaFetchOptions,
}

impl StartNewSuperTriviaGameAction {
    pub fn new(
        twitch_channel: &str,
        number_of_games: u32,
        per_user_attempts: u32,
        points_for_winning: u32,
        seconds_to_live: u32,
    ) -> StartNewSuperTriviaGameAction {
        StartNewSuperTriviaGameAction {
            action_id: new_action_id(),
            twitch_channel: twitch_channel.to_string(),
            is_queue_action_consumed: false,
            number_of_games,
            per_user_attempts,
            points_for_winning,
            regular_trivia_points_for_winning: points_for_winning,
            seconds_to_live,
            is_shiny_trivia_enabled: false,
            shiny_multiplier: 1,
            is_toxic_trivia_enabled: false,
            toxic_multiplier: 1,
            toxic_trivia_punishment_multiplier: 1,
            fetch_options: TriviaFetchOptions::new(twitch_channel),
        }
    }

    /// A single consumed copy, as stored in the queued game store.
    pub fn queued_copy(&self) -> StartNewSuperTriviaGameAction {
        StartNewSuperTriviaGameAction {
            is_queue_action_consumed: true,
            number_of_games: 1,
            ..self.clone()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckAnswerTriviaAction {
    #[serde(default = "new_action_id")]
    pub action_id: String,
    pub twitch_channel: String,
    pub user_id: String,
    pub user_name: String,
    pub answer: String,
}

impl CheckAnswerTriviaAction {
    pub fn new(
        twitch_channel: &str,
        user_id: &str,
        user_name: &str,
        answer: &str,
    ) -> CheckAnswerTriviaAction {
        CheckAnswerTriviaAction {
            action_id: new_action_id(),
            twitch_channel: twitch_channel.to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            answer: answer.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClearSuperTriviaQueueTriviaAction {
    #[serde(default = "new_action_id")]
    pub action_id: String,
    pub twitch_channel: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", content = "data")]
pub enum TriviaAction {
    StartNewGame(StartNewTriviaGameAction),
    StartNewSuperGame(StartNewSuperTriviaGameAction),
    CheckAnswer(CheckAnswerTriviaAction),
    CheckSuperAnswer(CheckAnswerTriviaAction),
    ClearSuperTriviaQueue(ClearSuperTriviaQueueTriviaAction),
}

impl TriviaAction {
    pub fn action_id(&self) -> &str {
        match self {
            TriviaAction::StartNewGame(action) => &action.action_id,
            TriviaAction::StartNewSuperGame(action) => &action.action_id,
            TriviaAction::CheckAnswer(action) => &action.action_id,
            TriviaAction::CheckSuperAnswer(action) => &action.action_id,
            TriviaAction::ClearSuperTriviaQueue(action) => &action.action_id,
        }
    }

    pub fn twitch_channel(&self) -> &str {
        match self {
            TriviaAction::StartNewGame(action) => &action.twitch_channel,
            TriviaAction::StartNewSuperGame(action) => &action.twitch_channel,
            TriviaAction::CheckAnswer(action) => &action.twitch_channel,
            TriviaAction::CheckSuperAnswer(action) => &action.twitch_channel,
            TriviaAction::ClearSuperTriviaQueue(action) => &action.twitch_channel,
        }
    }

    /// Rejects malformed actions before they reach the action queue.
    pub fn validate(&self) -> Result<(), TriviaError> {
        require_non_blank("action id", self.action_id())?;
        require_non_blank("twitch channel", self.twitch_channel())?;

        match self {
            TriviaAction::StartNewGame(action) => {
                require_non_blank("user id", &action.user_id)?;
                require_non_blank("user name", &action.user_name)?;
                require_at_least("points for winning", action.points_for_winning, 1)?;
                require_at_least("seconds to live", action.seconds_to_live, 1)?;
                require_at_least("shiny multiplier", action.shiny_multiplier, 1)?;
                require_same_channel(&action.twitch_channel, &action.fetch_options)?;
            }
            TriviaAction::StartNewSuperGame(action) => {
                require_at_least("number of games", action.number_of_games, 1)?;
                require_at_least("per user attempts", action.per_user_attempts, 1)?;
                require_at_least("points for winning", action.points_for_winning, 1)?;
                require_at_least(
                    "regular trivia points for winning",
                    action.regular_trivia_points_for_winning,
                    1,
                )?;
                require_at_least("seconds to live", action.seconds_to_live, 1)?;
                require_at_least("shiny multiplier", action.shiny_multiplier, 1)?;
                require_at_least("toxic multiplier", action.toxic_multiplier, 1)?;
                require_same_channel(&action.twitch_channel, &action.fetch_options)?;
            }
            TriviaAction::CheckAnswer(action) | TriviaAction::CheckSuperAnswer(action) => {
                require_non_blank("user id", &action.user_id)?;
                require_non_blank("user name", &action.user_name)?;
            }
            TriviaAction::ClearSuperTriviaQueue(_) => (),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_malformed_input() {
        let action = TriviaAction::StartNewGame(StartNewTriviaGameAction::new(
            "smCharles", "42", "eddie", 0, 60,
        ));
        assert!(matches!(
            action.validate(),
            Err(TriviaError::InvalidInput(_))
        ));

        let action = TriviaAction::CheckAnswer(CheckAnswerTriviaAction::new(
            "smCharles", "", "eddie", "a",
        ));
        assert!(action.validate().is_err());

        let action = TriviaAction::StartNewSuperGame(StartNewSuperTriviaGameAction::new(
            "smCharles", 3, 2, 25, 90,
        ));
        assert!(action.validate().is_ok());
    }

    #[test]
    fn fetch_options_channel_has_to_match() {
        let mut action = StartNewTriviaGameAction::new("smCharles", "42", "eddie", 10, 60);
        action.fetch_options = TriviaFetchOptions::new("SMCHARLES");
        assert!(TriviaAction::StartNewGame(action.clone()).validate().is_ok());

        action.fetch_options = TriviaFetchOptions::new("imyt");
        assert!(matches!(
            TriviaAction::StartNewGame(action).validate(),
            Err(TriviaError::InvalidInput(_))
        ));

        let mut action = StartNewSuperTriviaGameAction::new("smCharles", 1, 2, 25, 90);
        action.fetch_options = TriviaFetchOptions::new("imyt");
        assert!(TriviaAction::StartNewSuperGame(action).validate().is_err());
    }

    #[test]
    fn queued_copy_is_single_and_consumed() {
        let action = StartNewSuperTriviaGameAction::new("smCharles", 3, 2, 25, 90);
        let copy = action.queued_copy();
        assert!(copy.is_queue_action_consumed);
        assert_eq!(copy.number_of_games, 1);
        assert_eq!(copy.action_id, action.action_id);
    }

    #[test]
    fn actions_parse_from_tagged_json() {
        let json = r#"{"action":"CheckAnswer","data":{"twitch_channel":"smCharles","user_id":"42","user_name":"eddie","answer":"d"}}"#;
        let action: TriviaAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.twitch_channel(), "smCharles");
        assert!(!action.action_id().is_empty());
    }
}
