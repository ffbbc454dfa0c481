use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::TriviaError;

use super::question::Question;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialTriviaStatus {
    Shiny,
    Toxic,
}

/// Fields shared by normal and super games.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GameStateDetails {
    pub game_id: String,
    pub action_id: String,
    pub twitch_channel: String,
    pub emote: String,
    pub points_for_winning: u32,
    pub seconds_to_live: u32,
    pub end_time: DateTime<Utc>,
    pub special_status: Option<SpecialTriviaStatus>,
    pub question: Question,
}

impl GameStateDetails {
    pub fn new(
        action_id: &str,
        twitch_channel: &str,
        emote: &str,
        points_for_winning: u32,
        seconds_to_live: u32,
        special_status: Option<SpecialTriviaStatus>,
        question: Question,
        now: DateTime<Utc>,
    ) -> Result<GameStateDetails, TriviaError> {
        if twitch_channel.trim().is_empty() {
            return Err(TriviaError::InvalidInput("blank twitch channel".to_string()));
        }
        if points_for_winning < 1 {
            return Err(TriviaError::InvalidInput(format!(
                "points for winning must be at least 1, got {}",
                points_for_winning
            )));
        }
        if seconds_to_live < 1 {
            return Err(TriviaError::InvalidInput(format!(
                "seconds to live must be at least 1, got {}",
                seconds_to_live
            )));
        }

        Ok(GameStateDetails {
            game_id: Uuid::new_v4().simple().to_string(),
            action_id: action_id.to_string(),
            twitch_channel: twitch_channel.to_string(),
            emote: emote.to_string(),
            points_for_winning,
            seconds_to_live,
            end_time: now + Duration::seconds(i64::from(seconds_to_live)),
            special_status,
            question,
        })
    }

    pub fn is_shiny(&self) -> bool {
        self.special_status == Some(SpecialTriviaStatus::Shiny)
    }

    pub fn is_toxic(&self) -> bool {
        self.special_status == Some(SpecialTriviaStatus::Toxic)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TriviaGameState {
    pub details: GameStateDetails,
    pub user_id: String,
    pub user_name: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SuperTriviaGameState {
    pub details: GameStateDetails,
    pub per_user_attempts: u32,
    pub regular_trivia_points_for_winning: u32,
    pub toxic_trivia_punishment_multiplier: u32,
    answer_counts: HashMap<String, u32>,
}

impl SuperTriviaGameState {
    pub fn new(
        details: GameStateDetails,
        per_user_attempts: u32,
        regular_trivia_points_for_winning: u32,
        toxic_trivia_punishment_multiplier: u32,
    ) -> Result<SuperTriviaGameState, TriviaError> {
        if per_user_attempts < 1 {
            return Err(TriviaError::InvalidInput(format!(
                "per user attempts must be at least 1, got {}",
                per_user_attempts
            )));
        }

        Ok(SuperTriviaGameState {
            details,
            per_user_attempts,
            regular_trivia_points_for_winning,
            toxic_trivia_punishment_multiplier,
            answer_counts: HashMap::new(),
        })
    }

    pub fn is_eligible_to_answer(&self, user_id: &str) -> bool {
        self.attempts_used(user_id) < self.per_user_attempts
    }

    pub fn attempts_used(&self, user_id: &str) -> u32 {
        self.answer_counts
            .get(&user_id.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Saturates at `per_user_attempts`.
    pub fn increment_answer_count(&mut self, user_id: &str) {
        let count = self.answer_counts.entry(user_id.to_lowercase()).or_insert(0);
        if *count < self.per_user_attempts {
            *count += 1;
        }
    }

    pub fn answered_user_ids(&self) -> Vec<String> {
        let mut user_ids: Vec<String> = self.answer_counts.keys().cloned().collect();
        user_ids.sort();
        user_ids
    }

    pub fn total_attempts_used(&self) -> u32 {
        self.answer_counts.values().sum()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum GameState {
    Normal(TriviaGameState),
    Super(SuperTriviaGameState),
}

impl GameState {
    pub fn details(&self) -> &GameStateDetails {
        match self {
            GameState::Normal(state) => &state.details,
            GameState::Super(state) => &state.details,
        }
    }

    pub fn twitch_channel(&self) -> &str {
        &self.details().twitch_channel
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.details().end_time
    }

    pub fn is_super(&self) -> bool {
        matches!(self, GameState::Super(_))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::question::{QuestionKind, TriviaDifficulty, TriviaSource};

    fn question() -> Question {
        Question::new(
            "abc".to_string(),
            TriviaSource::Bongo,
            TriviaDifficulty::Easy,
            None,
            "Is the sky blue?".to_string(),
            QuestionKind::TrueFalse {
                correct_answers: BTreeSet::from([true]),
            },
        )
        .unwrap()
    }

    #[test]
    fn details_compute_end_time_and_validate() {
        let now = Utc::now();
        let details =
            GameStateDetails::new("action", "smCharles", "🧮", 5, 60, None, question(), now)
                .unwrap();
        assert_eq!(details.end_time, now + Duration::seconds(60));
        assert!(!details.game_id.is_empty());

        assert!(GameStateDetails::new("action", "smCharles", "🧮", 0, 60, None, question(), now)
            .is_err());
        assert!(GameStateDetails::new("action", "  ", "🧮", 5, 60, None, question(), now).is_err());
    }

    #[test]
    fn details_serialize_end_time_as_a_timestamp() {
        let details =
            GameStateDetails::new("action", "smCharles", "🧮", 5, 60, None, question(), Utc::now())
                .unwrap();

        let json = serde_json::to_value(&details).unwrap();
        let end_time: DateTime<Utc> = json["end_time"].as_str().unwrap().parse().unwrap();
        assert_eq!(end_time, details.end_time);
    }

    #[test]
    fn super_attempts_are_bounded_per_user() {
        let details =
            GameStateDetails::new("action", "smCharles", "🧮", 5, 60, None, question(), Utc::now())
                .unwrap();
        let mut state = SuperTriviaGameState::new(details, 2, 5, 1).unwrap();

        assert!(state.is_eligible_to_answer("Eddie"));
        state.increment_answer_count("Eddie");
        state.increment_answer_count("eddie");
        state.increment_answer_count("EDDIE");
        assert!(!state.is_eligible_to_answer("eddie"));
        assert_eq!(state.attempts_used("eddie"), 2);
        assert!(state.is_eligible_to_answer("imyt"));
        assert_eq!(state.answered_user_ids(), vec!["eddie".to_string()]);
        assert!(state.total_attempts_used() <= state.per_user_attempts);
    }
}
