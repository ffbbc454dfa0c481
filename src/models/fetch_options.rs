use serde::{Deserialize, Serialize};

use super::question::TriviaType;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionAnswerTriviaConditions {
    #[default]
    Allowed,
    NotAllowed,
    Required,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TriviaFetchOptions {
    pub twitch_channel: String,
    #[serde(default)]
    pub is_joke_trivia_repository_enabled: bool,
    #[serde(default)]
    pub question_answer_conditions: QuestionAnswerTriviaConditions,
}

impl TriviaFetchOptions {
    pub fn new(twitch_channel: &str) -> TriviaFetchOptions {
        TriviaFetchOptions {
            twitch_channel: twitch_channel.to_string(),
            is_joke_trivia_repository_enabled: false,
            question_answer_conditions: QuestionAnswerTriviaConditions::Allowed,
        }
    }

    pub fn with_question_answer_conditions(
        mut self,
        conditions: QuestionAnswerTriviaConditions,
    ) -> TriviaFetchOptions {
        self.question_answer_conditions = conditions;
        self
    }

    pub fn with_joke_trivia(mut self, enabled: bool) -> TriviaFetchOptions {
        self.is_joke_trivia_repository_enabled = enabled;
        self
    }

    pub fn requires_question_answer(&self) -> bool {
        self.question_answer_conditions == QuestionAnswerTriviaConditions::Required
    }

    /// Whether a question of `trivia_type` may be served under these options.
    pub fn is_trivia_type_allowed(&self, trivia_type: TriviaType) -> bool {
        match self.question_answer_conditions {
            QuestionAnswerTriviaConditions::Allowed => true,
            QuestionAnswerTriviaConditions::NotAllowed => trivia_type != TriviaType::QuestionAnswer,
            QuestionAnswerTriviaConditions::Required => trivia_type == TriviaType::QuestionAnswer,
        }
    }
}
