use std::fmt;

use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaContentCode {
    Ok,
    IsNone,
    IsBanned,
    IllegalTriviaType,
    ContainsEmptyStr,
    ContainsUrl,
    ContainsBannedWord,
    QuestionTooLong,
    AnswerTooLong,
    TooFewMultipleChoiceResponses,
    Repeat,
}

impl TriviaContentCode {
    pub fn is_ok(&self) -> bool {
        *self == TriviaContentCode::Ok
    }
}

impl fmt::Display for TriviaContentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TriviaContentCode::Ok => "OK",
            TriviaContentCode::IsNone => "IS_NONE",
            TriviaContentCode::IsBanned => "IS_BANNED",
            TriviaContentCode::IllegalTriviaType => "ILLEGAL_TRIVIA_TYPE",
            TriviaContentCode::ContainsEmptyStr => "CONTAINS_EMPTY_STR",
            TriviaContentCode::ContainsUrl => "CONTAINS_URL",
            TriviaContentCode::ContainsBannedWord => "CONTAINS_BANNED_WORD",
            TriviaContentCode::QuestionTooLong => "QUESTION_TOO_LONG",
            TriviaContentCode::AnswerTooLong => "ANSWER_TOO_LONG",
            TriviaContentCode::TooFewMultipleChoiceResponses => "TOO_FEW_MULTIPLE_CHOICE_RESPONSES",
            TriviaContentCode::Repeat => "REPEAT",
        };
        f.write_str(text)
    }
}
