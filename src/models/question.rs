use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::TriviaError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TriviaSource {
    Bongo,
    Funtoon,
    JokeTriviaRepository,
    JService,
    LordOfTheRings,
    Millionaire,
    OpenTriviaDatabase,
    OpenTriviaQa,
    Pokemon,
    QuizApi,
    TriviaDatabase,
    TriviaQuestionCompany,
    WillFryTrivia,
    Wwtbam,
}

impl TriviaSource {
    pub const ALL: [TriviaSource; 14] = [
        TriviaSource::Bongo,
        TriviaSource::Funtoon,
        TriviaSource::JokeTriviaRepository,
        TriviaSource::JService,
        TriviaSource::LordOfTheRings,
        TriviaSource::Millionaire,
        TriviaSource::OpenTriviaDatabase,
        TriviaSource::OpenTriviaQa,
        TriviaSource::Pokemon,
        TriviaSource::QuizApi,
        TriviaSource::TriviaDatabase,
        TriviaSource::TriviaQuestionCompany,
        TriviaSource::WillFryTrivia,
        TriviaSource::Wwtbam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriviaSource::Bongo => "BONGO",
            TriviaSource::Funtoon => "FUNTOON",
            TriviaSource::JokeTriviaRepository => "JOKE_TRIVIA_REPOSITORY",
            TriviaSource::JService => "J_SERVICE",
            TriviaSource::LordOfTheRings => "LORD_OF_THE_RINGS",
            TriviaSource::Millionaire => "MILLIONAIRE",
            TriviaSource::OpenTriviaDatabase => "OPEN_TRIVIA_DATABASE",
            TriviaSource::OpenTriviaQa => "OPEN_TRIVIA_QA",
            TriviaSource::Pokemon => "POKE_API",
            TriviaSource::QuizApi => "QUIZ_API",
            TriviaSource::TriviaDatabase => "TRIVIA_DATABASE",
            TriviaSource::TriviaQuestionCompany => "THE_QUESTION_CO",
            TriviaSource::WillFryTrivia => "WILL_FRY_TRIVIA",
            TriviaSource::Wwtbam => "WWTBAM",
        }
    }
}

impl fmt::Display for TriviaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriviaSource {
    type Err = TriviaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let source = match text.trim().to_lowercase().as_str() {
            "bongo" => TriviaSource::Bongo,
            "funtoon" => TriviaSource::Funtoon,
            "joke_trivia_repository" => TriviaSource::JokeTriviaRepository,
            "j_service" => TriviaSource::JService,
            "lord_of_the_rings" => TriviaSource::LordOfTheRings,
            "millionaire" => TriviaSource::Millionaire,
            "open_trivia" | "open_trivia_database" => TriviaSource::OpenTriviaDatabase,
            "open_trivia_qa" => TriviaSource::OpenTriviaQa,
            "poke_api" | "pokemon" => TriviaSource::Pokemon,
            "quiz_api" => TriviaSource::QuizApi,
            "trivia_database" => TriviaSource::TriviaDatabase,
            "the_question_co" | "trivia_question_company" => TriviaSource::TriviaQuestionCompany,
            "will_fry_trivia" | "will_fry_trivia_api" => TriviaSource::WillFryTrivia,
            "wwtbam" => TriviaSource::Wwtbam,
            other => {
                return Err(TriviaError::InvalidInput(format!(
                    "unknown trivia source \"{}\"",
                    other
                )))
            }
        };

        Ok(source)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaType {
    MultipleChoice,
    QuestionAnswer,
    TrueFalse,
}

impl TriviaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriviaType::MultipleChoice => "MULTIPLE_CHOICE",
            TriviaType::QuestionAnswer => "QUESTION_ANSWER",
            TriviaType::TrueFalse => "TRUE_FALSE",
        }
    }
}

impl fmt::Display for TriviaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriviaType {
    type Err = TriviaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_lowercase().as_str() {
            "multiple" | "multiple choice" | "multiple_choice" | "multiple-choice" => {
                Ok(TriviaType::MultipleChoice)
            }
            "boolean" | "true false" | "true_false" | "true-false" => Ok(TriviaType::TrueFalse),
            "question answer" | "question_answer" | "question-answer" => {
                Ok(TriviaType::QuestionAnswer)
            }
            other => Err(TriviaError::InvalidInput(format!(
                "unknown trivia type \"{}\"",
                other
            ))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaDifficulty {
    Easy,
    Medium,
    Hard,
    Unknown,
}

impl TriviaDifficulty {
    pub fn from_int(value: i64) -> TriviaDifficulty {
        match value {
            1 => TriviaDifficulty::Easy,
            2 => TriviaDifficulty::Medium,
            3 => TriviaDifficulty::Hard,
            _ => TriviaDifficulty::Unknown,
        }
    }

    /// Lenient parse for upstream data, where a missing difficulty is common.
    pub fn from_str_or_unknown(text: Option<&str>) -> TriviaDifficulty {
        text.and_then(|text| text.parse().ok())
            .unwrap_or(TriviaDifficulty::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TriviaDifficulty::Easy => "easy",
            TriviaDifficulty::Medium => "medium",
            TriviaDifficulty::Hard => "hard",
            TriviaDifficulty::Unknown => "unknown",
        }
    }
}

impl FromStr for TriviaDifficulty {
    type Err = TriviaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_lowercase().as_str() {
            "easy" => Ok(TriviaDifficulty::Easy),
            "medium" => Ok(TriviaDifficulty::Medium),
            "hard" => Ok(TriviaDifficulty::Hard),
            "unknown" => Ok(TriviaDifficulty::Unknown),
            other => Err(TriviaError::InvalidInput(format!(
                "unknown trivia difficulty \"{}\"",
                other
            ))),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum QuestionKind {
    MultipleChoice {
        responses: Vec<String>,
        correct_answer_ordinals: BTreeSet<usize>,
    },
    TrueFalse {
        correct_answers: BTreeSet<bool>,
    },
    QuestionAnswer {
        correct_answers: Vec<String>,
        cleaned_correct_answers: Vec<String>,
    },
}

impl QuestionKind {
    /// Resolves each correct answer to its position in `responses` (case-insensitive).
    pub fn multiple_choice(
        correct_answers: &[String],
        responses: Vec<String>,
    ) -> Result<QuestionKind, TriviaError> {
        let mut correct_answer_ordinals = BTreeSet::new();

        for correct_answer in correct_answers {
            let ordinal = responses
                .iter()
                .position(|response| response.eq_ignore_ascii_case(correct_answer))
                .ok_or_else(|| {
                    TriviaError::InvalidInput(format!(
                        "correct answer \"{}\" is missing from responses {:?}",
                        correct_answer, responses
                    ))
                })?;
            correct_answer_ordinals.insert(ordinal);
        }

        Ok(QuestionKind::MultipleChoice {
            responses,
            correct_answer_ordinals,
        })
    }

    pub fn trivia_type(&self) -> TriviaType {
        match self {
            QuestionKind::MultipleChoice { .. } => TriviaType::MultipleChoice,
            QuestionKind::TrueFalse { .. } => TriviaType::TrueFalse,
            QuestionKind::QuestionAnswer { .. } => TriviaType::QuestionAnswer,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Question {
    pub trivia_id: String,
    pub trivia_source: TriviaSource,
    pub difficulty: TriviaDifficulty,
    pub category: Option<String>,
    pub question: String,
    pub kind: QuestionKind,
}

impl Question {
    pub fn new(
        trivia_id: String,
        trivia_source: TriviaSource,
        difficulty: TriviaDifficulty,
        category: Option<String>,
        question: String,
        kind: QuestionKind,
    ) -> Result<Question, TriviaError> {
        if trivia_id.trim().is_empty() {
            return Err(TriviaError::InvalidInput(format!(
                "blank trivia id from {}",
                trivia_source
            )));
        }
        if question.trim().is_empty() {
            return Err(TriviaError::InvalidInput(format!(
                "blank question text from {}",
                trivia_source
            )));
        }

        match &kind {
            QuestionKind::MultipleChoice {
                responses,
                correct_answer_ordinals,
            } => {
                if responses.len() < 2 {
                    return Err(TriviaError::InvalidInput(format!(
                        "multiple choice question needs at least 2 responses, got {}",
                        responses.len()
                    )));
                }
                if correct_answer_ordinals.is_empty()
                    || correct_answer_ordinals
                        .iter()
                        .any(|ordinal| *ordinal >= responses.len())
                {
                    return Err(TriviaError::NoTriviaCorrectAnswers { trivia_source });
                }
            }
            QuestionKind::TrueFalse { correct_answers } => {
                if correct_answers.is_empty() {
                    return Err(TriviaError::NoTriviaCorrectAnswers { trivia_source });
                }
            }
            QuestionKind::QuestionAnswer {
                cleaned_correct_answers,
                ..
            } => {
                if cleaned_correct_answers.is_empty() {
                    return Err(TriviaError::NoTriviaCorrectAnswers { trivia_source });
                }
            }
        }

        let category = category.filter(|category| !category.trim().is_empty());

        Ok(Question {
            trivia_id,
            trivia_source,
            difficulty,
            category,
            question,
            kind,
        })
    }

    pub fn trivia_type(&self) -> TriviaType {
        self.kind.trivia_type()
    }

    /// Human readable correct answers, in response order.
    pub fn correct_answers(&self) -> Vec<String> {
        match &self.kind {
            QuestionKind::MultipleChoice {
                responses,
                correct_answer_ordinals,
            } => correct_answer_ordinals
                .iter()
                .filter_map(|ordinal| responses.get(*ordinal).cloned())
                .collect(),
            QuestionKind::TrueFalse { correct_answers } => correct_answers
                .iter()
                .map(|answer| answer.to_string())
                .collect(),
            QuestionKind::QuestionAnswer {
                correct_answers, ..
            } => correct_answers.clone(),
        }
    }

    pub fn responses(&self) -> Vec<String> {
        match &self.kind {
            QuestionKind::MultipleChoice { responses, .. } => responses.clone(),
            QuestionKind::TrueFalse { .. } => vec!["true".to_string(), "false".to_string()],
            QuestionKind::QuestionAnswer { .. } => Vec::new(),
        }
    }

    /// The question as it should be shown in chat, e.g. `What is 2+2? [A] 3 [B] 4`.
    pub fn prompt(&self) -> String {
        match &self.kind {
            QuestionKind::MultipleChoice { responses, .. } => {
                let choices: Vec<String> = responses
                    .iter()
                    .enumerate()
                    .map(|(index, response)| {
                        let letter = (b'A' + (index % 26) as u8) as char;
                        format!("[{}] {}", letter, response)
                    })
                    .collect();
                format!("{} {}", self.question, choices.join(" "))
            }
            QuestionKind::TrueFalse { .. } => format!("True or false! {}", self.question),
            QuestionKind::QuestionAnswer { .. } => match &self.category {
                Some(category) => format!("({}) {}", category, self.question),
                None => self.question.clone(),
            },
        }
    }
}
