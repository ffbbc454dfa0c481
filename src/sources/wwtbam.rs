use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use log::info;

use crate::{
    errors::TriviaError,
    models::{
        fetch_options::TriviaFetchOptions,
        question::{Question, TriviaDifficulty, TriviaSource, TriviaType},
    },
};

use super::{
    malformed,
    question_set_file::{column_text, QuestionSetFile},
    QuestionDraft, QuestionSource, TriviaQuestionBuilder,
};

#[derive(Debug)]
struct WwtbamRow {
    correct_answer: Option<String>,
    question: Option<String>,
    responses: [Option<String>; 4],
    trivia_id: Option<String>,
}

/// Who Wants to Be a Millionaire questions; the correct response is stored as a letter A..D.
pub struct WwtbamQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    question_set: QuestionSetFile,
}

impl WwtbamQuestionSource {
    pub fn new(builder: Arc<TriviaQuestionBuilder>, database_file: impl AsRef<Path>) -> WwtbamQuestionSource {
        WwtbamQuestionSource {
            builder,
            question_set: QuestionSetFile::new(TriviaSource::Wwtbam, database_file),
        }
    }
}

#[async_trait]
impl QuestionSource for WwtbamQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::Wwtbam
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[TriviaType::MultipleChoice]
    }

    fn has_question_set_available(&self) -> bool {
        self.question_set.is_available()
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        info!("Fetching WWTBAM trivia question for {}", fetch_options.twitch_channel);

        let row = self.question_set.fetch_random_row(
            "SELECT correctAnswer, question, responseA, responseB, responseC, responseD, triviaId FROM wwtbamTriviaQuestions
            ORDER BY RANDOM()
            LIMIT 1",
            |row| {
                Ok(WwtbamRow {
                    correct_answer: column_text(row, 0)?,
                    question: column_text(row, 1)?,
                    responses: [
                        column_text(row, 2)?,
                        column_text(row, 3)?,
                        column_text(row, 4)?,
                        column_text(row, 5)?,
                    ],
                    trivia_id: column_text(row, 6)?,
                })
            },
        )?;

        self.builder.log_payload(TriviaSource::Wwtbam, &row);

        let (Some(question), Some(trivia_id)) = (row.question, row.trivia_id) else {
            return Err(malformed(TriviaSource::Wwtbam, "row is missing required columns"));
        };

        let letter = row.correct_answer.unwrap_or_default().trim().to_lowercase();
        let index = match letter.as_str() {
            "a" => 0,
            "b" => 1,
            "c" => 2,
            "d" => 3,
            _ => {
                return Err(malformed(
                    TriviaSource::Wwtbam,
                    format!("unknown correct answer letter \"{}\"", letter),
                ))
            }
        };

        let correct_answer = row.responses[index].clone().ok_or(TriviaError::NoTriviaCorrectAnswers {
            trivia_source: TriviaSource::Wwtbam,
        })?;

        let compiler = self.builder.question_compiler();
        let responses: Vec<String> = row.responses.into_iter().flatten().collect();

        self.builder.multiple_choice(
            QuestionDraft {
                trivia_id,
                trivia_source: TriviaSource::Wwtbam,
                difficulty: TriviaDifficulty::Unknown,
                category: None,
                question: compiler.compile_question(&question, false),
            },
            vec![compiler.compile_response(&correct_answer, false)],
            compiler.compile_responses(&responses, false),
        )
    }
}
