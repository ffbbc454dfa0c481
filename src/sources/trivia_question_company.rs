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
    question_set_file::{column_difficulty, column_text, QuestionSetFile},
    QuestionDraft, QuestionSource, TriviaQuestionBuilder,
};

#[derive(Debug)]
struct TriviaQuestionCompanyRow {
    category: Option<String>,
    correct_answer_index: Option<i64>,
    difficulty: TriviaDifficulty,
    question: Option<String>,
    question_id: Option<String>,
    question_type: Option<String>,
    responses: Vec<Option<String>>,
}

/// Multiple choice questions whose correct response is stored by index.
pub struct TriviaQuestionCompanyQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    question_set: QuestionSetFile,
}

impl TriviaQuestionCompanyQuestionSource {
    pub fn new(
        builder: Arc<TriviaQuestionBuilder>,
        database_file: impl AsRef<Path>,
    ) -> TriviaQuestionCompanyQuestionSource {
        TriviaQuestionCompanyQuestionSource {
            builder,
            question_set: QuestionSetFile::new(TriviaSource::TriviaQuestionCompany, database_file),
        }
    }
}

#[async_trait]
impl QuestionSource for TriviaQuestionCompanyQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::TriviaQuestionCompany
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
        info!(
            "Fetching Trivia Question Company question for {}",
            fetch_options.twitch_channel
        );

        let row = self.question_set.fetch_random_row(
            "SELECT category, correctAnswerIndex, difficulty, question, questionId, questionType, response0, response1, response2, response3 FROM tqcQuestions
            ORDER BY RANDOM()
            LIMIT 1",
            |row| {
                Ok(TriviaQuestionCompanyRow {
                    category: column_text(row, 0)?,
                    correct_answer_index: row.get(1)?,
                    difficulty: column_difficulty(row, 2)?,
                    question: column_text(row, 3)?,
                    question_id: column_text(row, 4)?,
                    question_type: column_text(row, 5)?,
                    responses: vec![
                        column_text(row, 6)?,
                        column_text(row, 7)?,
                        column_text(row, 8)?,
                        column_text(row, 9)?,
                    ],
                })
            },
        )?;

        self.builder.log_payload(TriviaSource::TriviaQuestionCompany, &row);

        let (Some(question), Some(trivia_id)) = (row.question, row.question_id) else {
            return Err(malformed(
                TriviaSource::TriviaQuestionCompany,
                "row is missing required columns",
            ));
        };

        let trivia_type = row
            .question_type
            .as_deref()
            .and_then(|question_type| question_type.parse::<TriviaType>().ok());
        if trivia_type != Some(TriviaType::MultipleChoice) {
            return Err(malformed(
                TriviaSource::TriviaQuestionCompany,
                format!("unsupported question type {:?}", row.question_type),
            ));
        }

        let correct_answer = row
            .correct_answer_index
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| row.responses.get(index).cloned().flatten())
            .ok_or(TriviaError::NoTriviaCorrectAnswers {
                trivia_source: TriviaSource::TriviaQuestionCompany,
            })?;

        let compiler = self.builder.question_compiler();
        let responses: Vec<String> = row.responses.into_iter().flatten().collect();

        self.builder.multiple_choice(
            QuestionDraft {
                trivia_id,
                trivia_source: TriviaSource::TriviaQuestionCompany,
                difficulty: row.difficulty,
                category: compiler.compile_category(row.category.as_deref(), false),
                question: compiler.compile_question(&question, false),
            },
            vec![compiler.compile_response(&correct_answer, false)],
            compiler.compile_responses(&responses, false),
        )
    }
}
