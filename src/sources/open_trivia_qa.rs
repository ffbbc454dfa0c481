use std::{collections::BTreeSet, path::Path, sync::Arc};

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
    malformed, parse_bool,
    question_set_file::{column_text, QuestionSetFile},
    QuestionDraft, QuestionSource, TriviaQuestionBuilder,
};

#[derive(Debug)]
struct OpenTriviaQaRow {
    correct_answer: Option<String>,
    category: Option<String>,
    question: Option<String>,
    question_id: Option<String>,
    question_type: Option<String>,
    responses: Vec<Option<String>>,
}

pub struct OpenTriviaQaQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    question_set: QuestionSetFile,
}

impl OpenTriviaQaQuestionSource {
    pub fn new(
        builder: Arc<TriviaQuestionBuilder>,
        database_file: impl AsRef<Path>,
    ) -> OpenTriviaQaQuestionSource {
        OpenTriviaQaQuestionSource {
            builder,
            question_set: QuestionSetFile::new(TriviaSource::OpenTriviaQa, database_file),
        }
    }
}

#[async_trait]
impl QuestionSource for OpenTriviaQaQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::OpenTriviaQa
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[TriviaType::MultipleChoice, TriviaType::TrueFalse]
    }

    fn has_question_set_available(&self) -> bool {
        self.question_set.is_available()
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        info!("Fetching OpenTriviaQA question for {}", fetch_options.twitch_channel);

        let row = self.question_set.fetch_random_row(
            "SELECT correctAnswer, newCategory, question, questionId, questionType, response1, response2, response3, response4 FROM triviaQuestions
            ORDER BY RANDOM()
            LIMIT 1",
            |row| {
                Ok(OpenTriviaQaRow {
                    correct_answer: column_text(row, 0)?,
                    category: column_text(row, 1)?,
                    question: column_text(row, 2)?,
                    question_id: column_text(row, 3)?,
                    question_type: column_text(row, 4)?,
                    responses: vec![
                        column_text(row, 5)?,
                        column_text(row, 6)?,
                        column_text(row, 7)?,
                        column_text(row, 8)?,
                    ],
                })
            },
        )?;

        self.builder.log_payload(TriviaSource::OpenTriviaQa, &row);

        let (Some(correct_answer), Some(question), Some(trivia_id), Some(question_type)) =
            (row.correct_answer, row.question, row.question_id, row.question_type)
        else {
            return Err(malformed(TriviaSource::OpenTriviaQa, "row is missing required columns"));
        };

        let trivia_type: TriviaType = question_type.parse().map_err(|_| {
            malformed(
                TriviaSource::OpenTriviaQa,
                format!("unknown question type \"{}\"", question_type),
            )
        })?;

        let compiler = self.builder.question_compiler();
        let draft = QuestionDraft {
            trivia_id,
            trivia_source: TriviaSource::OpenTriviaQa,
            difficulty: TriviaDifficulty::Unknown,
            category: compiler.compile_category(row.category.as_deref(), false),
            question: compiler.compile_question(&question, false),
        };

        match trivia_type {
            TriviaType::MultipleChoice => {
                let responses: Vec<String> = row.responses.into_iter().flatten().collect();
                self.builder.multiple_choice(
                    draft,
                    vec![compiler.compile_response(&correct_answer, false)],
                    compiler.compile_responses(&responses, false),
                )
            }
            TriviaType::TrueFalse => {
                let correct_answer = parse_bool(&correct_answer).ok_or_else(|| {
                    malformed(
                        TriviaSource::OpenTriviaQa,
                        format!("bad boolean answer \"{}\"", correct_answer),
                    )
                })?;
                self.builder.true_false(draft, BTreeSet::from([correct_answer]))
            }
            TriviaType::QuestionAnswer => Err(TriviaError::UnsupportedTriviaType {
                trivia_source: TriviaSource::OpenTriviaQa,
                trivia_type,
            }),
        }
    }
}
