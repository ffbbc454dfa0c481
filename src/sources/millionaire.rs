use std::path::Path;
use std::sync::Arc;

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
struct MillionaireRow {
    answer: Option<String>,
    question: Option<String>,
    responses: Vec<Option<String>>,
    trivia_id: Option<String>,
}

pub struct MillionaireQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    question_set: QuestionSetFile,
}

impl MillionaireQuestionSource {
    pub fn new(
        builder: Arc<TriviaQuestionBuilder>,
        database_file: impl AsRef<Path>,
    ) -> MillionaireQuestionSource {
        MillionaireQuestionSource {
            builder,
            question_set: QuestionSetFile::new(TriviaSource::Millionaire, database_file),
        }
    }
}

#[async_trait]
impl QuestionSource for MillionaireQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::Millionaire
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
        info!("Fetching Millionaire trivia question for {}", fetch_options.twitch_channel);

        let row = self.question_set.fetch_random_row(
            "SELECT answer, question, responseA, responseB, responseC, responseD, triviaId FROM millionaireQuestions
            ORDER BY RANDOM()
            LIMIT 1",
            |row| {
                Ok(MillionaireRow {
                    answer: column_text(row, 0)?,
                    question: column_text(row, 1)?,
                    responses: vec![
                        column_text(row, 2)?,
                        column_text(row, 3)?,
                        column_text(row, 4)?,
                        column_text(row, 5)?,
                    ],
                    trivia_id: column_text(row, 6)?,
                })
            },
        )?;

        self.builder.log_payload(TriviaSource::Millionaire, &row);

        let (Some(answer), Some(question), Some(trivia_id)) = (row.answer, row.question, row.trivia_id) else {
            return Err(malformed(TriviaSource::Millionaire, "row is missing required columns"));
        };

        let compiler = self.builder.question_compiler();
        let responses: Vec<String> = row.responses.into_iter().flatten().collect();

        self.builder.multiple_choice(
            QuestionDraft {
                trivia_id,
                trivia_source: TriviaSource::Millionaire,
                difficulty: TriviaDifficulty::Unknown,
                category: None,
                question: compiler.compile_question(&question, false),
            },
            vec![compiler.compile_response(&answer, false)],
            compiler.compile_responses(&responses, false),
        )
    }
}
