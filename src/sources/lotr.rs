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

const CATEGORY: &str = "Lord of the Rings";

#[derive(Debug)]
struct LotrRow {
    answers: Vec<Option<String>>,
    question: Option<String>,
    trivia_id: Option<String>,
}

/// Lord of the Rings questions. Every answer column holds an accepted spelling.
pub struct LotrQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    question_set: QuestionSetFile,
}

impl LotrQuestionSource {
    pub fn new(builder: Arc<TriviaQuestionBuilder>, database_file: impl AsRef<Path>) -> LotrQuestionSource {
        LotrQuestionSource {
            builder,
            question_set: QuestionSetFile::new(TriviaSource::LordOfTheRings, database_file),
        }
    }
}

#[async_trait]
impl QuestionSource for LotrQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::LordOfTheRings
    }

    fn supported_trivia_types(&self) -> &'static [TriviaType] {
        &[TriviaType::QuestionAnswer]
    }

    fn has_question_set_available(&self) -> bool {
        self.question_set.is_available()
    }

    async fn fetch_trivia_question(
        &self,
        fetch_options: &TriviaFetchOptions,
    ) -> Result<Question, TriviaError> {
        info!("Fetching LOTR trivia question for {}", fetch_options.twitch_channel);

        let row = self.question_set.fetch_random_row(
            "SELECT answerA, answerB, answerC, answerD, question, triviaId FROM lotrQuestions
            ORDER BY RANDOM()
            LIMIT 1",
            |row| {
                Ok(LotrRow {
                    answers: vec![
                        column_text(row, 0)?,
                        column_text(row, 1)?,
                        column_text(row, 2)?,
                        column_text(row, 3)?,
                    ],
                    question: column_text(row, 4)?,
                    trivia_id: column_text(row, 5)?,
                })
            },
        )?;

        self.builder.log_payload(TriviaSource::LordOfTheRings, &row);

        let question = row
            .question
            .ok_or_else(|| malformed(TriviaSource::LordOfTheRings, "row has no question"))?;
        let trivia_id = row
            .trivia_id
            .ok_or_else(|| malformed(TriviaSource::LordOfTheRings, "row has no trivia id"))?;

        let compiler = self.builder.question_compiler();
        let answers: Vec<String> = row.answers.into_iter().flatten().collect();

        self.builder.question_answer(
            QuestionDraft {
                trivia_id,
                trivia_source: TriviaSource::LordOfTheRings,
                difficulty: TriviaDifficulty::Unknown,
                category: Some(CATEGORY.to_string()),
                question: compiler.compile_question(&question, false),
            },
            compiler.compile_responses(&answers, false),
        )
    }
}
