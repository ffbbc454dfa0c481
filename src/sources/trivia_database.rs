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
    question_set_file::{column_difficulty, column_text, QuestionSetFile},
    QuestionDraft, QuestionSource, TriviaQuestionBuilder,
};

#[derive(Debug)]
struct TriviaDatabaseRow {
    category: Option<String>,
    correct_answer: Option<String>,
    difficulty: TriviaDifficulty,
    question: Option<String>,
    question_id: Option<String>,
    trivia_type: Option<String>,
    wrong_answers: Vec<Option<String>>,
}

pub struct TriviaDatabaseQuestionSource {
    builder: Arc<TriviaQuestionBuilder>,
    question_set: QuestionSetFile,
}

impl TriviaDatabaseQuestionSource {
    pub fn new(
        builder: Arc<TriviaQuestionBuilder>,
        database_file: impl AsRef<Path>,
    ) -> TriviaDatabaseQuestionSource {
        TriviaDatabaseQuestionSource {
            builder,
            question_set: QuestionSetFile::new(TriviaSource::TriviaDatabase, database_file),
        }
    }
}

#[async_trait]
impl QuestionSource for TriviaDatabaseQuestionSource {
    fn trivia_source(&self) -> TriviaSource {
        TriviaSource::TriviaDatabase
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
        info!("Fetching Trivia Database question for {}", fetch_options.twitch_channel);

        let row = self.question_set.fetch_random_row(
            "SELECT category, correctAnswer, difficulty, question, questionId, triviaType, wrongAnswer1, wrongAnswer2, wrongAnswer3 FROM tdQuestions
            ORDER BY RANDOM()
            LIMIT 1",
            |row| {
                Ok(TriviaDatabaseRow {
                    category: column_text(row, 0)?,
                    correct_answer: column_text(row, 1)?,
                    difficulty: column_difficulty(row, 2)?,
                    question: column_text(row, 3)?,
                    question_id: column_text(row, 4)?,
                    trivia_type: column_text(row, 5)?,
                    wrong_answers: vec![
                        column_text(row, 6)?,
                        column_text(row, 7)?,
                        column_text(row, 8)?,
                    ],
                })
            },
        )?;

        self.builder.log_payload(TriviaSource::TriviaDatabase, &row);

        let (Some(correct_answer), Some(question), Some(trivia_id), Some(trivia_type)) =
            (row.correct_answer, row.question, row.question_id, row.trivia_type)
        else {
            return Err(malformed(TriviaSource::TriviaDatabase, "row is missing required columns"));
        };

        let trivia_type: TriviaType = trivia_type.parse().map_err(|_| {
            malformed(
                TriviaSource::TriviaDatabase,
                format!("unknown trivia type \"{}\"", trivia_type),
            )
        })?;

        let compiler = self.builder.question_compiler();
        let draft = QuestionDraft {
            trivia_id,
            trivia_source: TriviaSource::TriviaDatabase,
            difficulty: row.difficulty,
            category: compiler.compile_category(row.category.as_deref(), false),
            question: compiler.compile_question(&question, false),
        };

        match trivia_type {
            TriviaType::MultipleChoice => {
                let wrong_answers: Vec<String> = row.wrong_answers.into_iter().flatten().collect();
                self.builder.multiple_choice(
                    draft,
                    vec![compiler.compile_response(&correct_answer, false)],
                    compiler.compile_responses(&wrong_answers, false),
                )
            }
            TriviaType::TrueFalse => {
                let correct_answer = parse_bool(&correct_answer).ok_or_else(|| {
                    malformed(
                        TriviaSource::TriviaDatabase,
                        format!("bad boolean answer \"{}\"", correct_answer),
                    )
                })?;
                self.builder.true_false(draft, BTreeSet::from([correct_answer]))
            }
            TriviaType::QuestionAnswer => Err(TriviaError::UnsupportedTriviaType {
                trivia_source: TriviaSource::TriviaDatabase,
                trivia_type,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{question_set_file::test_support::question_set, test_support::builder};

    #[tokio::test]
    async fn numeric_difficulty_and_wrong_answers_are_read() {
        let database = question_set(
            "CREATE TABLE tdQuestions (category TEXT, correctAnswer TEXT, difficulty INTEGER, question TEXT, questionId INTEGER, triviaType TEXT, wrongAnswer1 TEXT, wrongAnswer2 TEXT, wrongAnswer3 TEXT);
            INSERT INTO tdQuestions VALUES ('History', '1066', 2, 'In what year was the Battle of Hastings?', 501, 'multiple', '1215', '1492', '966');",
        );

        let source = TriviaDatabaseQuestionSource::new(builder(), database.path());
        let question = source
            .fetch_trivia_question(&TriviaFetchOptions::new("smCharles"))
            .await
            .unwrap();

        assert_eq!(question.trivia_id, "501");
        assert_eq!(question.difficulty, TriviaDifficulty::Medium);
        assert_eq!(question.responses(), vec!["966", "1066", "1215", "1492"]);
        assert_eq!(question.correct_answers(), vec!["1066".to_string()]);
    }
}
