use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;

use crate::{
    errors::TriviaError,
    models::question::{Question, QuestionKind},
    settings::TriviaSettingsRepository,
};

use super::answer_compiler::TriviaAnswerCompiler;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaAnswerCheckResult {
    Correct,
    Incorrect,
    InvalidInput,
}

pub struct TriviaAnswerChecker {
    answer_compiler: TriviaAnswerCompiler,
    settings: Arc<TriviaSettingsRepository>,
}

impl TriviaAnswerChecker {
    pub fn new(
        answer_compiler: TriviaAnswerCompiler,
        settings: Arc<TriviaSettingsRepository>,
    ) -> TriviaAnswerChecker {
        TriviaAnswerChecker {
            answer_compiler,
            settings,
        }
    }

    pub fn check_answer(
        &self,
        answer: &str,
        question: &Question,
    ) -> Result<TriviaAnswerCheckResult, TriviaError> {
        let result = match &question.kind {
            QuestionKind::TrueFalse { correct_answers } => {
                match self.answer_compiler.compile_bool_answer(answer) {
                    Ok(guess) if correct_answers.contains(&guess) => TriviaAnswerCheckResult::Correct,
                    _ => TriviaAnswerCheckResult::Incorrect,
                }
            }
            QuestionKind::MultipleChoice {
                responses,
                correct_answer_ordinals,
            } => match self.answer_compiler.compile_multiple_choice_answer(answer) {
                Err(_) => TriviaAnswerCheckResult::InvalidInput,
                Ok(ordinal) if ordinal >= responses.len() => TriviaAnswerCheckResult::InvalidInput,
                Ok(ordinal) if correct_answer_ordinals.contains(&ordinal) => {
                    TriviaAnswerCheckResult::Correct
                }
                Ok(_) => TriviaAnswerCheckResult::Incorrect,
            },
            QuestionKind::QuestionAnswer {
                cleaned_correct_answers,
                ..
            } => {
                let fraction = self.settings.get()?.levenshtein_threshold_fraction;
                self.check_question_answer(answer, cleaned_correct_answers, fraction)
            }
        };

        info!(
            "Checked answer \"{}\" for {} question {} ({}): {:?}",
            answer,
            question.trivia_type(),
            question.trivia_id,
            question.trivia_source,
            result
        );

        Ok(result)
    }

    fn check_question_answer(
        &self,
        answer: &str,
        cleaned_correct_answers: &[String],
        levenshtein_threshold_fraction: f64,
    ) -> TriviaAnswerCheckResult {
        let guess = self.answer_compiler.compile_text_answer(answer);
        if guess.is_empty() {
            return TriviaAnswerCheckResult::Incorrect;
        }

        for correct in cleaned_correct_answers {
            if correct.is_empty() {
                continue;
            }

            if correct.chars().any(|character| character.is_ascii_digit()) {
                if guess == *correct {
                    return TriviaAnswerCheckResult::Correct;
                }
                continue;
            }

            let shortest = guess.chars().count().min(correct.chars().count());
            let threshold = (shortest as f64 * levenshtein_threshold_fraction).floor() as usize;
            let distance = strsim::levenshtein(&guess, correct);
            debug!(
                "Levenshtein \"{}\" vs \"{}\": distance {} threshold {}",
                guess, correct, distance, threshold
            );

            if distance <= threshold {
                return TriviaAnswerCheckResult::Correct;
            }
        }

        TriviaAnswerCheckResult::Incorrect
    }
}
