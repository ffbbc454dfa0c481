use std::sync::Arc;

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    errors::TriviaError,
    models::{
        content_code::TriviaContentCode,
        question::{Question, QuestionKind},
    },
    settings::TriviaSettingsRepository,
};

use super::banned_words_repository::{BannedWord, BannedWordCheckType, BannedWordsRepository};

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(https?://\S+)|(\bwww\.\S+)|(\b[a-z0-9-]+\.(com|net|org|io|gg|tv|ly|co|uk)\b)")
        .expect("Failed to compile url regex")
});

pub struct TriviaContentScanner {
    banned_words_repository: Arc<BannedWordsRepository>,
    settings: Arc<TriviaSettingsRepository>,
}

impl TriviaContentScanner {
    pub fn new(
        banned_words_repository: Arc<BannedWordsRepository>,
        settings: Arc<TriviaSettingsRepository>,
    ) -> TriviaContentScanner {
        TriviaContentScanner {
            banned_words_repository,
            settings,
        }
    }

    pub fn verify(&self, question: Option<&Question>) -> Result<TriviaContentCode, TriviaError> {
        let question = match question {
            Some(question) => question,
            None => return Ok(TriviaContentCode::IsNone),
        };

        let settings = self.settings.get()?;

        if let QuestionKind::MultipleChoice { responses, .. } = &question.kind {
            if responses.len() < settings.min_multiple_choice_responses {
                info!(
                    "Trivia question has too few multiple choice responses (min is {}): {:?}",
                    settings.min_multiple_choice_responses, responses
                );
                return Ok(TriviaContentCode::TooFewMultipleChoiceResponses);
            }
        }

        if question.question.chars().count() >= settings.max_question_length {
            info!(
                "Trivia question is too long (max is {}): {}",
                settings.max_question_length, question.question
            );
            return Ok(TriviaContentCode::QuestionTooLong);
        }

        let responses = question.responses();
        if responses
            .iter()
            .any(|response| response.chars().count() >= settings.max_answer_length)
        {
            info!(
                "Trivia response is too long (max is {}): {:?}",
                settings.max_answer_length, responses
            );
            return Ok(TriviaContentCode::AnswerTooLong);
        }

        if let QuestionKind::QuestionAnswer {
            correct_answers, ..
        } = &question.kind
        {
            if correct_answers
                .iter()
                .any(|answer| answer.chars().count() >= settings.max_phrase_answer_length)
            {
                info!(
                    "Trivia answer is too long (max is {}): {:?}",
                    settings.max_phrase_answer_length, correct_answers
                );
                return Ok(TriviaContentCode::AnswerTooLong);
            }
        }

        let banned_words = if settings.is_ban_list_enabled {
            self.banned_words_repository.get_banned_words()?
        } else {
            Vec::new()
        };

        let mut phrases: Vec<String> = vec![question.question.to_lowercase()];
        if let Some(category) = &question.category {
            phrases.push(category.to_lowercase());
        }
        phrases.extend(responses.iter().map(|response| response.to_lowercase()));
        if let QuestionKind::QuestionAnswer {
            correct_answers, ..
        } = &question.kind
        {
            phrases.extend(correct_answers.iter().map(|answer| answer.to_lowercase()));
        }

        for phrase in phrases.iter() {
            let code = self.verify_phrase(phrase, &banned_words);
            if !code.is_ok() {
                warn!(
                    "Trivia question {} ({}) rejected with {}: \"{}\"",
                    question.trivia_id, question.trivia_source, code, phrase
                );
                return Ok(code);
            }
        }

        Ok(TriviaContentCode::Ok)
    }

    fn verify_phrase(&self, phrase: &str, banned_words: &[BannedWord]) -> TriviaContentCode {
        if phrase.trim().is_empty() {
            return TriviaContentCode::ContainsEmptyStr;
        }

        if URL.is_match(phrase) {
            return TriviaContentCode::ContainsUrl;
        }

        let tokens: Vec<&str> = phrase
            .split_whitespace()
            .map(|token| token.trim_matches(|character: char| !character.is_alphanumeric()))
            .filter(|token| !token.is_empty())
            .collect();

        for banned_word in banned_words {
            let is_banned = match banned_word.check_type {
                BannedWordCheckType::Anywhere => phrase.contains(&banned_word.word),
                BannedWordCheckType::ExactMatch => {
                    tokens.iter().any(|token| *token == banned_word.word)
                }
            };

            if is_banned {
                return TriviaContentCode::ContainsBannedWord;
            }
        }

        TriviaContentCode::Ok
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, io::Write};

    use super::*;
    use crate::{
        models::question::{TriviaDifficulty, TriviaSource},
        settings::TriviaSettings,
    };

    fn scanner(banned_words: &str, settings: TriviaSettings) -> (TriviaContentScanner, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", banned_words).unwrap();

        let scanner = TriviaContentScanner::new(
            Arc::new(BannedWordsRepository::from_file(file.path())),
            Arc::new(TriviaSettingsRepository::from_settings(settings)),
        );
        (scanner, file)
    }

    fn true_false(question: &str) -> Question {
        Question::new(
            "id".to_string(),
            TriviaSource::Bongo,
            TriviaDifficulty::Easy,
            Some("Geography".to_string()),
            question.to_string(),
            QuestionKind::TrueFalse {
                correct_answers: BTreeSet::from([true]),
            },
        )
        .unwrap()
    }

    fn question_answer(answer: &str) -> Question {
        Question::new(
            "id".to_string(),
            TriviaSource::JService,
            TriviaDifficulty::Unknown,
            None,
            "Name it".to_string(),
            QuestionKind::QuestionAnswer {
                correct_answers: vec![answer.to_string()],
                cleaned_correct_answers: vec![answer.to_lowercase()],
            },
        )
        .unwrap()
    }

    #[test]
    fn none_is_rejected() {
        let (scanner, _file) = scanner("", TriviaSettings::default());
        assert_eq!(scanner.verify(None).unwrap(), TriviaContentCode::IsNone);
    }

    #[test]
    fn question_length_boundary() {
        let settings = TriviaSettings {
            max_question_length: 20,
            ..TriviaSettings::default()
        };
        let (scanner, _file) = scanner("", settings);

        let at_limit = true_false(&"q".repeat(20));
        let below_limit = true_false(&"q".repeat(19));

        assert_eq!(
            scanner.verify(Some(&at_limit)).unwrap(),
            TriviaContentCode::QuestionTooLong
        );
        assert_eq!(
            scanner.verify(Some(&below_limit)).unwrap(),
            TriviaContentCode::Ok
        );
    }

    #[test]
    fn too_few_multiple_choice_responses() {
        let settings = TriviaSettings {
            min_multiple_choice_responses: 3,
            max_multiple_choice_responses: 6,
            ..TriviaSettings::default()
        };
        let (scanner, _file) = scanner("", settings);
        let question = Question::new(
            "id".to_string(),
            TriviaSource::Bongo,
            TriviaDifficulty::Easy,
            None,
            "Pick".to_string(),
            QuestionKind::multiple_choice(&["a".to_string()], vec!["a".to_string(), "b".to_string()])
                .unwrap(),
        )
        .unwrap();

        assert_eq!(
            scanner.verify(Some(&question)).unwrap(),
            TriviaContentCode::TooFewMultipleChoiceResponses
        );
    }

    #[test]
    fn long_phrase_answers_are_rejected() {
        let (scanner, _file) = scanner("", TriviaSettings::default());
        let question = question_answer(&"word ".repeat(10));

        assert_eq!(
            scanner.verify(Some(&question)).unwrap(),
            TriviaContentCode::AnswerTooLong
        );
    }

    #[test]
    fn urls_and_banned_words_are_rejected() {
        let (scanner, _file) = scanner("darn\n\"ass\"\n", TriviaSettings::default());

        assert_eq!(
            scanner
                .verify(Some(&true_false("See https://example.com for details")))
                .unwrap(),
            TriviaContentCode::ContainsUrl
        );
        assert_eq!(
            scanner
                .verify(Some(&true_false("Is it DARNED cold?")))
                .unwrap(),
            TriviaContentCode::ContainsBannedWord
        );
        assert_eq!(
            scanner
                .verify(Some(&true_false("Is an ass a donkey?")))
                .unwrap(),
            TriviaContentCode::ContainsBannedWord
        );
        assert_eq!(
            scanner
                .verify(Some(&true_false("Does a class have students?")))
                .unwrap(),
            TriviaContentCode::Ok
        );
        assert_eq!(
            scanner.verify(Some(&question_answer("Darn"))).unwrap(),
            TriviaContentCode::ContainsBannedWord
        );
    }

    #[test]
    fn ban_list_can_be_disabled() {
        let settings = TriviaSettings {
            is_ban_list_enabled: false,
            ..TriviaSettings::default()
        };
        let (scanner, _file) = scanner("darn\n", settings);

        assert_eq!(
            scanner.verify(Some(&true_false("Is it darned cold?"))).unwrap(),
            TriviaContentCode::Ok
        );
    }
}
