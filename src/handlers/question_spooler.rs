use crossbeam_queue::ArrayQueue;
use log::{info, warn};

use crate::{
    models::{
        fetch_options::{QuestionAnswerTriviaConditions, TriviaFetchOptions},
        question::{Question, TriviaType},
    },
    settings::TriviaSettings,
};

pub const MAX_SPOOL_CAPACITY: usize = 16;

/// Channel recorded in the fetch options of spooling requests.
pub const SPOOL_TWITCH_CHANNEL: &str = "trivia_spooler";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpoolKind {
    /// Multiple choice and true/false questions for normal games.
    Normal,
    /// Question answer questions for super games.
    Super,
}

impl SpoolKind {
    pub const ALL: [SpoolKind; 2] = [SpoolKind::Normal, SpoolKind::Super];

    pub fn for_fetch_options(fetch_options: &TriviaFetchOptions) -> SpoolKind {
        if fetch_options.requires_question_answer() {
            SpoolKind::Super
        } else {
            SpoolKind::Normal
        }
    }

    pub fn max_size(self, settings: &TriviaSettings) -> usize {
        match self {
            SpoolKind::Normal => settings.max_trivia_question_spool_size,
            SpoolKind::Super => settings.max_super_trivia_question_spool_size,
        }
    }

    pub fn fetch_options(self) -> TriviaFetchOptions {
        let conditions = match self {
            SpoolKind::Normal => QuestionAnswerTriviaConditions::NotAllowed,
            SpoolKind::Super => QuestionAnswerTriviaConditions::Required,
        };

        TriviaFetchOptions::new(SPOOL_TWITCH_CHANNEL).with_question_answer_conditions(conditions)
    }

    fn accepts(self, trivia_type: TriviaType) -> bool {
        match self {
            SpoolKind::Normal => trivia_type != TriviaType::QuestionAnswer,
            SpoolKind::Super => trivia_type == TriviaType::QuestionAnswer,
        }
    }
}

/// Prefetched, not yet verified questions. Verification against a channel
/// happens when a question is taken.
pub struct TriviaQuestionSpooler {
    normal: ArrayQueue<Question>,
    super_trivia: ArrayQueue<Question>,
}

impl TriviaQuestionSpooler {
    pub fn new() -> TriviaQuestionSpooler {
        TriviaQuestionSpooler {
            normal: ArrayQueue::new(MAX_SPOOL_CAPACITY),
            super_trivia: ArrayQueue::new(MAX_SPOOL_CAPACITY),
        }
    }

    fn queue(&self, kind: SpoolKind) -> &ArrayQueue<Question> {
        match kind {
            SpoolKind::Normal => &self.normal,
            SpoolKind::Super => &self.super_trivia,
        }
    }

    pub fn len(&self, kind: SpoolKind) -> usize {
        self.queue(kind).len()
    }

    /// Returns false when the question does not fit `kind` or the spool is full.
    pub fn spool(&self, kind: SpoolKind, question: Question) -> bool {
        if !kind.accepts(question.trivia_type()) {
            warn!(
                "Not spooling {} question {} as a {:?} question",
                question.trivia_type(),
                question.trivia_id,
                kind
            );
            return false;
        }

        match self.queue(kind).push(question) {
            Ok(()) => {
                info!("Spooled a {:?} trivia question (size {})", kind, self.len(kind));
                true
            }
            Err(question) => {
                warn!("{:?} spool is full, dropping {}", kind, question.trivia_id);
                false
            }
        }
    }

    pub fn take(&self, fetch_options: &TriviaFetchOptions) -> Option<Question> {
        let kind = SpoolKind::for_fetch_options(fetch_options);
        let question = self.queue(kind).pop()?;

        info!(
            "Took spooled {:?} trivia question {} (size {})",
            kind,
            question.trivia_id,
            self.len(kind)
        );
        Some(question)
    }
}

impl Default for TriviaQuestionSpooler {
    fn default() -> Self {
        TriviaQuestionSpooler::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::question::{QuestionKind, TriviaDifficulty, TriviaSource};

    fn true_false(trivia_id: &str) -> Question {
        Question::new(
            trivia_id.to_string(),
            TriviaSource::Bongo,
            TriviaDifficulty::Easy,
            None,
            "Is the sky blue?".to_string(),
            QuestionKind::TrueFalse {
                correct_answers: BTreeSet::from([true]),
            },
        )
        .unwrap()
    }

    fn question_answer(trivia_id: &str) -> Question {
        Question::new(
            trivia_id.to_string(),
            TriviaSource::JService,
            TriviaDifficulty::Medium,
            None,
            "Who played Eruption?".to_string(),
            QuestionKind::QuestionAnswer {
                correct_answers: vec!["Van Halen".to_string()],
                cleaned_correct_answers: vec!["van halen".to_string()],
            },
        )
        .unwrap()
    }

    #[test]
    fn spools_only_take_matching_types() {
        let spooler = TriviaQuestionSpooler::new();

        assert!(!spooler.spool(SpoolKind::Normal, question_answer("qa")));
        assert!(!spooler.spool(SpoolKind::Super, true_false("tf")));
        assert!(spooler.spool(SpoolKind::Normal, true_false("tf")));
        assert!(spooler.spool(SpoolKind::Super, question_answer("qa")));

        assert_eq!(spooler.len(SpoolKind::Normal), 1);
        assert_eq!(spooler.len(SpoolKind::Super), 1);
    }

    #[test]
    fn required_question_answer_takes_from_the_super_spool() {
        let spooler = TriviaQuestionSpooler::new();
        spooler.spool(SpoolKind::Normal, true_false("tf-1"));
        spooler.spool(SpoolKind::Normal, true_false("tf-2"));
        spooler.spool(SpoolKind::Super, question_answer("qa-1"));

        let required = TriviaFetchOptions::new("smCharles")
            .with_question_answer_conditions(QuestionAnswerTriviaConditions::Required);
        let allowed = TriviaFetchOptions::new("smCharles");

        assert_eq!(spooler.take(&required).unwrap().trivia_id, "qa-1");
        assert!(spooler.take(&required).is_none());
        assert_eq!(spooler.take(&allowed).unwrap().trivia_id, "tf-1");
        assert_eq!(spooler.take(&allowed).unwrap().trivia_id, "tf-2");
        assert!(spooler.take(&allowed).is_none());
    }

    #[test]
    fn full_spool_drops_new_questions() {
        let spooler = TriviaQuestionSpooler::new();
        for index in 0..MAX_SPOOL_CAPACITY {
            assert!(spooler.spool(SpoolKind::Normal, true_false(&format!("tf-{}", index))));
        }

        assert!(!spooler.spool(SpoolKind::Normal, true_false("one-too-many")));
        assert_eq!(spooler.len(SpoolKind::Normal), MAX_SPOOL_CAPACITY);
    }
}
