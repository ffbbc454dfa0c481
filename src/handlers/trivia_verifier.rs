use std::sync::Arc;

use log::info;

use crate::{
    errors::TriviaError,
    models::{
        content_code::TriviaContentCode, fetch_options::TriviaFetchOptions, question::Question,
    },
};

use super::{
    banned_trivia_ids_repository::BannedTriviaIdsRepository, content_scanner::TriviaContentScanner,
    history_repository::TriviaHistoryRepository,
};

/// Decides whether a fetched question may be asked in a channel. The history
/// check runs last because a passing question is recorded there.
pub struct TriviaVerifier {
    banned_trivia_ids: Arc<BannedTriviaIdsRepository>,
    content_scanner: Arc<TriviaContentScanner>,
    history: Arc<TriviaHistoryRepository>,
}

impl TriviaVerifier {
    pub fn new(
        banned_trivia_ids: Arc<BannedTriviaIdsRepository>,
        content_scanner: Arc<TriviaContentScanner>,
        history: Arc<TriviaHistoryRepository>,
    ) -> TriviaVerifier {
        TriviaVerifier {
            banned_trivia_ids,
            content_scanner,
            history,
        }
    }

    pub fn verify(
        &self,
        question: Option<&Question>,
        fetch_options: &TriviaFetchOptions,
        emote: &str,
        twitch_channel: &str,
    ) -> Result<TriviaContentCode, TriviaError> {
        let question = match question {
            Some(question) => question,
            None => return Ok(TriviaContentCode::IsNone),
        };

        if !fetch_options.is_trivia_type_allowed(question.trivia_type()) {
            info!(
                "Trivia question {} is {} which is not allowed by {:?}",
                question.trivia_id,
                question.trivia_type(),
                fetch_options.question_answer_conditions
            );
            return Ok(TriviaContentCode::IllegalTriviaType);
        }

        if self
            .banned_trivia_ids
            .is_banned(&question.trivia_id, question.trivia_source)?
        {
            info!(
                "Trivia question {} ({}) is banned",
                question.trivia_id, question.trivia_source
            );
            return Ok(TriviaContentCode::IsBanned);
        }

        let content_code = self.content_scanner.verify(Some(question))?;
        if !content_code.is_ok() {
            return Ok(content_code);
        }

        self.history.verify(question, emote, twitch_channel)
    }
}
