pub mod additional_answers_repository;
pub mod answer_checker;
pub mod answer_compiler;
pub mod banned_trivia_ids_repository;
pub mod banned_words_repository;
pub mod content_scanner;
pub mod cooldown_helper;
pub mod emote_generator;
pub mod game_machine;
pub mod game_store;
pub mod history_repository;
pub mod instability_helper;
pub mod numerals;
pub mod question_compiler;
pub mod question_spooler;
pub mod queued_game_store;
pub mod score_repository;
pub mod session_token_repository;
pub mod special_status;
pub mod trivia_repository;
pub mod trivia_verifier;
