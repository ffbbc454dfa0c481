pub mod actions;
pub mod content_code;
pub mod events;
pub mod fetch_options;
pub mod game_state;
pub mod question;
pub mod score;
