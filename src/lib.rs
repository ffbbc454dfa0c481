pub mod clock;
pub mod errors;
pub mod handlers;
pub mod helpers;
pub mod loggers;
pub mod models;
pub mod settings;
pub mod sources;
pub mod storage;
