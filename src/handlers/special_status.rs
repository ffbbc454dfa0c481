use std::sync::Arc;

use log::{info, warn};
use rand::Rng;

use crate::settings::TriviaSettingsRepository;

pub trait ShinyTriviaHelper: Send + Sync {
    fn is_shiny_trivia_question(&self, twitch_channel: &str) -> bool;
}

pub trait ToxicTriviaHelper: Send + Sync {
    fn is_toxic_trivia_question(&self, twitch_channel: &str) -> bool;

    /// Called when a toxic super game is won, with everyone else who answered.
    fn apply_toxic_punishment(
        &self,
        twitch_channel: &str,
        winner_user_id: &str,
        punished_user_ids: &[String],
        punishment_points: u32,
    ) {
        let _ = (twitch_channel, winner_user_id, punished_user_ids, punishment_points);
    }
}

fn roll(probability: f64) -> bool {
    probability > 0.0 && rand::thread_rng().gen_bool(probability.min(1.0))
}

pub struct ProbabilityShinyTriviaHelper {
    settings: Arc<TriviaSettingsRepository>,
}

impl ProbabilityShinyTriviaHelper {
    pub fn new(settings: Arc<TriviaSettingsRepository>) -> ProbabilityShinyTriviaHelper {
        ProbabilityShinyTriviaHelper { settings }
    }
}

impl ShinyTriviaHelper for ProbabilityShinyTriviaHelper {
    fn is_shiny_trivia_question(&self, twitch_channel: &str) -> bool {
        match self.settings.get() {
            Ok(settings) => {
                let is_shiny = roll(settings.shiny_trivia_probability);
                if is_shiny {
                    info!("Trivia question in {} is shiny", twitch_channel);
                }
                is_shiny
            }
            Err(error) => {
                warn!("Unable to read shiny trivia probability: {}", error);
                false
            }
        }
    }
}

pub struct ProbabilityToxicTriviaHelper {
    settings: Arc<TriviaSettingsRepository>,
}

impl ProbabilityToxicTriviaHelper {
    pub fn new(settings: Arc<TriviaSettingsRepository>) -> ProbabilityToxicTriviaHelper {
        ProbabilityToxicTriviaHelper { settings }
    }
}

impl ToxicTriviaHelper for ProbabilityToxicTriviaHelper {
    fn is_toxic_trivia_question(&self, twitch_channel: &str) -> bool {
        match self.settings.get() {
            Ok(settings) => {
                let is_toxic = roll(settings.toxic_trivia_probability);
                if is_toxic {
                    info!("Super trivia question in {} is toxic", twitch_channel);
                }
                is_toxic
            }
            Err(error) => {
                warn!("Unable to read toxic trivia probability: {}", error);
                false
            }
        }
    }
}
