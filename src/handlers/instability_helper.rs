use std::{collections::HashMap, sync::Arc, sync::Mutex};

use chrono::{DateTime, Duration, Utc};
use log::warn;

use crate::{clock::Clock, models::question::TriviaSource};

/// Counts recent errors per source. Counts fall back to zero once a source
/// has gone a full fall-off window without failing.
pub struct TriviaSourceInstabilityHelper {
    clock: Arc<dyn Clock>,
    fall_off: Duration,
    errors: Mutex<HashMap<TriviaSource, (DateTime<Utc>, u32)>>,
}

impl TriviaSourceInstabilityHelper {
    pub fn new(clock: Arc<dyn Clock>) -> TriviaSourceInstabilityHelper {
        TriviaSourceInstabilityHelper::with_fall_off(clock, Duration::hours(1))
    }

    pub fn with_fall_off(clock: Arc<dyn Clock>, fall_off: Duration) -> TriviaSourceInstabilityHelper {
        TriviaSourceInstabilityHelper {
            clock,
            fall_off,
            errors: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, trivia_source: TriviaSource) -> u32 {
        let now = self.clock.now();
        let errors = self.errors.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        match errors.get(&trivia_source) {
            Some((last_error, count)) if now - *last_error <= self.fall_off => *count,
            _ => 0,
        }
    }

    pub fn increment_error_count(&self, trivia_source: TriviaSource) -> u32 {
        let now = self.clock.now();
        let mut errors = self.errors.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let count = match errors.get(&trivia_source) {
            Some((last_error, count)) if now - *last_error <= self.fall_off => count + 1,
            _ => 1,
        };
        errors.insert(trivia_source, (now, count));

        warn!("Incremented error count for {} to {}", trivia_source, count);
        count
    }
}
