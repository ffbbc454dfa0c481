use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    errors::SettingsError, handlers::question_spooler::MAX_SPOOL_CAPACITY,
    models::question::TriviaSource,
};

fn default_true() -> bool {
    true
}

fn default_weight() -> u32 {
    1
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TriviaSourceSettings {
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TriviaSettings {
    pub trivia_sources: HashMap<String, TriviaSourceSettings>,
    pub levenshtein_threshold_fraction: f64,
    pub max_answer_length: usize,
    pub max_phrase_answer_length: usize,
    pub max_question_length: usize,
    pub min_multiple_choice_responses: usize,
    pub max_multiple_choice_responses: usize,
    pub min_days_before_repeat_question: i64,
    pub max_retry_count: u32,
    pub retry_sleep_seconds: f64,
    pub max_super_game_queue_size: usize,
    pub super_trivia_cooldown_seconds: i64,
    pub trivia_source_instability_threshold: u32,
    pub is_ban_list_enabled: bool,
    pub debug_logging_enabled: bool,
    pub shiny_trivia_probability: f64,
    pub toxic_trivia_probability: f64,
    pub network_timeout_seconds: u64,
    pub max_trivia_question_spool_size: usize,
    pub max_super_trivia_question_spool_size: usize,
    pub spool_refresh_seconds: i64,
}

impl Default for TriviaSettings {
    fn default() -> Self {
        TriviaSettings {
            trivia_sources: TriviaSource::ALL
                .iter()
                .map(|trivia_source| {
                    (
                        trivia_source.as_str().to_lowercase(),
                        TriviaSourceSettings {
                            is_enabled: true,
                            weight: default_weight(),
                        },
                    )
                })
                .collect(),
            levenshtein_threshold_fraction: 0.2,
            max_answer_length: 80,
            max_phrase_answer_length: 32,
            max_question_length: 350,
            min_multiple_choice_responses: 2,
            max_multiple_choice_responses: 6,
            min_days_before_repeat_question: 10,
            max_retry_count: 5,
            retry_sleep_seconds: 0.25,
            max_super_game_queue_size: 25,
            super_trivia_cooldown_seconds: 3,
            trivia_source_instability_threshold: 3,
            is_ban_list_enabled: true,
            debug_logging_enabled: false,
            shiny_trivia_probability: 0.01,
            toxic_trivia_probability: 0.05,
            network_timeout_seconds: 8,
            max_trivia_question_spool_size: 3,
            max_super_trivia_question_spool_size: 3,
            spool_refresh_seconds: 120,
        }
    }
}

fn out_of_range(key: &'static str, value: impl ToString) -> SettingsError {
    SettingsError::OutOfRange {
        key,
        value: value.to_string(),
    }
}

impl TriviaSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..1.0).contains(&self.levenshtein_threshold_fraction) {
            return Err(out_of_range(
                "levenshtein_threshold_fraction",
                self.levenshtein_threshold_fraction,
            ));
        }
        if self.max_answer_length < 1 {
            return Err(out_of_range("max_answer_length", self.max_answer_length));
        }
        if self.max_phrase_answer_length < 1 {
            return Err(out_of_range(
                "max_phrase_answer_length",
                self.max_phrase_answer_length,
            ));
        }
        if self.max_question_length < 1 {
            return Err(out_of_range("max_question_length", self.max_question_length));
        }
        if self.min_multiple_choice_responses < 2 {
            return Err(out_of_range(
                "min_multiple_choice_responses",
                self.min_multiple_choice_responses,
            ));
        }
        if self.max_multiple_choice_responses < self.min_multiple_choice_responses {
            return Err(out_of_range(
                "max_multiple_choice_responses",
                self.max_multiple_choice_responses,
            ));
        }
        if self.min_days_before_repeat_question < 0 {
            return Err(out_of_range(
                "min_days_before_repeat_question",
                self.min_days_before_repeat_question,
            ));
        }
        if self.max_retry_count < 2 {
            return Err(out_of_range("max_retry_count", self.max_retry_count));
        }
        if !(self.retry_sleep_seconds >= 0.0) {
            return Err(out_of_range("retry_sleep_seconds", self.retry_sleep_seconds));
        }
        if self.super_trivia_cooldown_seconds < 0 {
            return Err(out_of_range(
                "super_trivia_cooldown_seconds",
                self.super_trivia_cooldown_seconds,
            ));
        }
        if self.trivia_source_instability_threshold < 1 {
            return Err(out_of_range(
                "trivia_source_instability_threshold",
                self.trivia_source_instability_threshold,
            ));
        }
        if !(0.0..=1.0).contains(&self.shiny_trivia_probability) {
            return Err(out_of_range(
                "shiny_trivia_probability",
                self.shiny_trivia_probability,
            ));
        }
        if !(0.0..=1.0).contains(&self.toxic_trivia_probability) {
            return Err(out_of_range(
                "toxic_trivia_probability",
                self.toxic_trivia_probability,
            ));
        }
        if !(2..=16).contains(&self.network_timeout_seconds) {
            return Err(out_of_range(
                "network_timeout_seconds",
                self.network_timeout_seconds,
            ));
        }
        if self.max_trivia_question_spool_size > MAX_SPOOL_CAPACITY {
            return Err(out_of_range(
                "max_trivia_question_spool_size",
                self.max_trivia_question_spool_size,
            ));
        }
        if self.max_super_trivia_question_spool_size > MAX_SPOOL_CAPACITY {
            return Err(out_of_range(
                "max_super_trivia_question_spool_size",
                self.max_super_trivia_question_spool_size,
            ));
        }
        if !(15..=300).contains(&self.spool_refresh_seconds) {
            return Err(out_of_range("spool_refresh_seconds", self.spool_refresh_seconds));
        }

        Ok(())
    }

    /// Enabled sources and their weights. Unknown source names are skipped.
    pub fn available_trivia_source_weights(&self) -> HashMap<TriviaSource, u32> {
        let mut weights = HashMap::new();

        for (name, source_settings) in self.trivia_sources.iter() {
            let trivia_source = match name.parse::<TriviaSource>() {
                Ok(trivia_source) => trivia_source,
                Err(_) => {
                    warn!("Ignoring unknown trivia source in settings: \"{}\"", name);
                    continue;
                }
            };

            if source_settings.is_enabled {
                weights.insert(trivia_source, source_settings.weight);
            }
        }

        weights
    }
}

/// Loads the trivia settings document and caches it until `clear_caches`.
pub struct TriviaSettingsRepository {
    settings_file: Option<PathBuf>,
    fixed_settings: Option<TriviaSettings>,
    cache: Mutex<Option<TriviaSettings>>,
}

impl TriviaSettingsRepository {
    pub fn from_file(settings_file: impl AsRef<Path>) -> TriviaSettingsRepository {
        TriviaSettingsRepository {
            settings_file: Some(settings_file.as_ref().to_path_buf()),
            fixed_settings: None,
            cache: Mutex::new(None),
        }
    }

    pub fn from_settings(settings: TriviaSettings) -> TriviaSettingsRepository {
        TriviaSettingsRepository {
            settings_file: None,
            fixed_settings: Some(settings),
            cache: Mutex::new(None),
        }
    }

    pub fn clear_caches(&self) {
        *self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        info!("Trivia settings cache cleared");
    }

    pub fn get(&self) -> Result<TriviaSettings, SettingsError> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(settings) = cache.as_ref() {
            return Ok(settings.clone());
        }

        let settings = self.read_settings()?;
        settings.validate()?;
        *cache = Some(settings.clone());

        Ok(settings)
    }

    fn read_settings(&self) -> Result<TriviaSettings, SettingsError> {
        if let Some(settings) = &self.fixed_settings {
            return Ok(settings.clone());
        }

        let path = match &self.settings_file {
            Some(path) => path,
            None => return Ok(TriviaSettings::default()),
        };

        let contents = fs::read_to_string(path).map_err(|cause| SettingsError::Io {
            path: path.display().to_string(),
            cause,
        })?;

        serde_json::from_str(&contents).map_err(|cause| SettingsError::Json {
            path: path.display().to_string(),
            cause,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_keys_use_defaults_and_unknown_keys_are_ignored() {
        let settings: TriviaSettings =
            serde_json::from_str(r#"{ "max_retry_count": 7, "some_future_key": true }"#).unwrap();

        assert_eq!(settings.max_retry_count, 7);
        assert_eq!(settings.max_question_length, 350);
        assert_eq!(settings.levenshtein_threshold_fraction, 0.2);
        assert!(settings.is_ban_list_enabled);
    }

    #[test]
    fn available_weights_skip_disabled_and_unknown_sources() {
        let settings: TriviaSettings = serde_json::from_str(
            r#"{ "trivia_sources": {
                "bongo": { "is_enabled": true, "weight": 3 },
                "j_service": { "is_enabled": false, "weight": 2 },
                "mystery": { "is_enabled": true, "weight": 1 },
                "wwtbam": {}
            } }"#,
        )
        .unwrap();

        let weights = settings.available_trivia_source_weights();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights.get(&TriviaSource::Bongo), Some(&3));
        assert_eq!(weights.get(&TriviaSource::Wwtbam), Some(&1));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let settings = TriviaSettings {
            max_retry_count: 1,
            ..TriviaSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = TriviaSettings {
            levenshtein_threshold_fraction: 1.5,
            ..TriviaSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = TriviaSettings {
            max_super_trivia_question_spool_size: MAX_SPOOL_CAPACITY + 1,
            ..TriviaSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn repository_caches_until_cleared() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_question_length": 100 }}"#).unwrap();

        let repository = TriviaSettingsRepository::from_file(file.path());
        assert_eq!(repository.get().unwrap().max_question_length, 100);

        fs::write(file.path(), r#"{ "max_question_length": 200 }"#).unwrap();
        assert_eq!(repository.get().unwrap().max_question_length, 100);

        repository.clear_caches();
        assert_eq!(repository.get().unwrap().max_question_length, 200);
    }
}
