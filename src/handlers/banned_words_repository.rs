use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use log::info;

use crate::errors::SettingsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannedWordCheckType {
    Anywhere,
    ExactMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannedWord {
    pub word: String,
    pub check_type: BannedWordCheckType,
}

impl BannedWord {
    /// Lowercases and trims a line from the banned words file. A line wrapped
    /// in double quotes must match a whole token.
    pub fn parse(line: &str) -> Option<BannedWord> {
        let line = line.trim().to_lowercase();

        if line.len() >= 3 && line.starts_with('"') && line.ends_with('"') {
            let word = line[1..line.len() - 1].trim().to_string();
            if word.is_empty() {
                return None;
            }
            return Some(BannedWord {
                word,
                check_type: BannedWordCheckType::ExactMatch,
            });
        }

        if line.is_empty() || line == "\"\"" {
            return None;
        }

        Some(BannedWord {
            word: line,
            check_type: BannedWordCheckType::Anywhere,
        })
    }
}

pub struct BannedWordsRepository {
    banned_words_file: Option<PathBuf>,
    cache: Mutex<Option<Vec<BannedWord>>>,
}

impl BannedWordsRepository {
    pub fn from_file(banned_words_file: impl AsRef<Path>) -> BannedWordsRepository {
        BannedWordsRepository {
            banned_words_file: Some(banned_words_file.as_ref().to_path_buf()),
            cache: Mutex::new(None),
        }
    }

    /// A repository that never bans anything.
    pub fn empty() -> BannedWordsRepository {
        BannedWordsRepository {
            banned_words_file: None,
            cache: Mutex::new(None),
        }
    }

    pub fn clear_caches(&self) {
        *self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        info!("Banned words cache cleared");
    }

    pub fn get_banned_words(&self) -> Result<Vec<BannedWord>, SettingsError> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(banned_words) = cache.as_ref() {
            return Ok(banned_words.clone());
        }

        let banned_words = match &self.banned_words_file {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|cause| SettingsError::Io {
                    path: path.display().to_string(),
                    cause,
                })?;

                let mut banned_words: Vec<BannedWord> = Vec::new();
                for banned_word in contents.lines().filter_map(BannedWord::parse) {
                    if !banned_words.contains(&banned_word) {
                        banned_words.push(banned_word);
                    }
                }

                info!(
                    "Read in {} banned word(s) from \"{}\"",
                    banned_words.len(),
                    path.display()
                );
                banned_words
            }
            None => Vec::new(),
        };

        *cache = Some(banned_words.clone());
        Ok(banned_words)
    }
}
