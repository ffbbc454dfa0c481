use sha2::{Digest, Sha256};

use crate::models::actions::TriviaAction;

pub fn parse_action(line: &str) -> Result<TriviaAction, serde_json::Error> {
    serde_json::from_str(line.trim())
}

/// Stable id for questions whose source has none: hex SHA-256 of `question[:category][:difficulty]`.
pub fn generate_trivia_id(question: &str, category: Option<&str>, difficulty: Option<&str>) -> String {
    let mut key = question.to_string();

    if let Some(category) = category.filter(|category| !category.trim().is_empty()) {
        key.push(':');
        key.push_str(category);
    }

    if let Some(difficulty) = difficulty.filter(|difficulty| !difficulty.trim().is_empty()) {
        key.push(':');
        key.push_str(difficulty);
    }

    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Undoes text that was UTF-8 but got decoded as latin-1 upstream.
/// Returns the input unchanged when it was not mangled that way.
pub fn fix_latin1_mojibake(text: &str) -> String {
    let mut bytes = Vec::with_capacity(text.len());

    for character in text.chars() {
        let code = character as u32;
        if code > 0xFF {
            return text.to_string();
        }
        bytes.push(code as u8);
    }

    match String::from_utf8(bytes) {
        Ok(fixed) => fixed,
        Err(_) => text.to_string(),
    }
}

pub fn equals_ignore_case(first: &str, second: &str) -> bool {
    first.to_lowercase() == second.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivia_id_is_stable_and_depends_on_every_part() {
        let first = generate_trivia_id("What is 2+2?", Some("Math"), None);
        let second = generate_trivia_id("What is 2+2?", Some("Math"), None);
        let third = generate_trivia_id("What is 2+2?", Some("Math"), Some("easy"));

        assert_eq!(first, second);
        assert_ne!(first, third);
        assert_eq!(first.len(), 64);
        assert_eq!(
            generate_trivia_id("q", Some("  "), None),
            generate_trivia_id("q", None, None)
        );
    }

    #[test]
    fn latin1_mojibake_is_repaired() {
        assert_eq!(fix_latin1_mojibake("PokÃ©mon"), "Pokémon");
        assert_eq!(fix_latin1_mojibake("plain text"), "plain text");
        assert_eq!(fix_latin1_mojibake("Pokémon"), "Pokémon");
        assert_eq!(fix_latin1_mojibake("日本"), "日本");
    }

    #[test]
    fn parse_action_reads_json_lines() {
        let action = parse_action(
            r#" {"action":"ClearSuperTriviaQueue","data":{"twitch_channel":"smCharles"}} "#,
        )
        .unwrap();
        assert_eq!(action.twitch_channel(), "smCharles");
        assert!(parse_action("not json").is_err());
    }
}
