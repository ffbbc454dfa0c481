//! Turns free-form answers into canonical strings that can be compared by
//! equality or edit distance.

use std::collections::HashSet;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::errors::TriviaError;

use super::numerals::{
    cardinal_words, digit_words, is_roman_numeral, ordinal_words, roman_to_int, year_words,
};

// ============================================================================
// Patterns
// ============================================================================

static ELLIPSIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{3,}").expect("Failed to compile ellipsis regex"));

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\/?\w+>").expect("Failed to compile html tag regex"));

static BRACKET_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\/?\w\w+\]").expect("Failed to compile bracket tag regex"));

static AMPERSAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^&\s+)|(\s+&\s+)|(\s+&$)").expect("Failed to compile ampersand regex")
});

static ARTICLE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(a|an|and|or|the)\s+").expect("Failed to compile article prefix regex")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

static EQUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z])\s*=\s*(-?\d+(?:\.\d+)?)\s*$")
        .expect("Failed to compile equation regex")
});

static CURRENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*\$\s*(\d[\d,]*(?:\.\d+)?)(?:\s*(?:usd|us|dollars?))?\s*$")
        .expect("Failed to compile currency regex")
});

static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^()]*)\)").expect("Failed to compile parenthetical regex"));

static ARABIC_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)(?:st|nd|rd|th)?$").expect("Failed to compile arabic number regex")
});

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+) ([a-z ]+)$").expect("Failed to compile leading number regex")
});

const MAX_SPLIT_POSITIONS: usize = 4;
const MAX_PARENTHETICALS: usize = 5;
const MAX_NUMERAL_VARIANTS: usize = 256;

const PRONOUN_PREFIXES: [&str; 22] = [
    "he is ", "hes ", "she is ", "shes ", "it is ", "its ", "they are ", "theyre ", "you are ",
    "youre ", "we are ", "i am ", "im ", "his ", "her ", "hers ", "their ", "theirs ", "your ",
    "my ", "our ", "whose ",
];

const GENERATIONAL_SUFFIXES: [&str; 4] = ["jr", "sr", "junior", "senior"];

const UNITS: [&str; 34] = [
    "usd", "us", "dollar", "dollars", "year", "years", "old", "month", "months", "week", "weeks",
    "day", "days", "hour", "hours", "minute", "minutes", "second", "seconds", "mile", "miles",
    "km", "kilometers", "meter", "meters", "feet", "foot", "inch", "inches", "pound", "pounds",
    "kg", "percent", "degrees",
];

/// Look-alike letters that NFKC leaves alone.
fn basic_latin_look_alike(character: char) -> Option<char> {
    let replacement = match character {
        // Cyrillic
        'а' | 'А' => 'a',
        'в' | 'В' | 'Ь' | 'ь' => 'b',
        'с' | 'С' => 'c',
        'ԁ' => 'd',
        'е' | 'Е' | 'ё' | 'Ё' => 'e',
        'н' | 'Н' => 'h',
        'і' | 'І' | 'ї' => 'i',
        'ј' | 'Ј' => 'j',
        'к' | 'К' => 'k',
        'м' | 'М' => 'm',
        'о' | 'О' => 'o',
        'р' | 'Р' => 'p',
        'ѕ' | 'Ѕ' => 's',
        'т' | 'Т' => 't',
        'у' | 'У' => 'y',
        'х' | 'Х' => 'x',
        // Greek
        'α' | 'Α' => 'a',
        'β' | 'Β' => 'b',
        'ε' | 'Ε' => 'e',
        'η' | 'Η' => 'h',
        'ι' | 'Ι' => 'i',
        'κ' | 'Κ' => 'k',
        'μ' | 'Μ' => 'm',
        'ν' | 'Ν' => 'n',
        'ο' | 'Ο' => 'o',
        'ρ' | 'Ρ' => 'p',
        'τ' | 'Τ' => 't',
        'υ' | 'Υ' => 'u',
        'χ' | 'Χ' => 'x',
        'ζ' | 'Ζ' => 'z',
        // small capitals
        'ᴀ' => 'a',
        'ʙ' => 'b',
        'ᴄ' => 'c',
        'ᴅ' => 'd',
        'ᴇ' => 'e',
        'ꜰ' => 'f',
        'ɢ' => 'g',
        'ʜ' => 'h',
        'ɪ' => 'i',
        'ᴊ' => 'j',
        'ᴋ' => 'k',
        'ʟ' => 'l',
        'ᴍ' => 'm',
        'ɴ' => 'n',
        'ᴏ' => 'o',
        'ᴘ' => 'p',
        'ʀ' => 'r',
        'ꜱ' => 's',
        'ᴛ' => 't',
        'ᴜ' => 'u',
        'ᴠ' => 'v',
        'ᴡ' => 'w',
        'ʏ' => 'y',
        'ᴢ' => 'z',
        _ => return None,
    };

    Some(replacement)
}

fn to_basic_latin(text: &str) -> String {
    let folded: String = text
        .nfkc()
        .map(|character| basic_latin_look_alike(character).unwrap_or(character))
        .collect();

    folded
        .nfd()
        .filter(|character| !is_combining_mark(*character))
        .collect()
}

/// A '.' between two digits, as in `12456.70`.
fn is_decimal_point(characters: &[char], index: usize) -> bool {
    characters[index] == '.'
        && index > 0
        && characters[index - 1].is_ascii_digit()
        && characters
            .get(index + 1)
            .map_or(false, |next| next.is_ascii_digit())
}

fn push_unique(values: &mut Vec<String>, seen: &mut HashSet<String>, value: String) {
    if !value.is_empty() && seen.insert(value.clone()) {
        values.push(value);
    }
}

fn cartesian_product(alternatives: &[Vec<String>]) -> Vec<String> {
    let mut results = vec![String::new()];

    for options in alternatives {
        let mut next = Vec::with_capacity(results.len() * options.len());
        for prefix in results.iter() {
            for option in options {
                next.push(format!("{}{}", prefix, option));
            }
        }
        results = next;
    }

    results
}

#[derive(Debug, Default, Clone)]
pub struct TriviaAnswerCompiler;

impl TriviaAnswerCompiler {
    pub fn new() -> TriviaAnswerCompiler {
        TriviaAnswerCompiler
    }

    /// Canonical form of a single answer. Applying it twice changes nothing.
    pub fn compile_text_answer(&self, answer: &str) -> String {
        let mut text = answer.to_lowercase().trim().to_string();

        text = ELLIPSIS.replace_all(&text, "…").into_owned();
        text = HTML_TAG.replace_all(&text, "").into_owned();
        text = BRACKET_TAG.replace_all(&text, "").into_owned();
        text = text.replace(['\r', '\n'], " ");
        text = AMPERSAND.replace_all(&text, " and ").into_owned();
        text = to_basic_latin(&text).to_lowercase();

        let characters: Vec<char> = text.chars().collect();
        let text: String = characters
            .iter()
            .enumerate()
            .filter(|(index, character)| {
                character.is_ascii_lowercase()
                    || character.is_ascii_digit()
                    || **character == ' '
                    || is_decimal_point(&characters, *index)
            })
            .map(|(_, character)| *character)
            .collect();

        let mut text = WHITESPACE.replace_all(text.trim(), " ").into_owned();

        while let Some(found) = ARTICLE_PREFIX.find(&text) {
            text = text[found.end()..].to_string();
        }

        text
    }

    /// Every accepted spelling of each answer, deduplicated and in discovery order.
    pub fn compile_text_answers_list(&self, answers: &[String]) -> Vec<String> {
        let mut compiled = Vec::new();
        let mut seen = HashSet::new();

        for answer in answers {
            if answer.trim().is_empty() {
                continue;
            }

            for special in self.expand_special_cases(answer) {
                for candidate in self.expand_parentheticals(&special) {
                    for alternative in self.expand_slashes(&candidate) {
                        let cleaned = self.compile_text_answer(&alternative);
                        push_unique(&mut compiled, &mut seen, cleaned);
                    }
                }
            }
        }

        let rules: [fn(&TriviaAnswerCompiler, &str) -> Option<String>; 4] = [
            TriviaAnswerCompiler::without_pronoun_prefix,
            TriviaAnswerCompiler::without_middle_initial,
            TriviaAnswerCompiler::without_generational_suffix,
            TriviaAnswerCompiler::without_unit,
        ];

        for rule in rules.iter() {
            for existing in compiled.clone() {
                if let Some(variant) = rule(self, &existing) {
                    push_unique(&mut compiled, &mut seen, variant);
                }
            }
        }

        debug!("Compiled answers {:?} into {:?}", answers, compiled);
        compiled
    }

    /// Adds cardinal, ordinal, year and per-digit spellings for arabic numbers
    /// and roman numerals found in an already cleaned answer.
    pub fn expand_numerals(&self, cleaned_answer: &str) -> Vec<String> {
        let words: Vec<&str> = cleaned_answer.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut alternatives: Vec<Vec<String>> = Vec::with_capacity(words.len());
        let mut combinations: usize = 1;

        for (index, word) in words.iter().enumerate() {
            let separator = if index == 0 { "" } else { " " };
            let mut options = self.numeral_alternatives(word);

            if options.is_empty() || combinations.saturating_mul(options.len()) > MAX_NUMERAL_VARIANTS
            {
                options = vec![word.to_string()];
            }

            combinations = combinations.saturating_mul(options.len());
            alternatives.push(
                options
                    .into_iter()
                    .map(|option| format!("{}{}", separator, option))
                    .collect(),
            );
        }

        let mut expanded = Vec::new();
        let mut seen = HashSet::new();
        for variant in cartesian_product(&alternatives) {
            push_unique(&mut expanded, &mut seen, variant);
        }

        expanded
    }

    /// The cleaned correct answers stored on a question-answer question: every
    /// compiled spelling plus its numeral expansions.
    pub fn compile_cleaned_correct_answers(&self, correct_answers: &[String]) -> Vec<String> {
        let mut cleaned = Vec::new();
        let mut seen = HashSet::new();

        for compiled in self.compile_text_answers_list(correct_answers) {
            push_unique(&mut cleaned, &mut seen, compiled.clone());
            for expanded in self.expand_numerals(&compiled) {
                push_unique(&mut cleaned, &mut seen, expanded);
            }
        }

        cleaned
    }

    pub fn compile_bool_answer(&self, answer: &str) -> Result<bool, TriviaError> {
        match self.compile_text_answer(answer).as_str() {
            "t" | "true" | "1" => Ok(true),
            "f" | "false" | "0" => Ok(false),
            _ => Err(TriviaError::BadTriviaAnswer(answer.to_string())),
        }
    }

    /// `"a"` → 0, `"b"` → 1, and so on.
    pub fn compile_multiple_choice_answer(&self, answer: &str) -> Result<usize, TriviaError> {
        let cleaned = self.compile_text_answer(answer);
        let mut characters = cleaned.chars();

        match (characters.next(), characters.next()) {
            (Some(letter), None) if letter.is_ascii_alphabetic() => {
                let ordinal = (letter.to_ascii_uppercase() as u8 - b'A') % 26;
                Ok(usize::from(ordinal))
            }
            _ => Err(TriviaError::BadTriviaAnswer(answer.to_string())),
        }
    }

    // ========================================================================
    // Expansion steps
    // ========================================================================

    fn expand_special_cases(&self, answer: &str) -> Vec<String> {
        if let Some(captures) = EQUATION.captures(answer) {
            let variable = &captures[1];
            let value = &captures[2];
            return vec![
                value.to_string(),
                format!("{} = {}", variable, value),
                format!("{} is {}", variable, value),
                format!("{} equals {}", variable, value),
            ];
        }

        if let Some(captures) = CURRENCY.captures(answer) {
            let amount = &captures[1];
            return vec![format!("{} usd", amount), amount.to_string()];
        }

        if answer.contains('#') {
            let parts: Vec<&str> = answer.split('#').collect();
            if parts.len() - 1 <= MAX_SPLIT_POSITIONS {
                let mut alternatives: Vec<Vec<String>> = Vec::new();
                for (index, part) in parts.iter().enumerate() {
                    if index > 0 {
                        alternatives.push(vec!["number ".to_string(), "#".to_string()]);
                    }
                    alternatives.push(vec![part.to_string()]);
                }
                return cartesian_product(&alternatives);
            }
        }

        vec![answer.to_string()]
    }

    fn expand_parentheticals(&self, answer: &str) -> Vec<String> {
        let groups: Vec<regex::Match> = PARENTHETICAL.find_iter(answer).collect();
        if groups.is_empty() || groups.len() > MAX_PARENTHETICALS {
            return vec![answer.to_string()];
        }

        let mut results = Vec::with_capacity(1 << groups.len());

        for mask in 0..(1usize << groups.len()) {
            let mut candidate = String::with_capacity(answer.len());
            let mut position = 0;

            for (index, group) in groups.iter().enumerate() {
                candidate.push_str(&answer[position..group.start()]);
                if mask & (1 << index) != 0 {
                    let inner = &answer[group.start() + 1..group.end() - 1];
                    candidate.push(' ');
                    candidate.push_str(inner);
                    candidate.push(' ');
                } else {
                    candidate.push(' ');
                }
                position = group.end();
            }

            candidate.push_str(&answer[position..]);
            results.push(candidate);
        }

        results
    }

    fn expand_slashes(&self, answer: &str) -> Vec<String> {
        let mut results = vec![answer.to_string()];

        if answer.contains('/') {
            results.extend(
                answer
                    .split('/')
                    .filter(|part| !part.trim().is_empty())
                    .map(|part| part.to_string()),
            );
        }

        results
    }

    fn numeral_alternatives(&self, word: &str) -> Vec<String> {
        if let Some(captures) = ARABIC_NUMBER.captures(word) {
            let digits = &captures[1];
            return match digits.parse::<u64>() {
                Ok(number) => vec![
                    cardinal_words(number),
                    ordinal_words(number),
                    format!("the {}", ordinal_words(number)),
                    year_words(number),
                    digit_words(digits),
                ],
                Err(_) => vec![word.to_string()],
            };
        }

        if is_roman_numeral(word) {
            if let Some(number) = roman_to_int(word) {
                return vec![
                    word.to_lowercase(),
                    cardinal_words(number),
                    ordinal_words(number),
                    format!("the {}", ordinal_words(number)),
                    year_words(number),
                ];
            }
        }

        vec![word.to_string()]
    }

    // ========================================================================
    // Variant rules over cleaned answers
    // ========================================================================

    fn without_pronoun_prefix(&self, cleaned: &str) -> Option<String> {
        PRONOUN_PREFIXES
            .iter()
            .find_map(|prefix| cleaned.strip_prefix(prefix))
            .map(|rest| self.compile_text_answer(rest))
    }

    fn without_middle_initial(&self, cleaned: &str) -> Option<String> {
        let words: Vec<&str> = cleaned.split(' ').collect();
        if words.len() < 3 || words[1].len() != 1 || words[1] == "a" {
            return None;
        }
        if !words[1].chars().all(|character| character.is_ascii_alphabetic()) {
            return None;
        }

        let mut remaining = words.clone();
        remaining.remove(1);
        Some(remaining.join(" "))
    }

    fn without_generational_suffix(&self, cleaned: &str) -> Option<String> {
        let (head, last) = cleaned.rsplit_once(' ')?;
        if GENERATIONAL_SUFFIXES.contains(&last) {
            Some(head.to_string())
        } else {
            None
        }
    }

    fn without_unit(&self, cleaned: &str) -> Option<String> {
        let captures = LEADING_NUMBER.captures(cleaned)?;
        let all_units = captures[2]
            .split(' ')
            .all(|word| UNITS.contains(&word));

        if all_units {
            Some(captures[1].to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_list(values: &[&str]) -> Vec<String> {
        let answers: Vec<String> = values.iter().map(|value| value.to_string()).collect();
        TriviaAnswerCompiler::new().compile_text_answers_list(&answers)
    }

    fn sorted(mut values: Vec<String>) -> Vec<String> {
        values.sort();
        values
    }

    fn strings(values: &[&str]) -> Vec<String> {
        let mut values: Vec<String> = values.iter().map(|value| value.to_string()).collect();
        values.sort();
        values
    }

    #[test]
    fn compile_text_answer_cleans_markup_and_articles() {
        let compiler = TriviaAnswerCompiler::new();

        assert_eq!(compiler.compile_text_answer("  The Beatles  "), "beatles");
        assert_eq!(compiler.compile_text_answer("<i>Hamlet</i>"), "hamlet");
        assert_eq!(compiler.compile_text_answer("[em]bold[/em] move"), "bold move");
        assert_eq!(compiler.compile_text_answer("Rock & Roll"), "rock and roll");
        assert_eq!(compiler.compile_text_answer("line\none"), "line one");
        assert_eq!(compiler.compile_text_answer("Hello, World!"), "hello world");
        assert_eq!(compiler.compile_text_answer("Pokémon"), "pokemon");
        assert_eq!(compiler.compile_text_answer("ＦＵＬＬＷＩＤＴＨ"), "fullwidth");
        assert_eq!(compiler.compile_text_answer("Мoscow"), "moscow");
        assert_eq!(compiler.compile_text_answer("a an the cat"), "cat");
        assert_eq!(compiler.compile_text_answer("[A]"), "a");
        assert_eq!(compiler.compile_text_answer("\n"), "");
        assert_eq!(compiler.compile_text_answer("$12,456.70"), "12456.70");
        assert_eq!(compiler.compile_text_answer("Apollo 11. Or 12."), "apollo 11 or 12");
    }

    #[test]
    fn compile_text_answer_is_idempotent() {
        let compiler = TriviaAnswerCompiler::new();

        for raw in [
            "The The",
            "An (Apple) a day...",
            "  & Sons",
            "Ça va? Ｔｅｓｔ",
            "<b>the</b> a",
            "$1,000",
            "$12,456.70 and 3.",
        ] {
            let once = compiler.compile_text_answer(raw);
            assert_eq!(compiler.compile_text_answer(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn trailing_space_never_adds_answers() {
        for raw in ["Between the Buried & Me", "(Eddie) Van Halen", "mambo #5", "x = 5"] {
            let plain = compile_list(&[raw]);
            let padded = compile_list(&[&format!("{} ", raw)]);
            assert!(padded.iter().all(|answer| plain.contains(answer)));
        }
    }

    #[test]
    fn duplicates_and_blanks_are_dropped() {
        assert_eq!(
            sorted(compile_list(&["hello", "Hello", "HELLO", "world", "World", "World!"])),
            strings(&["hello", "world"])
        );
        assert!(compile_list(&["", "  ", "!!"]).is_empty());
        assert_eq!(compile_list(&["three"]), strings(&["three"]));
    }

    #[test]
    fn special_cases_expand() {
        assert_eq!(
            sorted(compile_list(&["mambo #5"])),
            strings(&["mambo 5", "mambo number 5"])
        );
        assert_eq!(
            sorted(compile_list(&["x = 5"])),
            strings(&["5", "x 5", "x equals 5", "x is 5"])
        );
    }

    #[test]
    fn parentheticals_expand_every_combination() {
        assert_eq!(
            sorted(compile_list(&["(Eddie) Van Halen"])),
            strings(&["eddie van halen", "van halen"])
        );
        assert_eq!(
            sorted(compile_list(&["(Kurt) Vonnegut (Jr.)"])),
            strings(&["kurt vonnegut", "kurt vonnegut jr", "vonnegut", "vonnegut jr"])
        );
    }

    #[test]
    fn slash_alternatives_expand() {
        assert_eq!(
            sorted(compile_list(&["groan/grown"])),
            strings(&["groan", "groangrown", "grown"])
        );
    }

    #[test]
    fn pronoun_prefixes_are_optional() {
        assert_eq!(sorted(compile_list(&["his car"])), strings(&["car", "his car"]));
        assert_eq!(
            sorted(compile_list(&["her ponytail"])),
            strings(&["her ponytail", "ponytail"])
        );
        assert_eq!(
            sorted(compile_list(&["he is a vampire"])),
            strings(&["he is a vampire", "vampire"])
        );
        assert_eq!(
            sorted(compile_list(&["he's a vampire"])),
            strings(&["hes a vampire", "vampire"])
        );
        assert_eq!(
            sorted(compile_list(&["they're friends"])),
            strings(&["friends", "theyre friends"])
        );
    }

    #[test]
    fn names_drop_initials_and_suffixes() {
        assert_eq!(
            sorted(compile_list(&["George P. Schultz"])),
            strings(&["george p schultz", "george schultz"])
        );
        assert_eq!(
            sorted(compile_list(&["Luigi M. Mario Jr."])),
            strings(&["luigi m mario", "luigi m mario jr", "luigi mario", "luigi mario jr"])
        );
        assert_eq!(
            sorted(compile_list(&["Eddie Van Halen"])),
            strings(&["eddie van halen"])
        );
    }

    #[test]
    fn leading_numbers_drop_units() {
        assert_eq!(sorted(compile_list(&["5 years"])), strings(&["5", "5 years"]));
        assert_eq!(
            sorted(compile_list(&["50 years old"])),
            strings(&["50", "50 years old"])
        );
        assert_eq!(sorted(compile_list(&["$123 USD"])), strings(&["123", "123 usd"]));
        assert_eq!(sorted(compile_list(&["$1 US"])), strings(&["1", "1 usd"]));
        assert_eq!(
            sorted(compile_list(&["$12,456.70"])),
            strings(&["12456.70", "12456.70 usd"])
        );
        assert_eq!(
            sorted(compile_list(&["$1,245,670"])),
            strings(&["1245670", "1245670 usd"])
        );
        assert_eq!(
            sorted(compile_list(&["30 Seconds to Mars"])),
            strings(&["30 seconds to mars"])
        );
    }

    #[test]
    fn numerals_expand_to_words() {
        let compiler = TriviaAnswerCompiler::new();

        assert_eq!(
            sorted(compiler.expand_numerals("3")),
            strings(&["the third", "third", "three"])
        );
        assert_eq!(
            sorted(compiler.expand_numerals("50")),
            strings(&["fifty", "fiftieth", "five zero", "the fiftieth"])
        );
        assert_eq!(compiler.expand_numerals("1234").len(), 5);
        assert_eq!(
            sorted(compiler.expand_numerals("xiv")),
            strings(&["fourteen", "fourteenth", "the fourteenth", "xiv"])
        );
        assert_eq!(
            sorted(compiler.expand_numerals("henry 8")),
            strings(&["henry eight", "henry eighth", "henry the eighth"])
        );
        assert_eq!(compiler.expand_numerals("hello"), vec!["hello".to_string()]);
        assert!(compiler.expand_numerals("").is_empty());
    }

    #[test]
    fn bool_answers() {
        let compiler = TriviaAnswerCompiler::new();

        assert!(compiler.compile_bool_answer("True").unwrap());
        assert!(compiler.compile_bool_answer(" t ").unwrap());
        assert!(compiler.compile_bool_answer("1").unwrap());
        assert!(!compiler.compile_bool_answer("FALSE").unwrap());
        assert!(!compiler.compile_bool_answer("0").unwrap());
        assert!(matches!(
            compiler.compile_bool_answer("banana"),
            Err(TriviaError::BadTriviaAnswer(_))
        ));
        assert!(compiler.compile_bool_answer("\n").is_err());
    }

    #[test]
    fn multiple_choice_answers() {
        let compiler = TriviaAnswerCompiler::new();

        assert_eq!(compiler.compile_multiple_choice_answer("a").unwrap(), 0);
        assert_eq!(compiler.compile_multiple_choice_answer("D").unwrap(), 3);
        assert_eq!(compiler.compile_multiple_choice_answer("[B]").unwrap(), 1);
        assert_eq!(compiler.compile_multiple_choice_answer(" z ").unwrap(), 25);
        assert!(compiler.compile_multiple_choice_answer("1").is_err());
        assert!(compiler.compile_multiple_choice_answer("ab").is_err());
        assert!(compiler.compile_multiple_choice_answer("").is_err());
    }
}
