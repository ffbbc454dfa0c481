use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static HTML_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#\d+|[a-zA-Z]+);").expect("Failed to compile entity regex")
});

static SPACED_ELLIPSIS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\.\s){2,}\.|\.{3,}").expect("Failed to compile ellipsis regex")
});

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<\/?\w+>|\[\/?\w\w+\]").expect("Failed to compile tag regex")
});

static UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{2,}").expect("Failed to compile underscore regex"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

fn named_entity(name: &str) -> Option<&'static str> {
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "shy" => "",
        "hellip" => "…",
        "ndash" => "–",
        "mdash" => "—",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        "laquo" => "«",
        "raquo" => "»",
        "deg" => "°",
        "pi" => "π",
        "times" => "×",
        "divide" => "÷",
        "eacute" => "é",
        "Eacute" => "É",
        "egrave" => "è",
        "ecirc" => "ê",
        "euml" => "ë",
        "aacute" => "á",
        "agrave" => "à",
        "acirc" => "â",
        "auml" => "ä",
        "Auml" => "Ä",
        "aring" => "å",
        "iacute" => "í",
        "iuml" => "ï",
        "oacute" => "ó",
        "ocirc" => "ô",
        "ouml" => "ö",
        "Ouml" => "Ö",
        "oslash" => "ø",
        "uacute" => "ú",
        "ucirc" => "û",
        "uuml" => "ü",
        "Uuml" => "Ü",
        "ntilde" => "ñ",
        "ccedil" => "ç",
        "szlig" => "ß",
        _ => return None,
    };

    Some(decoded)
}

fn unescape_html(text: &str) -> String {
    HTML_ENTITY
        .replace_all(text, |captures: &Captures| {
            let entity = &captures[1];

            let numeric = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(decimal) = entity.strip_prefix('#') {
                decimal.parse::<u32>().ok()
            } else {
                None
            };

            match numeric.and_then(char::from_u32) {
                Some(character) => character.to_string(),
                None => named_entity(entity)
                    .map(str::to_string)
                    .unwrap_or_else(|| captures[0].to_string()),
            }
        })
        .into_owned()
}

/// Tidies question, category and response text as it arrives from a source.
#[derive(Debug, Default, Clone)]
pub struct TriviaQuestionCompiler;

impl TriviaQuestionCompiler {
    pub fn new() -> TriviaQuestionCompiler {
        TriviaQuestionCompiler
    }

    pub fn compile_question(&self, question: &str, html_unescape: bool) -> String {
        self.compile(question, html_unescape)
    }

    pub fn compile_category(&self, category: Option<&str>, html_unescape: bool) -> Option<String> {
        category
            .map(|category| self.compile(category, html_unescape))
            .filter(|category| !category.is_empty())
    }

    pub fn compile_response(&self, response: &str, html_unescape: bool) -> String {
        self.compile(response, html_unescape)
    }

    /// Blank responses are dropped.
    pub fn compile_responses(&self, responses: &[String], html_unescape: bool) -> Vec<String> {
        responses
            .iter()
            .map(|response| self.compile_response(response, html_unescape))
            .filter(|response| !response.is_empty())
            .collect()
    }

    fn compile(&self, text: &str, html_unescape: bool) -> String {
        let text = if html_unescape {
            unescape_html(text)
        } else {
            text.to_string()
        };

        let text = SPACED_ELLIPSIS.replace_all(&text, "…");
        let text = text.replace(['\r', '\n'], " ");
        let text = TAG.replace_all(&text, "");
        let text = UNDERSCORES.replace_all(&text, "___");

        WHITESPACE.replace_all(text.trim(), " ").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn questions_are_tidied() {
        let compiler = TriviaQuestionCompiler::new();

        assert_eq!(
            compiler.compile_question("  What is\nthe <b>answer</b>. . .  ", false),
            "What is the answer…"
        );
        assert_eq!(
            compiler.compile_question("Fill in the _____ blank....", false),
            "Fill in the ___ blank…"
        );
        assert_eq!(
            compiler.compile_question("Pick [A] or [B]", false),
            "Pick [A] or [B]"
        );
    }

    #[test]
    fn html_entities_are_unescaped_on_request() {
        let compiler = TriviaQuestionCompiler::new();

        assert_eq!(
            compiler.compile_question("Who wrote &quot;Hamlet&quot; &amp; more?", true),
            "Who wrote \"Hamlet\" & more?"
        );
        assert_eq!(compiler.compile_response("Pok&eacute;mon", true), "Pokémon");
        assert_eq!(compiler.compile_response("It&#039;s &#x41;", true), "It's A");
        assert_eq!(compiler.compile_response("&bogus;", true), "&bogus;");
        assert_eq!(compiler.compile_response("&amp;", false), "&amp;");
    }

    #[test]
    fn blank_categories_and_responses_vanish() {
        let compiler = TriviaQuestionCompiler::new();

        assert_eq!(compiler.compile_category(Some("  "), false), None);
        assert_eq!(
            compiler.compile_category(Some(" History "), false),
            Some("History".to_string())
        );
        assert_eq!(
            compiler.compile_responses(&["a".to_string(), " ".to_string()], false),
            vec!["a".to_string()]
        );
    }
}
