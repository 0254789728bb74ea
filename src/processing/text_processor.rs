//! Text cleaning and symbol-preserving tokenization

use once_cell::sync::Lazy;
use regex::Regex;

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("Invalid URL regex"));

// Anything outside letters, digits, `+`, `#`, `.`, `-` and whitespace.
static DISALLOWED_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}+#.\s-]").expect("Invalid character filter regex"));

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}+#.]+").expect("Invalid token regex"));

/// A token borrowed from cleaned text, with its byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> Token<'a> {
    /// True when `next` follows this token after exactly one space.
    pub fn is_adjacent_to(&self, next: &Token<'_>, cleaned: &str) -> bool {
        next.start == self.end + 1 && cleaned.get(self.end..next.start) == Some(" ")
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextProcessor;

impl TextProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Strip URLs, lower-case, drop disallowed characters and collapse whitespace.
    pub fn clean_text(&self, text: &str) -> String {
        let without_urls = URL_REGEX.replace_all(text, " ");
        let lowered = without_urls.to_lowercase();
        let filtered = DISALLOWED_REGEX.replace_all(&lowered, "");
        // Dropping characters can open a word boundary in front of "www.".
        let filtered = URL_REGEX.replace_all(&filtered, " ");
        let collapsed = WHITESPACE_REGEX.replace_all(&filtered, " ");

        collapsed.trim().to_string()
    }

    /// Split cleaned text into tokens.
    ///
    /// `+`, `#` and `.` are token characters so "c++", "c#", ".net" and
    /// "react.js" come out whole. Trailing periods are dropped unless the
    /// token consists only of symbols, and `-` always separates tokens.
    pub fn tokenize<'a>(&self, cleaned: &'a str) -> Vec<Token<'a>> {
        TOKEN_REGEX
            .find_iter(cleaned)
            .map(|m| {
                let raw = m.as_str();
                let trimmed = raw.trim_end_matches('.');
                let text = if trimmed.chars().any(|c| c.is_alphanumeric()) {
                    trimmed
                } else {
                    raw
                };
                Token {
                    text,
                    start: m.start(),
                    end: m.start() + text.len(),
                }
            })
            .collect()
    }

    /// Clean a configured skill term and check that it tokenizes back to itself.
    ///
    /// Returns `None` when the term could never be produced by `tokenize`
    /// (e.g. "c/c++" or "problem-solving").
    pub fn canonical_form(&self, term: &str) -> Option<String> {
        let lowered = WHITESPACE_REGEX
            .replace_all(term.trim(), " ")
            .to_lowercase();
        if lowered.is_empty() || self.clean_text(&lowered) != lowered {
            return None;
        }

        let tokens = self.tokenize(&lowered);
        let rejoined = tokens.iter().map(|t| t.text).collect::<Vec<_>>().join(" ");
        let adjacent = tokens
            .windows(2)
            .all(|pair| pair[0].is_adjacent_to(&pair[1], &lowered));

        if adjacent && rejoined == lowered {
            Some(lowered)
        } else {
            None
        }
    }

    /// Number of whitespace-separated words in a term.
    pub fn word_count(&self, term: &str) -> usize {
        term.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
        tokens.iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_clean_text_strips_urls_and_symbols() {
        let processor = TextProcessor::new();
        let cleaned = processor.clean_text("See https://example.com/jobs?id=1  for *Rust*, (C++) & Go!");

        assert_eq!(cleaned, "see for rust c++ go");
    }

    #[test]
    fn test_url_exposed_by_filtering_is_stripped() {
        let processor = TextProcessor::new();
        let cleaned = processor.clean_text("see _www.example.org python");

        assert_eq!(cleaned, "see python");
        assert_eq!(processor.clean_text(&cleaned), cleaned);
    }

    #[test]
    fn test_symbol_preserving_tokenization() {
        let processor = TextProcessor::new();
        let cleaned = processor.clean_text("Experience with C++ and .NET");
        let tokens = processor.tokenize(&cleaned);

        assert_eq!(texts(&tokens), vec!["experience", "with", "c++", "and", ".net"]);
    }

    #[test]
    fn test_trailing_period_is_dropped() {
        let processor = TextProcessor::new();
        let cleaned = processor.clean_text("We use python. Also react.js and C#.");
        let tokens = processor.tokenize(&cleaned);

        assert_eq!(
            texts(&tokens),
            vec!["we", "use", "python", "also", "react.js", "and", "c#"]
        );
    }

    #[test]
    fn test_hyphen_separates_tokens() {
        let processor = TextProcessor::new();
        let cleaned = processor.clean_text("problem-solving");
        let tokens = processor.tokenize(&cleaned);

        assert_eq!(texts(&tokens), vec!["problem", "solving"]);
        assert!(!tokens[0].is_adjacent_to(&tokens[1], &cleaned));
    }

    #[test]
    fn test_adjacency_breaks_on_sentence_end() {
        let processor = TextProcessor::new();
        let cleaned = processor.clean_text("machine. learning");
        let tokens = processor.tokenize(&cleaned);

        assert!(!tokens[0].is_adjacent_to(&tokens[1], &cleaned));

        let cleaned = processor.clean_text("Machine   Learning");
        let tokens = processor.tokenize(&cleaned);
        assert!(tokens[0].is_adjacent_to(&tokens[1], &cleaned));
    }

    #[test]
    fn test_symbol_only_runs_are_kept() {
        let processor = TextProcessor::new();
        let tokens = processor.tokenize("a ... b ++");

        assert_eq!(texts(&tokens), vec!["a", "...", "b", "++"]);
    }

    #[test]
    fn test_canonical_form() {
        let processor = TextProcessor::new();

        assert_eq!(processor.canonical_form("  Machine   Learning "), Some("machine learning".to_string()));
        assert_eq!(processor.canonical_form("Node.js"), Some("node.js".to_string()));
        assert_eq!(processor.canonical_form("C++"), Some("c++".to_string()));
        assert_eq!(processor.canonical_form("problem-solving"), None);
        assert_eq!(processor.canonical_form("c/c++"), None);
        assert_eq!(processor.canonical_form("   "), None);
    }
}
