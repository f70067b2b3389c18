use std::sync::LazyLock;

use regex::Regex;

use crate::OtpCandidate;

/// Substrings that mark a message as OTP-bearing. Matched by plain
/// containment against the lowercased text, so "codecs" counts as "code".
pub const TRIGGER_WORDS: [&str; 3] = ["code", "access", "otp"];

// A 4-10 digit run that is not glued to another digit on either side.
static CODE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{4,10})(?:[^0-9]|$)").expect("static regex is valid")
});

/// Returns the leftmost digit run of 4 to 10 digits bounded by non-digits or
/// the ends of the text.
///
/// Only an adjacent digit breaks a run: letters do not, so `ABC123456` and
/// `123456abc` both yield `123456`. This is not a `\b` word boundary.
pub fn extract_code(text: &str) -> Option<&str> {
    CODE_RUN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn has_trigger_word(text: &str) -> bool {
    let lowered = text.to_lowercase();
    TRIGGER_WORDS.iter().any(|word| lowered.contains(word))
}

pub fn is_otp_text(text: &str) -> bool {
    extract_code(text).is_some() && has_trigger_word(text)
}

/// Accepts `text` as an OTP message when it carries both a qualifying digit
/// run and a trigger word. The candidate keeps the original casing.
pub fn classify(text: &str, timestamp: i64) -> Option<OtpCandidate> {
    let code = extract_code(text)?;
    if !has_trigger_word(text) {
        return None;
    }
    Some(OtpCandidate {
        code: code.to_string(),
        source_text: text.to_string(),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::{extract_code, has_trigger_word};

    #[test]
    fn run_at_text_edges_is_found() {
        assert_eq!(extract_code("1234"), Some("1234"));
        assert_eq!(extract_code("code 9876"), Some("9876"));
        assert_eq!(extract_code("9876 is your code"), Some("9876"));
    }

    #[test]
    fn punctuation_counts_as_boundary() {
        assert_eq!(extract_code("G-482910."), Some("482910"));
        assert_eq!(extract_code("code:123456,"), Some("123456"));
    }

    #[test]
    fn too_short_and_too_long_runs_are_skipped() {
        assert_eq!(extract_code("pin 123"), None);
        assert_eq!(extract_code("call 123456789012"), None);
        assert_eq!(extract_code("call 123456789012 or use 5555"), Some("5555"));
    }

    #[test]
    fn trigger_match_ignores_case_and_word_boundaries() {
        assert!(has_trigger_word("Your ACCESS key"));
        assert!(has_trigger_word("supported codecs"));
        assert!(has_trigger_word("OTP"));
        assert!(!has_trigger_word("hello there"));
    }
}
