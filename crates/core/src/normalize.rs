//! Text normalization and punctuation/skip-word stripping.
//!
//! Mirrors the normalization rules of the original template language:
//! collapse whitespace, casefold, and apply Unicode NFC normalization so
//! that matching is insensitive to superficial formatting differences.

use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// All punctuation characters stripped from matched entity text.
pub const PUNCTUATION_ALL: &[char] = &[
    '.', ',', ';', ':', '!', '?', '"', '\'', '`', '«', '»', '“', '”', '‘', '’',
];

/// Punctuation that terminates a sentence (kept distinct because a few
/// recognizers only want to strip *trailing* punctuation, not mid-sentence
/// apostrophes etc).
pub const PUNCTUATION_END: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Collapse runs of whitespace into a single ASCII space and trim the ends.
pub fn normalize_whitespace(text: &str) -> Cow<'_, str> {
    if !text.chars().any(char::is_whitespace) {
        return Cow::Borrowed(text.trim());
    }
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true; // collapse leading whitespace too
    for c in text.trim().chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    Cow::Owned(out)
}

/// Normalize text for matching: collapse whitespace, casefold, NFC-normalize.
pub fn normalize_text(text: &str) -> String {
    let collapsed = normalize_whitespace(text);
    collapsed.to_lowercase().nfc().collect()
}

/// Strip all punctuation characters from `text`.
pub fn remove_punctuation(text: &str) -> String {
    text.chars().filter(|c| !PUNCTUATION_ALL.contains(c)).collect()
}

/// Remove occurrences of `skip_words` from `text`, longest words first so
/// that a skip word that is a prefix of another doesn't eat part of it.
/// Word-boundary aware (whole tokens only) unless `ignore_whitespace`, in
/// which case whitespace carries no boundary meaning and matches are
/// removed as plain substrings of the whitespace-stripped text.
pub fn remove_skip_words(text: &str, skip_words: &[String], ignore_whitespace: bool) -> String {
    if skip_words.is_empty() {
        return text.to_string();
    }
    let mut words: Vec<&str> = skip_words.iter().map(String::as_str).collect();
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));

    if ignore_whitespace {
        let mut out: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        for skip in &words {
            let skip: String = skip.chars().filter(|c| !c.is_whitespace()).collect();
            if !skip.is_empty() {
                out = out.replace(skip.as_str(), "");
            }
        }
        return out;
    }

    let mut out = String::with_capacity(text.len());
    'outer: for token in text.split_whitespace() {
        for skip in &words {
            if token.eq_ignore_ascii_case(skip) {
                continue 'outer;
            }
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

/// Returns true if `text` is a template (contains syntax metacharacters) as
/// opposed to a plain literal sentence.
pub fn is_template(text: &str) -> bool {
    text.contains(['(', '[', '{', '<', '|', ';'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("hello", "hello")]
    #[case::collapses("hello   world", "hello world")]
    #[case::trims("  hello world  ", "hello world")]
    #[case::tabs_newlines("hello\t\nworld", "hello world")]
    fn test_normalize_whitespace(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_whitespace(input), expected);
    }

    #[rstest]
    #[case::casefold("HELLO World", "hello world")]
    #[case::combined("  Turn   ON the Light  ", "turn on the light")]
    fn test_normalize_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_text(input), expected);
    }

    #[test]
    fn test_remove_punctuation() {
        assert_eq!(remove_punctuation("hello, world!"), "hello world");
    }

    #[test]
    fn test_remove_skip_words() {
        let skip = vec!["please".to_string(), "the".to_string()];
        assert_eq!(
            remove_skip_words("please turn on the light", &skip, false),
            "turn on light"
        );
    }

    #[test]
    fn test_remove_skip_words_ignore_whitespace() {
        let skip = vec!["the".to_string()];
        assert_eq!(remove_skip_words("turnonthelight", &skip, true), "turnonlight");
    }

    #[test]
    fn test_is_template() {
        assert!(is_template("turn on [the] {light}"));
        assert!(!is_template("turn on the light"));
    }

    proptest::proptest! {
        /// Normalizing already-normalized text is a no-op: `normalize_text`
        /// converges in one application.
        #[test]
        fn prop_normalize_text_is_idempotent(s in "[a-zA-Z0-9 \t\n.,!?'-]{0,64}") {
            let once = normalize_text(&s);
            let twice = normalize_text(&once);
            proptest::prop_assert_eq!(once, twice);
        }
    }
}
