//! Pluggable word-number recognition.
//!
//! The matcher needs to turn a spoken number like "twenty one" back into the
//! integer `21` for a given language. That capability is treated as an
//! external collaborator: callers can plug in a richer engine (arbitrary
//! languages, ordinal forms, etc) by implementing [`NumberWords`]. This
//! crate ships one concrete engine, [`EnglishCardinals`], covering the
//! common case.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::trie::Trie;

/// Converts between integers and their spelled-out word forms for a given
/// language.
pub trait NumberWords: Send + Sync {
    /// All word forms that name `n` in `language` (usually one, sometimes a
    /// couple of equally valid spellings).
    fn number_to_words(&self, language: &str, n: i64) -> Vec<String>;
}

/// English cardinal numbers from 0 to 999.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishCardinals;

const ONES: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];
const TENS: &[&str] = &[
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

impl EnglishCardinals {
    fn spell(n: i64) -> Option<String> {
        if !(0..1000).contains(&n) {
            return None;
        }
        if n < 20 {
            return Some(ONES[n as usize].to_string());
        }
        if n < 100 {
            let tens = TENS[(n / 10) as usize];
            let ones = n % 10;
            return Some(if ones == 0 {
                tens.to_string()
            } else {
                format!("{tens}-{}", ONES[ones as usize])
            });
        }
        let hundreds = n / 100;
        let rest = n % 100;
        let head = format!("{} hundred", ONES[hundreds as usize]);
        Some(if rest == 0 {
            head
        } else {
            format!("{head} {}", Self::spell(rest).unwrap())
        })
    }
}

impl NumberWords for EnglishCardinals {
    fn number_to_words(&self, language: &str, n: i64) -> Vec<String> {
        if language != "en" {
            return Vec::new();
        }
        Self::spell(n).into_iter().collect()
    }
}

/// Process-wide cache of word-number engines, keyed by language. Safe to
/// insert into concurrently: `get_or_init` never overwrites an existing
/// entry.
static ENGINE_CACHE: OnceLock<Mutex<HashMap<String, &'static dyn NumberWords>>> = OnceLock::new();

fn engine_cache() -> &'static Mutex<HashMap<String, &'static dyn NumberWords>> {
    ENGINE_CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Register `engine` as the word-number engine for `language`. Subsequent
/// calls to [`range_trie`] for that language will use it.
pub fn register_engine(language: &str, engine: &'static dyn NumberWords) {
    engine_cache()
        .lock()
        .unwrap()
        .entry(language.to_string())
        .or_insert(engine);
}

fn engine_for(language: &str) -> &'static dyn NumberWords {
    static DEFAULT: EnglishCardinals = EnglishCardinals;
    let mut cache = engine_cache().lock().unwrap();
    *cache.entry(language.to_string()).or_insert(&DEFAULT)
}

/// Process-wide cache of `(language, start, stop, step)` -> word trie, so
/// repeated matches against the same range don't re-spell every value.
type RangeKey = (String, i64, i64, i64);
static RANGE_TRIE_CACHE: OnceLock<Mutex<HashMap<RangeKey, &'static Trie<i64>>>> = OnceLock::new();

fn range_trie_cache() -> &'static Mutex<HashMap<RangeKey, &'static Trie<i64>>> {
    RANGE_TRIE_CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Build (or fetch from cache) a trie mapping spelled-out number words to
/// their integer value, for every value in `start..=stop` step `step`, in
/// `language`. Hyphenated forms ("twenty-one") are also inserted with
/// hyphens replaced by spaces, matching how a transcript would render them.
pub fn range_trie(language: &str, start: i64, stop: i64, step: i64) -> &'static Trie<i64> {
    let key = (language.to_string(), start, stop, step);
    let mut cache = range_trie_cache().lock().unwrap();
    if let Some(trie) = cache.get(&key) {
        return trie;
    }
    let engine = engine_for(language);
    let mut trie: Trie<i64> = Trie::new();
    let mut n = start;
    while n <= stop {
        for word in engine.number_to_words(language, n) {
            trie.insert(&word, n);
            if word.contains('-') {
                trie.insert(&word.replace('-', " "), n);
            }
            // A whitespace-free variant, for `settings.ignore_whitespace`
            // documents whose input never contains a space to split on.
            let condensed: String = word.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect();
            if condensed != word {
                trie.insert(&condensed, n);
            }
        }
        n += step;
    }
    let leaked: &'static Trie<i64> = Box::leak(Box::new(trie));
    cache.insert(key, leaked);
    leaked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spell_small_numbers() {
        assert_eq!(EnglishCardinals.number_to_words("en", 0), vec!["zero"]);
        assert_eq!(EnglishCardinals.number_to_words("en", 7), vec!["seven"]);
        assert_eq!(EnglishCardinals.number_to_words("en", 13), vec!["thirteen"]);
    }

    #[test]
    fn test_spell_tens() {
        assert_eq!(EnglishCardinals.number_to_words("en", 21), vec!["twenty-one"]);
        assert_eq!(EnglishCardinals.number_to_words("en", 90), vec!["ninety"]);
    }

    #[test]
    fn test_spell_hundreds() {
        assert_eq!(
            EnglishCardinals.number_to_words("en", 250),
            vec!["two hundred fifty"]
        );
    }

    #[test]
    fn test_unsupported_language_empty() {
        assert!(EnglishCardinals.number_to_words("fr", 5).is_empty());
    }

    #[test]
    fn test_range_trie_finds_words() {
        let trie = range_trie("en", 1, 30, 1);
        let hits = trie.find("twenty one lights", false);
        assert!(hits.iter().any(|h| h.text == "twenty"));
    }
}
