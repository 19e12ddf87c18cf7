//! Slot list types: the things `{list_name}` can resolve to.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::expression::Sentence;

/// A single value a [`TextSlotList`] can match against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSlotValue {
    /// Normalized input text this value matches.
    pub text_in: String,
    /// Value substituted into the matched entity.
    pub value_out: JsonValue,
    /// Context items merged into the match's intent context when this value
    /// is matched.
    #[serde(default)]
    pub context: IndexMap<String, JsonValue>,
    /// Free-form metadata surfaced on the matched entity.
    #[serde(default)]
    pub metadata: IndexMap<String, JsonValue>,
    /// `text_in` parsed as a template, when it contains template syntax
    /// (`is_template`). A plain literal value leaves this `None` and is
    /// matched with a direct prefix comparison instead.
    #[serde(skip)]
    pub template: Option<Sentence>,
}

impl TextSlotValue {
    pub fn new(text_in: impl Into<String>, value_out: JsonValue) -> Self {
        Self::with_context(text_in, value_out, IndexMap::new(), IndexMap::new())
    }

    pub fn with_context(
        text_in: impl Into<String>,
        value_out: JsonValue,
        context: IndexMap<String, JsonValue>,
        metadata: IndexMap<String, JsonValue>,
    ) -> Self {
        let text_in = crate::normalize::normalize_text(&text_in.into());
        let template = if crate::normalize::is_template(&text_in) {
            crate::parser::parse_sentence(&text_in).ok()
        } else {
            None
        };
        TextSlotValue {
            text_in,
            value_out,
            context,
            metadata,
            template,
        }
    }
}

/// The kind of quantity a [`RangeSlotList`] enumerates, controlling display
/// formatting for samples (spec's `type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeType {
    Number,
    Percentage,
    Temperature,
}

/// Controls what fractional values are enumerated alongside each whole
/// number a range slot list samples, e.g. `21` and `21.5` for `halves`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractionType {
    None,
    Halves,
    Tenths,
}

impl Default for FractionType {
    fn default() -> Self {
        FractionType::None
    }
}

/// A contiguous numeric range slot list, e.g. `1..100 step 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSlotList {
    pub start: i64,
    pub stop: i64,
    #[serde(default = "default_step")]
    pub step: i64,
    #[serde(default = "default_range_type")]
    pub r#type: RangeType,
    /// Number of leading zero-padded digits to require/produce, if any.
    #[serde(default)]
    pub digits: Option<usize>,
    /// Whether this list should also recognize spelled-out number words.
    #[serde(default)]
    pub words: bool,
    #[serde(default = "default_language")]
    pub words_language: String,
    /// Scale applied to matched values (e.g. percentages represented 0-1).
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default)]
    pub fraction_type: FractionType,
}

fn default_step() -> i64 {
    1
}
fn default_range_type() -> RangeType {
    RangeType::Number
}
fn default_language() -> String {
    "en".to_string()
}
fn default_multiplier() -> f64 {
    1.0
}

impl RangeSlotList {
    pub fn new(start: i64, stop: i64, step: i64) -> Result<Self> {
        if start >= stop {
            return Err(Error::Value("start must be less than stop".to_string()));
        }
        if step <= 0 {
            return Err(Error::Value("step must be positive".to_string()));
        }
        Ok(RangeSlotList {
            start,
            stop,
            step,
            r#type: RangeType::Number,
            digits: None,
            words: false,
            words_language: default_language(),
            multiplier: default_multiplier(),
            fraction_type: FractionType::None,
        })
    }

    /// Every integer value in the range, inclusive of both ends.
    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        let mut n = self.start;
        std::iter::from_fn(move || {
            if n > self.stop {
                None
            } else {
                let out = n;
                n += self.step;
                Some(out)
            }
        })
    }

    pub fn contains(&self, n: i64) -> bool {
        n >= self.start && n <= self.stop && (n - self.start) % self.step == 0
    }
}

/// An unconstrained wildcard slot: matches any run of text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WildcardSlotList;

/// A named slot list: either a fixed vocabulary, a numeric range, or a
/// wildcard.
#[derive(Debug, Clone)]
pub enum SlotList {
    Text(TextSlotList),
    Range(RangeSlotList),
    Wildcard(WildcardSlotList),
}

/// A slot list backed by an explicit vocabulary of text values.
#[derive(Debug, Clone, Default)]
pub struct TextSlotList {
    pub values: Vec<TextSlotValue>,
}

impl TextSlotList {
    pub fn from_strings(strings: impl IntoIterator<Item = String>) -> Self {
        TextSlotList {
            values: strings
                .into_iter()
                .map(|s| TextSlotValue::new(s.clone(), JsonValue::String(s)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_validation() {
        assert!(RangeSlotList::new(1, 10, 1).is_ok());
        assert!(RangeSlotList::new(10, 1, 1).is_err());
        assert!(RangeSlotList::new(1, 10, 0).is_err());
    }

    #[test]
    fn test_range_values() {
        let range = RangeSlotList::new(0, 10, 5).unwrap();
        assert_eq!(range.values().collect::<Vec<_>>(), vec![0, 5, 10]);
    }

    #[test]
    fn test_range_contains() {
        let range = RangeSlotList::new(0, 10, 2).unwrap();
        assert!(range.contains(4));
        assert!(!range.contains(3));
        assert!(!range.contains(12));
    }

    #[test]
    fn test_text_slot_list_from_strings() {
        let list = TextSlotList::from_strings(["On".to_string(), "Off".to_string()]);
        assert_eq!(list.values.len(), 2);
        assert_eq!(list.values[0].text_in, "on");
    }
}
