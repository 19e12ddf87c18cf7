//! The intents document model: intents, slot lists, and expansion rules
//! loaded from a YAML file.

use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::expression::Sentence;
use crate::parser::parse_sentence;
use crate::slots::{FractionType, RangeSlotList, RangeType, SlotList, TextSlotList, TextSlotValue};

/// One block of sentence templates and the slots assumed when any of them
/// matches.
#[derive(Debug, Deserialize)]
pub struct IntentData {
    #[serde(rename = "sentences")]
    pub sentence_texts: Vec<String>,
    #[serde(default)]
    pub slots: IndexMap<String, JsonValue>,
    #[serde(default)]
    pub requires_context: IndexMap<String, JsonValue>,
    #[serde(default)]
    pub excludes_context: IndexMap<String, JsonValue>,
    /// Words that must appear somewhere in the utterance for this data block
    /// to be tried at all; empty means no keyword gate.
    #[serde(default)]
    pub required_keywords: Vec<String>,
    /// Response text to report for a match against this data block,
    /// overriding `RecognizeOptions::default_response`.
    #[serde(default)]
    pub response: Option<String>,
    #[serde(skip)]
    sentences: OnceLock<Vec<Sentence>>,
}

impl IntentData {
    /// Sentence templates, parsed on first access and cached thereafter.
    pub fn sentences(&self) -> Result<&[Sentence]> {
        if self.sentences.get().is_none() {
            let parsed = crate::parser::parse_sentences(&self.sentence_texts)?;
            let _ = self.sentences.set(parsed);
        }
        Ok(self.sentences.get().unwrap())
    }
}

/// A named intent: one or more [`IntentData`] blocks.
#[derive(Debug, Deserialize)]
pub struct Intent {
    #[serde(default)]
    pub data: Vec<IntentData>,
}

/// Matcher-wide tuning knobs, set once per intents document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntentsSettings {
    /// Strip all whitespace from input and templates before matching,
    /// instead of treating it as a word boundary. Intended for
    /// non-whitespace-delimited languages: the recognizer strips whitespace
    /// from the input and skip words, `{list}`/range/wildcard slots stop
    /// treating whitespace as a boundary, and `required_keywords` (which has
    /// no tokens to split on in this mode) is skipped.
    pub ignore_whitespace: bool,
    /// Compile and apply the regex pre-filter before running the full
    /// matcher against a sentence.
    pub filter_with_regex: bool,
}

impl Default for IntentsSettings {
    fn default() -> Self {
        IntentsSettings {
            ignore_whitespace: false,
            filter_with_regex: true,
        }
    }
}

/// Top-level intents document: the language, the intents it recognizes, and
/// the slot lists / expansion rules / skip words they reference.
#[derive(Debug, Deserialize)]
pub struct Intents {
    pub language: String,
    pub intents: IndexMap<String, Intent>,
    #[serde(default, rename = "lists", deserialize_with = "deserialize_lists")]
    pub slot_lists: IndexMap<String, SlotList>,
    #[serde(default, deserialize_with = "deserialize_rules")]
    pub expansion_rules: IndexMap<String, Sentence>,
    #[serde(default)]
    pub skip_words: Vec<String>,
    #[serde(default)]
    pub settings: IntentsSettings,
}

impl Intents {
    /// Load an intents document from a YAML string. Richer loading (anchor
    /// merge preprocessing, field-path error messages) lives in
    /// `intently_util::yaml::parse_yaml`; this is the direct, dependency-free
    /// path used by library callers and tests.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Value(e.to_string()))
    }

    /// Expansion rules as bare `Sequence`s, the shape the matcher and
    /// sampler operate on (they don't need a rule's own source text or
    /// compiled regex pre-filter).
    pub fn expansion_rule_sequences(&self) -> IndexMap<String, crate::expression::Sequence> {
        self.expansion_rules.iter().map(|(k, v)| (k.clone(), v.root.clone())).collect()
    }
}

fn deserialize_rules<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, Sentence>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: IndexMap<String, String> = IndexMap::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(name, body)| {
            parse_sentence(&body)
                .map(|sentence| (name, sentence))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawListValue {
    Text(String),
    Detailed {
        r#in: String,
        out: JsonValue,
        #[serde(default)]
        context: IndexMap<String, JsonValue>,
        #[serde(default)]
        metadata: IndexMap<String, JsonValue>,
    },
}

#[derive(Debug, Deserialize)]
struct RawRange {
    from: i64,
    to: i64,
    #[serde(default = "one")]
    step: i64,
    #[serde(default)]
    r#type: Option<RangeType>,
    #[serde(default)]
    digits: Option<usize>,
    #[serde(default)]
    words: bool,
    #[serde(default)]
    words_language: Option<String>,
    #[serde(default)]
    multiplier: Option<f64>,
    #[serde(default)]
    fraction_type: Option<FractionType>,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawList {
    Values { values: Vec<RawListValue> },
    Range { range: RawRange },
    Wildcard { wildcard: bool },
}

fn deserialize_lists<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, SlotList>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: IndexMap<String, RawList> = IndexMap::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(name, list)| {
            let list = match list {
                RawList::Values { values } => {
                    let values = values
                        .into_iter()
                        .map(|v| match v {
                            RawListValue::Text(text) => TextSlotValue::new(text.clone(), JsonValue::String(text)),
                            RawListValue::Detailed {
                                r#in,
                                out,
                                context,
                                metadata,
                            } => TextSlotValue::with_context(r#in, out, context, metadata),
                        })
                        .collect();
                    SlotList::Text(TextSlotList { values })
                }
                RawList::Range { range } => {
                    let mut slot = RangeSlotList::new(range.from, range.to, range.step).map_err(serde::de::Error::custom)?;
                    if let Some(t) = range.r#type {
                        slot.r#type = t;
                    }
                    slot.digits = range.digits;
                    slot.words = range.words;
                    if let Some(lang) = range.words_language {
                        slot.words_language = lang;
                    }
                    if let Some(m) = range.multiplier {
                        slot.multiplier = m;
                    }
                    if let Some(f) = range.fraction_type {
                        slot.fraction_type = f;
                    }
                    SlotList::Range(slot)
                }
                RawList::Wildcard { wildcard } => {
                    if !wildcard {
                        return Err(serde::de::Error::custom("wildcard list must set `wildcard: true`"));
                    }
                    SlotList::Wildcard(crate::slots::WildcardSlotList)
                }
            };
            Ok((name, list))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
language: en
intents:
  HassLightTurnOn:
    data:
      - sentences:
          - "turn on [the] {area} light[s]"
        slots:
          domain: light
lists:
  area:
    values:
      - kitchen
      - living room
  brightness:
    range:
      from: 0
      to: 100
      words: true
expansion_rules:
  name: "<area>"
skip_words:
  - please
"#;

    #[test]
    fn test_parse_intents_yaml() {
        let intents = Intents::from_yaml_str(YAML).unwrap();
        assert_eq!(intents.language, "en");
        assert!(intents.intents.contains_key("HassLightTurnOn"));
        assert!(intents.slot_lists.contains_key("area"));
        assert!(intents.slot_lists.contains_key("brightness"));
        assert_eq!(intents.skip_words, vec!["please".to_string()]);
    }

    #[test]
    fn test_sentences_lazy_parse() {
        let intents = Intents::from_yaml_str(YAML).unwrap();
        let data = &intents.intents["HassLightTurnOn"].data[0];
        let sentences = data.sentences().unwrap();
        assert_eq!(sentences.len(), 1);
    }
}
