//! The recognizer façade: normalize input text, try it against every
//! sentence in an intents document, and shape the results.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::Result;
use crate::expression::Sequence;
use crate::intents::Intents;
use crate::matcher::{match_expression, MatchContext, MatchEntity, MatchSettings, UnmatchedEntity};
use crate::normalize::{normalize_text, remove_skip_words};
use crate::slots::SlotList;

/// Options controlling a recognition attempt.
#[derive(Debug, Clone, Default)]
pub struct RecognizeOptions {
    pub allow_unmatched_entities: bool,
    /// Extra context values available to `requires_context`/`excludes_context`
    /// checks and to `{list:slot}` context filtering.
    pub intent_context: IndexMap<String, JsonValue>,
    /// Only consider these intents, if non-empty.
    pub intents: Vec<String>,
    /// Extra slot lists, merged on top of (overriding) the document's own.
    pub slot_lists: IndexMap<String, SlotList>,
    /// Extra expansion rules, merged on top of (overriding) the document's
    /// own.
    pub expansion_rules: IndexMap<String, Sequence>,
    /// Skip words unioned with the document's own.
    pub skip_words: Vec<String>,
    /// Response text used when a matched intent-data block sets none.
    pub default_response: Option<String>,
    /// Overrides `Intents::language` for this call.
    pub language: Option<String>,
}

/// The outcome of a single successful sentence match.
#[derive(Debug, Clone)]
pub struct RecognizeResult {
    pub intent_name: String,
    pub entities: IndexMap<String, MatchEntity>,
    pub entities_list: Vec<MatchEntity>,
    pub unmatched_entities: Vec<UnmatchedEntity>,
    pub response: Option<String>,
}

/// Try to recognize `text` against `intents`, returning the first match
/// found. See [`recognize_all`] for every match, or [`recognize_best`] for
/// the highest-ranked one.
pub fn recognize(text: &str, intents: &Intents, options: &RecognizeOptions) -> Result<Option<RecognizeResult>> {
    Ok(recognize_all(text, intents, options)?.into_iter().next())
}

/// Try to recognize `text` against every sentence of every (matching)
/// intent, returning every successful match.
pub fn recognize_all(
    text: &str,
    intents: &Intents,
    options: &RecognizeOptions,
) -> Result<Vec<RecognizeResult>> {
    let ignore_whitespace = intents.settings.ignore_whitespace;
    let normalized = normalize_text(text);
    let mut skip_words = intents.skip_words.clone();
    skip_words.extend(options.skip_words.iter().cloned());
    let cleaned = remove_skip_words(&normalized, &skip_words, ignore_whitespace);
    let input = if ignore_whitespace {
        cleaned.chars().filter(|c| !c.is_whitespace()).collect::<String>()
    } else {
        format!("{cleaned} ")
    };
    let keywords: HashSet<&str> = cleaned.split_whitespace().collect();

    let mut slot_lists = intents.slot_lists.clone();
    slot_lists.extend(options.slot_lists.clone());
    let mut rule_sequences = rules_as_sequences(&intents.expansion_rules);
    rule_sequences.extend(options.expansion_rules.clone());
    let language = options.language.as_deref().unwrap_or(&intents.language);

    let mut results = Vec::new();
    for (intent_name, intent) in &intents.intents {
        if !options.intents.is_empty() && !options.intents.contains(intent_name) {
            continue;
        }
        for data in &intent.data {
            if !ignore_whitespace
                && !data.required_keywords.is_empty()
                && !data.required_keywords.iter().any(|k| keywords.contains(k.as_str()))
            {
                debug!(intent = intent_name, "skipped: no required keyword present");
                continue;
            }
            if !check_context(&data.requires_context, &options.intent_context, true) {
                debug!(intent = intent_name, "skipped: requires_context not satisfied");
                continue;
            }
            if !check_excludes(&data.excludes_context, &options.intent_context) {
                debug!(intent = intent_name, "skipped: excludes_context violated");
                continue;
            }

            let sentences = match data.sentences() {
                Ok(s) => s,
                Err(e) => {
                    warn!(intent = intent_name, error = %e, "failed to parse sentence templates");
                    continue;
                }
            };

            for sentence in sentences {
                if intents.settings.filter_with_regex && !ignore_whitespace && !options.allow_unmatched_entities {
                    if let Some(regex) = sentence.compile(|name| intents.expansion_rules.get(name)) {
                        if !regex.is_match(&input) {
                            continue;
                        }
                    }
                }

                let settings = MatchSettings {
                    slot_lists: &slot_lists,
                    expansion_rules: &rule_sequences,
                    allow_unmatched_entities: options.allow_unmatched_entities,
                    language,
                    ignore_whitespace,
                };
                let root = crate::expression::Expression::Sequence(sentence.root.clone());
                let contexts = match_expression(&settings, vec![MatchContext::new(input.clone())], &root)?;

                for ctx in contexts {
                    if !ctx.is_match() {
                        continue;
                    }

                    let mut effective_context = options.intent_context.clone();
                    for (k, v) in &ctx.intent_context {
                        effective_context.insert(k.clone(), v.clone());
                    }
                    if !check_context(&data.requires_context, &effective_context, false) {
                        debug!(intent = intent_name, "dropped: requires_context unsatisfied after match");
                        continue;
                    }
                    if !check_excludes(&data.excludes_context, &effective_context) {
                        debug!(intent = intent_name, "dropped: excludes_context violated after match");
                        continue;
                    }

                    let mut entities_list = ctx.entities.clone();
                    for (slot_name, value) in &data.slots {
                        entities_list.push(MatchEntity {
                            name: slot_name.clone(),
                            value: value.clone(),
                            text: String::new(),
                            metadata: IndexMap::new(),
                            is_wildcard: false,
                        });
                    }
                    for (key, expected) in &data.requires_context {
                        if let Some(value) = slot_copy_value(expected) {
                            entities_list.push(MatchEntity {
                                name: key.clone(),
                                value: value.clone(),
                                text: String::new(),
                                metadata: IndexMap::new(),
                                is_wildcard: false,
                            });
                        }
                    }

                    let mut entities = IndexMap::new();
                    for entity in &entities_list {
                        entities.insert(entity.name.clone(), entity.clone());
                    }

                    results.push(RecognizeResult {
                        intent_name: intent_name.clone(),
                        entities,
                        entities_list,
                        unmatched_entities: ctx.unmatched_entities,
                        response: data.response.clone().or_else(|| options.default_response.clone()),
                    });
                }
            }
        }
    }
    Ok(results)
}

/// Metadata key consulted by [`recognize_best`] for a caller-supplied
/// priority ranking, before falling back to the structural tie-breaks.
pub const BEST_SLOT_METADATA_KEY: &str = "priority";

/// Pick the single best match out of [`recognize_all`], using (in order):
/// the `priority` metadata key, if any result's best slot sets it; then the
/// fewest wildcard entities; then the most text chunks matched.
pub fn recognize_best(
    text: &str,
    intents: &Intents,
    options: &RecognizeOptions,
) -> Result<Option<RecognizeResult>> {
    let mut candidates = recognize_all(text, intents, options)?;
    if candidates.is_empty() {
        return Ok(None);
    }
    candidates.sort_by(|a, b| {
        let a_priority = best_priority(a);
        let b_priority = best_priority(b);
        b_priority
            .cmp(&a_priority)
            .then_with(|| wildcard_count(a).cmp(&wildcard_count(b)))
            .then_with(|| chunks_matched(b).cmp(&chunks_matched(a)))
    });
    Ok(candidates.into_iter().next())
}

fn best_priority(result: &RecognizeResult) -> i64 {
    result
        .entities_list
        .iter()
        .filter_map(|e| e.metadata.get(BEST_SLOT_METADATA_KEY))
        .filter_map(JsonValue::as_i64)
        .max()
        .unwrap_or(0)
}

fn wildcard_count(result: &RecognizeResult) -> usize {
    result.entities_list.iter().filter(|e| e.is_wildcard).count()
}

fn chunks_matched(result: &RecognizeResult) -> usize {
    result.entities_list.len()
}

fn check_context(required: &IndexMap<String, JsonValue>, provided: &IndexMap<String, JsonValue>, allow_missing: bool) -> bool {
    for (key, expected) in required {
        match provided.get(key) {
            None => {
                if !allow_missing {
                    return false;
                }
            }
            Some(actual) => {
                if !context_value_matches(expected, actual) {
                    return false;
                }
            }
        }
    }
    true
}

fn check_excludes(excluded: &IndexMap<String, JsonValue>, provided: &IndexMap<String, JsonValue>) -> bool {
    for (key, expected) in excluded {
        if let Some(actual) = provided.get(key) {
            if context_value_matches(expected, actual) {
                return false;
            }
        }
    }
    true
}

/// `null` means "any value is present"; an array means "any of these
/// values"; `{value: ..., slot: true}` copies `value` into the result's
/// entities on a match (see [`slot_copy_value`]); anything else is an exact
/// match.
fn context_value_matches(expected: &JsonValue, actual: &JsonValue) -> bool {
    if let Some(inner) = slot_copy_value(expected) {
        return inner == actual;
    }
    match expected {
        JsonValue::Null => true,
        JsonValue::Array(values) => values.contains(actual),
        other => other == actual,
    }
}

/// If `expected` is the copy-to-slot context shape `{value: ..., slot:
/// true}`, the inner `value` to compare against and surface as an entity.
fn slot_copy_value(expected: &JsonValue) -> Option<&JsonValue> {
    let obj = expected.as_object()?;
    if obj.get("slot").and_then(JsonValue::as_bool) == Some(true) {
        obj.get("value")
    } else {
        None
    }
}

fn rules_as_sequences(rules: &IndexMap<String, crate::expression::Sentence>) -> IndexMap<String, Sequence> {
    rules.iter().map(|(k, v)| (k.clone(), v.root.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intents::Intents;

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
"#;

    #[test]
    fn test_recognize_matches_sentence() {
        let intents = Intents::from_yaml_str(YAML).unwrap();
        let options = RecognizeOptions::default();
        let result = recognize("turn on the kitchen lights", &intents, &options).unwrap();
        assert!(result.is_some());
        let result = result.unwrap();
        assert_eq!(result.intent_name, "HassLightTurnOn");
        assert_eq!(result.entities["area"].value, JsonValue::String("kitchen".into()));
        assert_eq!(result.entities["domain"].value, JsonValue::String("light".into()));
    }

    #[test]
    fn test_recognize_no_match() {
        let intents = Intents::from_yaml_str(YAML).unwrap();
        let options = RecognizeOptions::default();
        let result = recognize("play some music", &intents, &options).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_recognize_best_prefers_fewer_wildcards() {
        let intents = Intents::from_yaml_str(YAML).unwrap();
        let options = RecognizeOptions::default();
        let best = recognize_best("turn on the kitchen lights", &intents, &options).unwrap();
        assert!(best.is_some());
    }

    #[test]
    fn test_recognize_still_matches_with_regex_filter_disabled() {
        let yaml = format!("{YAML}settings:\n  filter_with_regex: false\n");
        let intents = Intents::from_yaml_str(&yaml).unwrap();
        assert!(!intents.settings.filter_with_regex);
        let options = RecognizeOptions::default();
        let result = recognize("turn on the kitchen lights", &intents, &options).unwrap();
        assert!(result.is_some());
    }

    const SLOT_COPY_YAML: &str = r#"
language: en
intents:
  HassTurnOn:
    data:
      - sentences:
          - "turn on the light"
        requires_context:
          domain:
            value: light
            slot: true
"#;

    #[test]
    fn test_requires_context_slot_copy_injects_entity() {
        let intents = Intents::from_yaml_str(SLOT_COPY_YAML).unwrap();
        let mut options = RecognizeOptions::default();
        options.intent_context.insert("domain".into(), JsonValue::String("light".into()));
        let result = recognize("turn on the light", &intents, &options).unwrap().unwrap();
        assert_eq!(result.entities["domain"].value, JsonValue::String("light".into()));
    }

    const REQUIRED_KEYWORDS_YAML: &str = r#"
language: en
intents:
  HassTurnOn:
    data:
      - sentences:
          - "turn it on"
        required_keywords:
          - light
"#;

    #[test]
    fn test_required_keywords_prunes_utterance_missing_keyword() {
        let intents = Intents::from_yaml_str(REQUIRED_KEYWORDS_YAML).unwrap();
        let options = RecognizeOptions::default();
        assert!(recognize("turn it on", &intents, &options).unwrap().is_none());
    }

    #[test]
    fn test_response_falls_back_to_default() {
        let intents = Intents::from_yaml_str(YAML).unwrap();
        let options = RecognizeOptions {
            default_response: Some("done".into()),
            ..Default::default()
        };
        let result = recognize("turn on the kitchen lights", &intents, &options).unwrap().unwrap();
        assert_eq!(result.response.as_deref(), Some("done"));
    }
}
