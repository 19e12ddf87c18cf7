//! End-to-end scenarios exercising the full recognize pipeline against a
//! realistic intents document.

use intently_core::{recognize, recognize_all, recognize_best, Intents, RecognizeOptions};
use rstest::rstest;

const INTENTS_YAML: &str = r#"
language: en
intents:
  HassLightTurnOn:
    data:
      - sentences:
          - "turn on [the] {area} light[s]"
          - "(turn on|switch on) [the] light[s] in [the] {area}"
        slots:
          domain: light
  HassSetBrightness:
    data:
      - sentences:
          - "set [the] {area} brightness to {brightness}[%| percent]"
        slots:
          domain: light
  HassGetTemperature:
    data:
      - sentences:
          - "what[']s [the] temperature in [the] {area}"
        requires_context:
          area_supports_temperature: true
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
skip_words:
  - please
"#;

#[rstest]
#[case::plain("turn on the kitchen lights", "HassLightTurnOn")]
#[case::alt_phrasing("switch on the light in the living room", "HassLightTurnOn")]
#[case::skip_word("please turn on the kitchen lights", "HassLightTurnOn")]
fn test_recognize_matches_expected_intent(#[case] text: &str, #[case] expected_intent: &str) {
    let intents = Intents::from_yaml_str(INTENTS_YAML).unwrap();
    let options = RecognizeOptions::default();
    let result = recognize(text, &intents, &options).unwrap().expect("should match");
    assert_eq!(result.intent_name, expected_intent);
}

#[test]
fn test_recognize_extracts_digit_brightness() {
    let intents = Intents::from_yaml_str(INTENTS_YAML).unwrap();
    let options = RecognizeOptions::default();
    let result = recognize("set the kitchen brightness to 75%", &intents, &options)
        .unwrap()
        .expect("should match");
    assert_eq!(result.intent_name, "HassSetBrightness");
    assert_eq!(result.entities["area"].text_clean(), "kitchen");
}

#[test]
fn test_recognize_extracts_word_brightness() {
    let intents = Intents::from_yaml_str(INTENTS_YAML).unwrap();
    let options = RecognizeOptions::default();
    let result = recognize(
        "set the living room brightness to twenty percent",
        &intents,
        &options,
    )
    .unwrap()
    .expect("should match");
    assert_eq!(result.intent_name, "HassSetBrightness");
}

#[test]
fn test_requires_context_blocks_match_without_context() {
    let intents = Intents::from_yaml_str(INTENTS_YAML).unwrap();
    let options = RecognizeOptions::default();
    let result = recognize("what's the temperature in the kitchen", &intents, &options).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_requires_context_allows_match_with_context() {
    let intents = Intents::from_yaml_str(INTENTS_YAML).unwrap();
    let mut options = RecognizeOptions::default();
    options
        .intent_context
        .insert("area_supports_temperature".to_string(), true.into());
    let result = recognize("what's the temperature in the kitchen", &intents, &options).unwrap();
    assert!(result.is_some());
}

#[test]
fn test_recognize_all_returns_every_match() {
    let intents = Intents::from_yaml_str(INTENTS_YAML).unwrap();
    let options = RecognizeOptions::default();
    let results = recognize_all("turn on the kitchen lights", &intents, &options).unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.intent_name == "HassLightTurnOn"));
}

#[test]
fn test_recognize_best_is_deterministic() {
    let intents = Intents::from_yaml_str(INTENTS_YAML).unwrap();
    let options = RecognizeOptions::default();
    let best = recognize_best("turn on the kitchen lights", &intents, &options).unwrap();
    assert!(best.is_some());
}

#[test]
fn test_unrelated_text_does_not_match() {
    let intents = Intents::from_yaml_str(INTENTS_YAML).unwrap();
    let options = RecognizeOptions::default();
    let result = recognize("play my favorite song", &intents, &options).unwrap();
    assert!(result.is_none());
}
