//! Sampler: enumerates concrete sentences from a parsed template, the
//! inverse of the matcher.

use indexmap::IndexMap;
use itertools::Itertools;

use crate::error::{Error, Result};
use crate::expression::{Expression, Sequence, SequenceType};
use crate::slots::SlotList;

/// Enumerate every concrete string a `Sequence` can expand to.
///
/// This is a lazy sequence in spirit but materialized here for simplicity;
/// callers working with large slot lists should bound consumption (e.g.
/// `.take(n)`) rather than collecting unboundedly.
pub fn sample_sequence<'a>(
    seq: &'a Sequence,
    slot_lists: &'a IndexMap<String, SlotList>,
    expansion_rules: &'a IndexMap<String, Sequence>,
) -> Result<Box<dyn Iterator<Item = String> + 'a>> {
    match seq.kind {
        SequenceType::Group => {
            let mut parts: Vec<Box<dyn Iterator<Item = String> + 'a>> = Vec::new();
            for item in &seq.items {
                parts.push(sample_expr(item, slot_lists, expansion_rules)?);
            }
            // Cartesian product across the sequence's items.
            let materialized: Vec<Vec<String>> = parts.into_iter().map(Iterator::collect).collect();
            let product = materialized
                .into_iter()
                .multi_cartesian_product()
                .map(|parts| parts.concat());
            Ok(Box::new(product))
        }
        SequenceType::Alternative | SequenceType::Permutation => {
            let mut all = Vec::new();
            for item in &seq.items {
                all.extend(sample_expr(item, slot_lists, expansion_rules)?.collect::<Vec<_>>());
            }
            Ok(Box::new(all.into_iter()))
        }
    }
}

fn sample_expr<'a>(
    expr: &'a Expression,
    slot_lists: &'a IndexMap<String, SlotList>,
    expansion_rules: &'a IndexMap<String, Sequence>,
) -> Result<Box<dyn Iterator<Item = String> + 'a>> {
    match expr {
        Expression::Text(chunk) => Ok(Box::new(std::iter::once(chunk.text.clone()))),
        Expression::Sequence(seq) | Expression::Alternative(seq) | Expression::Permutation(seq) => {
            sample_sequence(seq, slot_lists, expansion_rules)
        }
        Expression::ListRef(list_ref) => {
            let list = slot_lists
                .get(&list_ref.list_name)
                .ok_or_else(|| Error::MissingList {
                    name: list_ref.list_name.clone(),
                })?;
            Ok(match list {
                SlotList::Text(text_list) => {
                    Box::new(text_list.values.iter().map(|v| v.text_in.clone()).collect::<Vec<_>>().into_iter())
                }
                SlotList::Range(range) => {
                    let multiplier = range.multiplier;
                    let fractions: &[f64] = match range.fraction_type {
                        crate::slots::FractionType::None => &[0.0],
                        crate::slots::FractionType::Halves => &[0.0, 0.5],
                        crate::slots::FractionType::Tenths => {
                            &[0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9]
                        }
                    };
                    Box::new(range.values().flat_map(move |n| {
                        fractions.iter().map(move |frac| {
                            let scaled = (n as f64 + frac) * multiplier;
                            if (scaled.fract()).abs() < f64::EPSILON {
                                format!("{}", scaled as i64)
                            } else {
                                format!("{scaled}")
                            }
                        })
                    }))
                }
                SlotList::Wildcard(_) => Box::new(std::iter::once("<anything>".to_string())),
            })
        }
        Expression::RuleRef(name) => {
            let rule = expansion_rules
                .get(name)
                .ok_or_else(|| Error::MissingRule { name: name.clone() })?;
            sample_sequence(rule, slot_lists, expansion_rules)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_sentence;

    #[test]
    fn test_sample_plain_text() {
        let sentence = parse_sentence("turn on the light").unwrap();
        let lists = IndexMap::new();
        let rules = IndexMap::new();
        let samples: Vec<_> = sample_sequence(&sentence.root, &lists, &rules).unwrap().collect();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_sample_alternative() {
        let sentence = parse_sentence("turn (on|off)").unwrap();
        let lists = IndexMap::new();
        let rules = IndexMap::new();
        let samples: Vec<_> = sample_sequence(&sentence.root, &lists, &rules).unwrap().collect();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_sample_optional_yields_both_branches() {
        let sentence = parse_sentence("turn on [the] light").unwrap();
        let lists = IndexMap::new();
        let rules = IndexMap::new();
        let samples: Vec<_> = sample_sequence(&sentence.root, &lists, &rules).unwrap().collect();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_sample_missing_list_errors() {
        let sentence = parse_sentence("set {brightness}").unwrap();
        let lists = IndexMap::new();
        let rules = IndexMap::new();
        assert!(sample_sequence(&sentence.root, &lists, &rules).is_err());
    }
}
