//! Non-deterministic matcher: walks an [`Expression`] tree against input
//! text, producing every valid [`MatchContext`].
//!
//! Rather than a lazy generator (as the reference implementation uses),
//! each combinator materializes its successor contexts into a `Vec` and
//! hands them to the next stage — simple, and fine for the sentence sizes
//! this system deals with.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::expression::{Expression, Sequence, SequenceType};
use crate::normalize::PUNCTUATION_ALL;
use crate::numbers::range_trie;
use crate::slots::SlotList;

/// A named entity successfully pulled out of the input text.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchEntity {
    pub name: String,
    pub value: JsonValue,
    pub text: String,
    pub metadata: IndexMap<String, JsonValue>,
    pub is_wildcard: bool,
}

impl MatchEntity {
    /// The matched text with surrounding whitespace and punctuation
    /// stripped.
    pub fn text_clean(&self) -> String {
        self.text
            .trim()
            .chars()
            .filter(|c| !PUNCTUATION_ALL.contains(c))
            .collect()
    }
}

/// An entity that the template expected to match but couldn't, when
/// `allow_unmatched_entities` is set. Lets callers distinguish "no match at
/// all" from "matched the shape, but this slot had an unrecognized value."
#[derive(Debug, Clone, PartialEq)]
pub enum UnmatchedEntity {
    Text { name: String, text: String },
    Range { name: String, value: i64 },
}

/// Settings threaded through every call to [`match_expression`].
pub struct MatchSettings<'a> {
    pub slot_lists: &'a IndexMap<String, SlotList>,
    pub expansion_rules: &'a IndexMap<String, Sequence>,
    pub allow_unmatched_entities: bool,
    pub language: &'a str,
    /// Treat whitespace as insignificant rather than a word boundary: every
    /// comparison strips whitespace from both sides instead of anchoring on
    /// it. Intended for non-whitespace-delimited languages.
    pub ignore_whitespace: bool,
}

/// The threaded state of an in-progress match attempt.
#[derive(Debug, Clone)]
pub struct MatchContext {
    pub text: String,
    pub entities: Vec<MatchEntity>,
    pub unmatched_entities: Vec<UnmatchedEntity>,
    pub intent_context: IndexMap<String, JsonValue>,
    pub text_chunks_matched: usize,
}

impl MatchContext {
    pub fn new(text: impl Into<String>) -> Self {
        MatchContext {
            text: text.into(),
            entities: Vec::new(),
            unmatched_entities: Vec::new(),
            intent_context: IndexMap::new(),
            text_chunks_matched: 0,
        }
    }

    /// Whether this context represents a complete, successful match: no
    /// meaningful text remains, and nothing is left dangling unmatched.
    pub fn is_match(&self) -> bool {
        let remaining: String = self
            .text
            .chars()
            .filter(|c| !c.is_whitespace() && !PUNCTUATION_ALL.contains(c))
            .collect();
        remaining.is_empty()
    }
}

/// Run `expr` against every context in `contexts`, returning every resulting
/// successor context across all of them.
pub fn match_expression(
    settings: &MatchSettings,
    contexts: Vec<MatchContext>,
    expr: &Expression,
) -> Result<Vec<MatchContext>> {
    let mut out = Vec::new();
    for ctx in contexts {
        out.extend(match_one(settings, ctx, expr)?);
    }
    Ok(out)
}

fn match_one(settings: &MatchSettings, ctx: MatchContext, expr: &Expression) -> Result<Vec<MatchContext>> {
    match expr {
        Expression::Text(chunk) => Ok(match_text(ctx, &chunk.text, settings.ignore_whitespace)),
        Expression::Sequence(seq) => match_sequence(settings, ctx, seq),
        Expression::Alternative(seq) => match_alternative(settings, ctx, seq),
        Expression::Permutation(seq) => match_permutation(settings, ctx, seq),
        Expression::ListRef(list_ref) => match_list_ref(settings, ctx, list_ref),
        Expression::RuleRef(name) => {
            let rule = settings
                .expansion_rules
                .get(name)
                .ok_or_else(|| Error::MissingRule { name: name.clone() })?;
            match_sequence(settings, ctx, rule)
        }
    }
}

/// Characters stripped from both sides of a comparison when
/// `ignore_whitespace` is set.
fn strip_ws(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The text remaining to match, word-boundary-aware unless
/// `ignore_whitespace`, in which case whitespace carries no meaning at all
/// and is stripped wholesale instead of just trimmed from the front.
fn remaining_text(ctx: &MatchContext, ignore_whitespace: bool) -> Cow<'_, str> {
    if ignore_whitespace {
        Cow::Owned(strip_ws(&ctx.text))
    } else {
        Cow::Borrowed(ctx.text.trim_start())
    }
}

/// Whether `rest` (the text left over after consuming a match) sits at a
/// word boundary. Always true under `ignore_whitespace`, since there are no
/// word boundaries to violate.
fn ends_at_word_boundary(rest: &str, ignore_whitespace: bool) -> bool {
    ignore_whitespace || rest.is_empty() || rest.starts_with(char::is_whitespace)
}

fn match_text(mut ctx: MatchContext, expected: &str, ignore_whitespace: bool) -> Vec<MatchContext> {
    if expected.is_empty() {
        return vec![ctx];
    }
    if ignore_whitespace {
        // Remove all whitespace from both sides before comparing; a bare
        // separating space strips to nothing and matches unconditionally.
        let expected = strip_ws(expected);
        if expected.is_empty() {
            return vec![ctx];
        }
        let remaining = strip_ws(&ctx.text);
        return if let Some(rest) = remaining.strip_prefix(expected.as_str()) {
            ctx.text = rest.to_string();
            ctx.text_chunks_matched += 1;
            vec![ctx]
        } else {
            Vec::new()
        };
    }
    let remaining = ctx.text.trim_start();
    if let Some(rest) = remaining.strip_prefix(expected) {
        ctx.text = rest.to_string();
        ctx.text_chunks_matched += 1;
        vec![ctx]
    } else if expected == " " {
        // A bare separating space matches any amount of whitespace,
        // including none at a word boundary already consumed upstream.
        vec![ctx]
    } else {
        Vec::new()
    }
}

fn match_sequence(settings: &MatchSettings, ctx: MatchContext, seq: &Sequence) -> Result<Vec<MatchContext>> {
    match seq.kind {
        SequenceType::Group => {
            let mut frontier = vec![ctx];
            for item in &seq.items {
                if frontier.is_empty() {
                    break;
                }
                frontier = match_expression(settings, frontier, item)?;
            }
            Ok(frontier)
        }
        SequenceType::Alternative => match_alternative(settings, ctx, seq),
        SequenceType::Permutation => match_permutation(settings, ctx, seq),
    }
}

fn match_alternative(settings: &MatchSettings, ctx: MatchContext, seq: &Sequence) -> Result<Vec<MatchContext>> {
    let mut out = Vec::new();
    for item in &seq.items {
        out.extend(match_one(settings, ctx.clone(), item)?);
    }
    Ok(out)
}

fn match_permutation(settings: &MatchSettings, ctx: MatchContext, seq: &Sequence) -> Result<Vec<MatchContext>> {
    // Each item of a permutation sequence is itself one concrete ordering
    // (the parser expands `a;b` into the orderings `a b` / `b a`); matching
    // a permutation is just matching any of those orderings.
    let mut out = Vec::new();
    for ordering in &seq.items {
        out.extend(match_one(settings, ctx.clone(), ordering)?);
    }
    Ok(out)
}

fn match_list_ref(
    settings: &MatchSettings,
    ctx: MatchContext,
    list_ref: &crate::expression::ListReference,
) -> Result<Vec<MatchContext>> {
    let list = settings
        .slot_lists
        .get(&list_ref.list_name)
        .ok_or_else(|| Error::MissingList {
            name: list_ref.list_name.clone(),
        })?;

    let slot_name = list_ref.slot_name().to_string();
    let mut out = match list {
        SlotList::Text(text_list) => match_text_list(settings, ctx, text_list, &slot_name)?,
        SlotList::Range(range) => match_range(settings, ctx, range, &slot_name)?,
        SlotList::Wildcard(_) => match_wildcard(ctx, &slot_name, settings.ignore_whitespace),
    };
    if list_ref.is_end_of_word {
        out.retain(|c| ends_at_word_boundary(&c.text, settings.ignore_whitespace));
    }
    Ok(out)
}

fn match_text_list(
    settings: &MatchSettings,
    ctx: MatchContext,
    text_list: &crate::slots::TextSlotList,
    slot_name: &str,
) -> Result<Vec<MatchContext>> {
    let mut out = Vec::new();
    for value in &text_list.values {
        let matched = if let Some(template) = &value.template {
            match_sequence(settings, ctx.clone(), &template.root)?
        } else {
            let remaining = remaining_text(&ctx, settings.ignore_whitespace);
            let key = if settings.ignore_whitespace {
                Cow::Owned(strip_ws(&value.text_in))
            } else {
                Cow::Borrowed(value.text_in.as_str())
            };
            match remaining.strip_prefix(key.as_ref()) {
                Some(rest) => {
                    let mut next = ctx.clone();
                    next.text = rest.to_string();
                    next.text_chunks_matched += 1;
                    vec![next]
                }
                None => Vec::new(),
            }
        };
        for mut next in matched {
            for (k, v) in &value.context {
                next.intent_context.insert(k.clone(), v.clone());
            }
            next.entities.push(MatchEntity {
                name: slot_name.to_string(),
                value: value.value_out.clone(),
                text: value.text_in.clone(),
                metadata: value.metadata.clone(),
                is_wildcard: false,
            });
            out.push(next);
        }
    }
    if out.is_empty() && settings.allow_unmatched_entities {
        let remaining = remaining_text(&ctx, settings.ignore_whitespace);
        let word = remaining.split_whitespace().next().unwrap_or("").to_string();
        let mut next = ctx.clone();
        next.unmatched_entities.push(UnmatchedEntity::Text {
            name: slot_name.to_string(),
            text: word,
        });
        out.push(next);
    }
    Ok(out)
}

fn match_range(
    settings: &MatchSettings,
    ctx: MatchContext,
    range: &crate::slots::RangeSlotList,
    slot_name: &str,
) -> Result<Vec<MatchContext>> {
    let remaining = remaining_text(&ctx, settings.ignore_whitespace);
    let remaining: &str = &remaining;
    let mut out = Vec::new();

    // Digit path: a leading run of ASCII digits.
    let digit_len = remaining.chars().take_while(char::is_ascii_digit).count();
    if digit_len > 0 {
        let (digits, rest) = remaining.split_at(digit_len);
        if let Ok(n) = digits.parse::<i64>() {
            if range.contains(n) {
                let mut next = ctx.clone();
                next.text = rest.to_string();
                next.text_chunks_matched += 1;
                let scaled = n as f64 * range.multiplier;
                next.entities.push(MatchEntity {
                    name: slot_name.to_string(),
                    value: JsonValue::from(scaled),
                    text: digits.to_string(),
                    metadata: IndexMap::new(),
                    is_wildcard: false,
                });
                out.push(next);
            } else if settings.allow_unmatched_entities {
                let mut next = ctx.clone();
                next.text = rest.to_string();
                next.unmatched_entities.push(UnmatchedEntity::Range {
                    name: slot_name.to_string(),
                    value: n,
                });
                out.push(next);
            }
        }
    }

    // Word path: spelled-out number words, via the cached trie.
    if range.words {
        let trie = range_trie(range.words_language.as_str(), range.start, range.stop, range.step);
        for hit in trie.find(remaining, true) {
            let mut next = ctx.clone();
            next.text = remaining[hit.end..].to_string();
            next.text_chunks_matched += 1;
            let scaled = *hit.value as f64 * range.multiplier;
            next.entities.push(MatchEntity {
                name: slot_name.to_string(),
                value: JsonValue::from(scaled),
                text: hit.text.clone(),
                metadata: IndexMap::new(),
                is_wildcard: false,
            });
            out.push(next);
        }
    }

    // `range.type` only affects how the sampler renders a value, not matching.
    Ok(out)
}

/// Byte spans of each whitespace-delimited word in `text`.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

/// Byte spans of each leading 1..=N character prefix of `text`, used in
/// place of [`word_spans`] when whitespace carries no boundary meaning.
fn char_spans(text: &str) -> Vec<(usize, usize)> {
    text.char_indices().map(|(i, c)| (0, i + c.len_utf8())).collect()
}

fn match_wildcard(ctx: MatchContext, slot_name: &str, ignore_whitespace: bool) -> Vec<MatchContext> {
    // Absorb a run of whitespace-delimited words as an open wildcard. Every
    // possible split point is offered, longest-first, so a following
    // literal in the same sequence still has a chance to match the
    // remainder, mirroring the reference implementation's "open" wildcard
    // that keeps extending into subsequent text chunks.
    let remaining_owned = remaining_text(&ctx, ignore_whitespace);
    let remaining: &str = &remaining_owned;
    let spans = if ignore_whitespace {
        char_spans(remaining)
    } else {
        word_spans(remaining)
    };
    if spans.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(spans.len());
    for take in (1..=spans.len()).rev() {
        let (start, end) = spans[take - 1];
        let matched_text = &remaining[spans[0].0..end];
        let mut next = ctx.clone();
        next.text = remaining[end..].to_string();
        next.text_chunks_matched += 1;
        next.entities.push(MatchEntity {
            name: slot_name.to_string(),
            value: JsonValue::String(matched_text.to_string()),
            text: matched_text.to_string(),
            metadata: IndexMap::new(),
            is_wildcard: true,
        });
        out.push(next);
        let _ = start;
    }
    out
}
