//! Template expression tree and the regex pre-filter compiled from it.
//!
//! `Sentence` is the root of a parsed template: a `Sequence` of `Expression`
//! nodes built by [`crate::parser::parse_sentence`]. `Sentence::compile`
//! produces an optional `Regex` that can cheaply reject input text before
//! the full non-deterministic matcher runs on it.

use std::sync::OnceLock;

use regex::{escape, Regex};

/// A single node of a parsed template expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal text, possibly with leading/trailing word-boundary info
    /// tracked separately by the parser.
    Text(TextChunk),
    /// An ordered sequence: `(a b c)` or the top-level sentence body.
    Sequence(Sequence),
    /// A set of alternatives: `(a|b|c)`. An optional `[a]` is represented as
    /// an alternative between `a` and an empty chunk.
    Alternative(Sequence),
    /// A set of word-order permutations: `(a;b;c)`.
    Permutation(Sequence),
    /// `{list_name}` or `{list_name:slot_name}`.
    ListRef(ListReference),
    /// `<rule_name>`.
    RuleRef(String),
}

/// A chunk of literal text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextChunk {
    pub text: String,
}

impl TextChunk {
    pub fn new(text: impl Into<String>) -> Self {
        TextChunk { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn empty() -> Self {
        TextChunk::default()
    }
}

/// How the items of a `Sequence` combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceType {
    Group,
    Alternative,
    Permutation,
}

/// An ordered collection of child expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub items: Vec<Expression>,
    pub kind: SequenceType,
    /// True when this alternative came from `[optional]` syntax (one of the
    /// branches is implicitly empty).
    pub is_optional: bool,
}

impl Sequence {
    pub fn new(kind: SequenceType, items: Vec<Expression>) -> Self {
        Sequence {
            items,
            kind,
            is_optional: false,
        }
    }

    /// Names of every `{list}` referenced anywhere under this sequence.
    pub fn list_names(&self) -> Vec<&str> {
        fn walk<'a>(expr: &'a Expression, out: &mut Vec<&'a str>) {
            match expr {
                Expression::ListRef(list_ref) => out.push(&list_ref.list_name),
                Expression::Sequence(seq)
                | Expression::Alternative(seq)
                | Expression::Permutation(seq) => {
                    for item in &seq.items {
                        walk(item, out);
                    }
                }
                Expression::Text(_) | Expression::RuleRef(_) => {}
            }
        }
        let mut out = Vec::new();
        for item in &self.items {
            walk(item, &mut out);
        }
        out
    }
}

/// A `{list_name}` or `{list_name:slot_name}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListReference {
    pub list_name: String,
    pub slot_name: Option<String>,
    /// Whether the character immediately following this reference's closing
    /// `}` is whitespace or end-of-input. The matcher uses this to reject
    /// candidates that would otherwise split a value out of the middle of a
    /// word (e.g. `{area}s` shouldn't let `area` match "kitchen" inside
    /// "kitchens").
    pub is_end_of_word: bool,
}

impl ListReference {
    pub fn new(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((list_name, slot_name)) => ListReference {
                list_name: list_name.to_string(),
                slot_name: Some(slot_name.to_string()),
                is_end_of_word: true,
            },
            None => ListReference {
                list_name: raw.to_string(),
                slot_name: None,
                is_end_of_word: true,
            },
        }
    }

    /// Effective slot name: the explicit `:slot_name` override, or the list
    /// name itself.
    pub fn slot_name(&self) -> &str {
        self.slot_name.as_deref().unwrap_or(&self.list_name)
    }
}

/// A fully parsed sentence template: a top-level `Sequence` plus the
/// original source text (kept for error messages and sampler provenance)
/// and a lazily compiled regex pre-filter.
#[derive(Debug)]
pub struct Sentence {
    pub text: String,
    pub root: Sequence,
    regex: OnceLock<Option<Regex>>,
}

impl Clone for Sentence {
    fn clone(&self) -> Self {
        // Deliberately don't carry over the cached regex: a clone gets its
        // own `OnceLock` and recompiles lazily on first use.
        Sentence::new(self.text.clone(), self.root.clone())
    }
}

impl PartialEq for Sentence {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.root == other.root
    }
}

impl Sentence {
    pub fn new(text: impl Into<String>, root: Sequence) -> Self {
        Sentence {
            text: text.into(),
            root,
            regex: OnceLock::new(),
        }
    }

    /// Compile (and cache) the regex pre-filter for this sentence, resolving
    /// `<rule>` references against `rules`. Returns `None` if no useful
    /// regex can be built (e.g. a list reference sits inside an alternative,
    /// which disables the pre-filter per the reference semantics, or a
    /// referenced rule is missing).
    pub fn compile<'r>(&self, rules: impl Fn(&str) -> Option<&'r Sentence> + Copy) -> Option<&Regex> {
        self.regex
            .get_or_init(|| {
                let mut disabled = false;
                let mut pattern = String::from("^");
                compile_sequence(&self.root, false, rules, &mut pattern, &mut disabled);
                if disabled {
                    return None;
                }
                pattern.push('$');
                Regex::new(&pattern).ok()
            })
            .as_ref()
    }
}

fn compile_sequence<'r>(
    seq: &Sequence,
    in_alternative: bool,
    rules: impl Fn(&str) -> Option<&'r Sentence> + Copy,
    out: &mut String,
    disabled: &mut bool,
) {
    match seq.kind {
        SequenceType::Group => {
            for item in &seq.items {
                compile_expr(item, in_alternative, rules, out, disabled);
            }
        }
        // A permutation's items are the full N! orderings (see
        // `parser::permutation_orderings`); exactly one of them needs to
        // match, same as an alternative's branches.
        SequenceType::Alternative | SequenceType::Permutation => {
            out.push_str("(?:");
            for (i, item) in seq.items.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                compile_expr(item, true, rules, out, disabled);
            }
            out.push(')');
        }
    }
}

fn compile_expr<'r>(
    expr: &Expression,
    in_alternative: bool,
    rules: impl Fn(&str) -> Option<&'r Sentence> + Copy,
    out: &mut String,
    disabled: &mut bool,
) {
    match expr {
        Expression::Text(chunk) => out.push_str(&escape(&chunk.text)),
        Expression::Sequence(seq) => compile_sequence(seq, in_alternative, rules, out, disabled),
        Expression::Alternative(seq) => compile_sequence(seq, in_alternative, rules, out, disabled),
        Expression::Permutation(seq) => compile_sequence(seq, in_alternative, rules, out, disabled),
        Expression::ListRef(_) => {
            if in_alternative {
                *disabled = true;
            } else {
                out.push_str("(.+?)");
            }
        }
        Expression::RuleRef(name) => match rules(name) {
            Some(sentence) => compile_sequence(&sentence.root, in_alternative, rules, out, disabled),
            None => *disabled = true,
        },
    }
}
