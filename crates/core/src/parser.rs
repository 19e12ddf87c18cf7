//! Recursive-descent parser turning template text into an [`Expression`]
//! tree. Handles `(group)`, `[optional]`, `{list}`/`{list:slot}`,
//! `<rule>`, `|` alternatives, `;` permutations, and `\`-escapes.

use crate::error::{Error, Result};
use crate::expression::{Expression, ListReference, Sequence, SequenceType, Sentence, TextChunk};
use crate::normalize::normalize_text;

const ESCAPE: char = '\\';
const ALT_SEP: char = '|';
const PERM_SEP: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    Group,    // ( )
    Optional, // [ ]
    List,     // { }
    Rule,     // < >
}

impl Delim {
    fn open(self) -> char {
        match self {
            Delim::Group => '(',
            Delim::Optional => '[',
            Delim::List => '{',
            Delim::Rule => '<',
        }
    }

    fn close(self) -> char {
        match self {
            Delim::Group => ')',
            Delim::Optional => ']',
            Delim::List => '}',
            Delim::Rule => '>',
        }
    }

    fn of_open(c: char) -> Option<Self> {
        match c {
            '(' => Some(Delim::Group),
            '[' => Some(Delim::Optional),
            '{' => Some(Delim::List),
            '<' => Some(Delim::Rule),
            _ => None,
        }
    }
}

/// A cursor over the source text, tracking byte position.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }
}

/// Remove backslash-escapes, leaving the escaped character literal.
fn remove_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Find the matching close delimiter for a delimiter opened at the cursor's
/// current position (which must be sitting on the open character).
/// Escape-aware; does not count nested delimiters of a *different* kind.
fn find_end_delimiter(cursor: &mut Cursor, delim: Delim) -> Result<String> {
    let open = delim.open();
    let close = delim.close();
    assert_eq!(cursor.peek(), Some(open));
    cursor.advance();

    let start = cursor.pos;
    let mut depth = 1usize;
    loop {
        match cursor.peek() {
            None => {
                return Err(Error::parse(
                    cursor.src,
                    format!("unterminated `{open}` starting at byte {start}"),
                ));
            }
            Some(c) if c == ESCAPE => {
                cursor.advance();
                cursor.advance();
            }
            Some(c) if c == open => {
                depth += 1;
                cursor.advance();
            }
            Some(c) if c == close => {
                depth -= 1;
                if depth == 0 {
                    let inner = &cursor.src[start..cursor.pos];
                    cursor.advance();
                    return Ok(inner.to_string());
                }
                cursor.advance();
            }
            Some(_) => {
                cursor.advance();
            }
        }
    }
}

/// Scan a bare word: everything up to the next separator/delimiter/`|`/`;`.
/// Returns the raw (still-escaped) word text and whether a space followed it
/// (i.e. it ended a "word" rather than running into a delimiter boundary).
fn find_end_word(cursor: &mut Cursor) -> (String, bool) {
    let start = cursor.pos;
    let mut trailing_space = false;
    loop {
        match cursor.peek() {
            None => break,
            Some(c) if c == ESCAPE => {
                cursor.advance();
                cursor.advance();
            }
            Some(c) if c.is_whitespace() => {
                trailing_space = true;
                break;
            }
            Some(c) if c == ALT_SEP || c == PERM_SEP => break,
            Some(c) if Delim::of_open(c).is_some() => break,
            Some(')' | ']' | '}' | '>') => break,
            Some(_) => {
                cursor.advance();
            }
        }
    }
    (cursor.src[start..cursor.pos].to_string(), trailing_space)
}

fn skip_whitespace(cursor: &mut Cursor) {
    while matches!(cursor.peek(), Some(c) if c.is_whitespace()) {
        cursor.advance();
    }
}

/// Parse the body of a `(...)`/`[...]` group (delimiters already stripped)
/// into a `Sequence`, splitting on `|` (alternative) and `;` (permutation).
fn parse_group_body(body: &str) -> Result<Sequence> {
    let mut alt_branches: Vec<Vec<Expression>> = vec![Vec::new()];
    let mut segments: Vec<Vec<Vec<Expression>>> = Vec::new();

    let mut cursor = Cursor::new(body);
    loop {
        skip_whitespace(&mut cursor);
        if cursor.eof() {
            break;
        }
        match cursor.peek() {
            Some(ALT_SEP) => {
                cursor.advance();
                alt_branches.push(Vec::new());
                continue;
            }
            Some(PERM_SEP) => {
                cursor.advance();
                segments.push(std::mem::replace(&mut alt_branches, vec![Vec::new()]));
                continue;
            }
            _ => {}
        }
        let expr = parse_one(&mut cursor)?;
        alt_branches.last_mut().unwrap().push(expr);
        // preserve a single space between words within a branch
        if matches!(cursor.peek(), Some(c) if c.is_whitespace()) {
            skip_whitespace(&mut cursor);
            if !cursor.eof() && !matches!(cursor.peek(), Some(ALT_SEP | PERM_SEP)) {
                alt_branches
                    .last_mut()
                    .unwrap()
                    .push(Expression::Text(TextChunk::new(" ")));
            }
        }
    }

    if !segments.is_empty() {
        segments.push(alt_branches);
        let segment_exprs: Vec<Expression> = segments
            .into_iter()
            .map(|branches| {
                if branches.len() > 1 {
                    Expression::Alternative(Sequence::new(
                        SequenceType::Alternative,
                        branches.into_iter().map(wrap_branch).collect(),
                    ))
                } else {
                    wrap_branch(branches.into_iter().next().unwrap())
                }
            })
            .collect();
        let orderings = permutation_orderings(segment_exprs);
        return Ok(Sequence::new(SequenceType::Permutation, orderings));
    }

    if alt_branches.len() > 1 {
        let items = alt_branches.into_iter().map(wrap_branch).collect();
        return Ok(Sequence::new(SequenceType::Alternative, items));
    }

    Ok(Sequence::new(SequenceType::Group, alt_branches.remove(0)))
}

/// Every ordering of `segments`, each joined by a single mandatory space and
/// wrapped as a `Group` sequence: `(a;b;c)` yields the 6 orderings of `a`,
/// `b`, `c` with spaces between, so matching/sampling a permutation reduces
/// to matching/sampling any one of its (already concatenated) orderings.
fn permutation_orderings(segments: Vec<Expression>) -> Vec<Expression> {
    fn permute(remaining: &mut Vec<Expression>, acc: &mut Vec<Expression>, out: &mut Vec<Vec<Expression>>) {
        if remaining.is_empty() {
            out.push(acc.clone());
            return;
        }
        for i in 0..remaining.len() {
            let item = remaining.remove(i);
            acc.push(item.clone());
            permute(remaining, acc, out);
            acc.pop();
            remaining.insert(i, item);
        }
    }

    let mut orderings = Vec::new();
    permute(&mut segments.clone(), &mut Vec::new(), &mut orderings);

    orderings
        .into_iter()
        .map(|ordering| {
            let mut items = Vec::with_capacity(ordering.len() * 2);
            for (i, expr) in ordering.into_iter().enumerate() {
                if i > 0 {
                    items.push(Expression::Text(TextChunk::new(" ")));
                }
                items.push(expr);
            }
            Expression::Sequence(Sequence::new(SequenceType::Group, items))
        })
        .collect()
}

/// Flatten a single branch's items into one `Expression`, wrapping in a
/// `Sequence` only when there's more than one item.
fn wrap_branch(items: Vec<Expression>) -> Expression {
    if items.len() == 1 {
        items.into_iter().next().unwrap()
    } else {
        Expression::Sequence(Sequence::new(SequenceType::Group, items))
    }
}

fn parse_one(cursor: &mut Cursor) -> Result<Expression> {
    match cursor.peek() {
        Some('(') => {
            let body = find_end_delimiter(cursor, Delim::Group)?;
            Ok(Expression::Sequence(parse_group_body(&body)?))
        }
        Some('[') => {
            let body = find_end_delimiter(cursor, Delim::Optional)?;
            let inner = parse_group_body(&body)?;
            let mut items = vec![wrap_branch(inner.items)];
            items.push(Expression::Text(TextChunk::empty()));
            let mut seq = Sequence::new(SequenceType::Alternative, items);
            seq.is_optional = true;
            Ok(Expression::Alternative(seq))
        }
        Some('{') => {
            let body = find_end_delimiter(cursor, Delim::List)?;
            let mut list_ref = ListReference::new(body.trim());
            list_ref.is_end_of_word = matches!(cursor.peek(), None) || matches!(cursor.peek(), Some(c) if c.is_whitespace());
            Ok(Expression::ListRef(list_ref))
        }
        Some('<') => {
            let body = find_end_delimiter(cursor, Delim::Rule)?;
            Ok(Expression::RuleRef(body.trim().to_string()))
        }
        Some(_) => {
            let (word, _) = find_end_word(cursor);
            if word.is_empty() {
                return Err(Error::parse(cursor.rest(), "expected a word or group"));
            }
            Ok(Expression::Text(TextChunk::new(normalize_text(&remove_escapes(&word)))))
        }
        None => Err(Error::parse("", "unexpected end of input")),
    }
}

/// Parse a complete sentence template into a [`Sentence`].
pub fn parse_sentence(text: &str) -> Result<Sentence> {
    let root = parse_group_body(text)?;
    Ok(Sentence::new(text, root))
}

/// Parse several sentence templates at once, propagating the first error.
pub fn parse_sentences(texts: &[String]) -> Result<Vec<Sentence>> {
    texts.iter().map(|t| parse_sentence(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        let sentence = parse_sentence("turn on the light").unwrap();
        assert_eq!(sentence.root.kind, SequenceType::Group);
        assert!(sentence.root.items.len() >= 1);
    }

    #[test]
    fn test_parse_alternative() {
        let sentence = parse_sentence("turn (on|off) the light").unwrap();
        let has_alt = sentence
            .root
            .items
            .iter()
            .any(|e| matches!(e, Expression::Sequence(_)));
        assert!(has_alt);
    }

    #[test]
    fn test_parse_optional() {
        let sentence = parse_sentence("turn on [the] light").unwrap();
        let has_opt = sentence.root.items.iter().any(|e| match e {
            Expression::Alternative(seq) => seq.is_optional,
            _ => false,
        });
        assert!(has_opt);
    }

    #[test]
    fn test_parse_list_ref() {
        let sentence = parse_sentence("set {brightness} percent").unwrap();
        let names = sentence.root.list_names();
        assert_eq!(names, vec!["brightness"]);
    }

    #[test]
    fn test_parse_list_ref_with_slot() {
        let expr = ListReference::new("area:location");
        assert_eq!(expr.list_name, "area");
        assert_eq!(expr.slot_name(), "location");
    }

    #[test]
    fn test_parse_rule_ref() {
        let sentence = parse_sentence("<name> the light").unwrap();
        let has_rule = sentence
            .root
            .items
            .iter()
            .any(|e| matches!(e, Expression::RuleRef(name) if name == "name"));
        assert!(has_rule);
    }

    #[test]
    fn test_unterminated_group_errors() {
        assert!(parse_sentence("turn on (the light").is_err());
    }

    #[test]
    fn test_escaped_delimiter() {
        let sentence = parse_sentence(r"say \(hello\)").unwrap();
        let text: String = sentence
            .root
            .items
            .iter()
            .filter_map(|e| match e {
                Expression::Text(chunk) => Some(chunk.text.clone()),
                _ => None,
            })
            .collect();
        assert!(text.contains('('));
    }

    proptest::proptest! {
        /// A template built only from words and a wrapping group round-trips:
        /// sampling the parsed sentence reproduces the normalized source text.
        #[test]
        fn prop_parser_round_trips_words_and_groups(
            words in proptest::collection::vec("[a-z]{1,6}", 1..5),
            wrap_in_group in proptest::bool::ANY,
        ) {
            let plain = words.join(" ");
            let template = if wrap_in_group { format!("({plain})") } else { plain.clone() };

            let sentence = parse_sentence(&template).unwrap();
            let lists = indexmap::IndexMap::new();
            let rules = indexmap::IndexMap::new();
            let samples: Vec<String> =
                crate::sampler::sample_sequence(&sentence.root, &lists, &rules).unwrap().collect();

            proptest::prop_assert!(samples.contains(&normalize_text(&plain)));
        }
    }
}
