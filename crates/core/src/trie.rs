//! Prefix trie used to recognize number words (and other multi-word keys)
//! inside a stream of tokens without backtracking character-by-character.

use std::collections::{HashSet, VecDeque};

type NodeId = u32;

#[derive(Debug)]
struct Node<V> {
    id: NodeId,
    /// Text accumulated from the root to this node, if this node is terminal.
    text: Option<String>,
    value: Option<V>,
    children: Vec<(char, NodeId)>,
}

/// A result produced by [`Trie::find`]: the end offset (in bytes) of the
/// match within the searched text, the matched text itself, and the stored
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieHit<'v, V> {
    pub end: usize,
    pub text: String,
    pub value: &'v V,
}

/// A trie keyed by `&str`, storing an arbitrary value per inserted key.
///
/// Insertion is idempotent with respect to the tree shape: inserting the
/// same key twice creates a second terminal marker on the same node rather
/// than overwriting it, matching the behavior of the reference
/// implementation's `insert`. [`Trie::find`] can be asked to deduplicate
/// hits by node id (`unique = true`) so that a key inserted multiple times
/// with different values is only reported once per distinct end position.
pub struct Trie<V> {
    nodes: Vec<Node<V>>,
    next_id: NodeId,
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Trie<V> {
    pub fn new() -> Self {
        let root = Node {
            id: 0,
            text: None,
            value: None,
            children: Vec::new(),
        };
        Trie {
            nodes: vec![root],
            next_id: 1,
        }
    }

    fn alloc(&mut self, text: Option<String>, value: Option<V>) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.push(Node {
            id,
            text,
            value,
            children: Vec::new(),
        });
        id
    }

    /// Insert `text` into the trie, storing `value` on its terminal node.
    pub fn insert(&mut self, text: &str, value: V) {
        let mut node_idx = 0usize; // root is always nodes[0]
        for c in text.chars() {
            let existing = self.nodes[node_idx]
                .children
                .iter()
                .find(|(ch, _)| *ch == c)
                .map(|(_, id)| *id);
            let child_id = if let Some(id) = existing {
                id
            } else {
                let id = self.alloc(None, None);
                self.nodes[node_idx].children.push((c, id));
                id
            };
            node_idx = self.index_of(child_id);
        }
        self.nodes[node_idx].text = Some(text.to_string());
        self.nodes[node_idx].value = Some(value);
    }

    fn index_of(&self, id: NodeId) -> usize {
        // Node ids are assigned in the same order as `nodes`, so id == index.
        id as usize
    }

    /// Find all keys that are a prefix of `text`, starting at byte offset 0.
    /// Returns hits in breadth-first (shortest match first) order. When
    /// `unique` is set, at most one hit per distinct terminal node id is
    /// yielded even if `text` could reach it via multiple paths (which can't
    /// happen with a plain prefix scan, but mirrors the reference semantics
    /// for callers that reuse this across repeated inserts of the same key).
    pub fn find<'v>(&'v self, text: &str, unique: bool) -> Vec<TrieHit<'v, V>> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut queue: VecDeque<(usize, usize)> = VecDeque::new(); // (node_idx, char_pos)
        queue.push_back((0, 0));
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut hits = Vec::new();

        while let Some((node_idx, pos)) = queue.pop_front() {
            let node = &self.nodes[node_idx];
            if let Some(text) = &node.text {
                if !unique || visited.insert(node.id) {
                    let end = chars_byte_offset(&chars, pos);
                    hits.push(TrieHit {
                        end,
                        text: text.clone(),
                        value: node.value.as_ref().expect("terminal node has value"),
                    });
                }
            }
            if pos >= chars.len() {
                continue;
            }
            let (_, c) = chars[pos];
            if let Some((_, child_id)) = node.children.iter().find(|(ch, _)| *ch == c) {
                queue.push_back((self.index_of(*child_id), pos + 1));
            }
        }

        hits
    }
}

fn chars_byte_offset(chars: &[(usize, char)], pos: usize) -> usize {
    chars.get(pos).map_or_else(
        || chars.last().map_or(0, |(i, c)| i + c.len_utf8()),
        |(i, _)| *i,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find() {
        let mut trie: Trie<u32> = Trie::new();
        trie.insert("one", 1);
        trie.insert("two", 2);
        trie.insert("twenty", 20);

        let hits = trie.find("twenty one", false);
        let texts: Vec<_> = hits.iter().map(|h| h.text.as_str()).collect();
        assert!(texts.contains(&"two"));
        assert!(texts.contains(&"twenty"));
        assert!(!texts.contains(&"one"));
    }

    #[test]
    fn test_find_no_match() {
        let mut trie: Trie<u32> = Trie::new();
        trie.insert("five", 5);
        assert!(trie.find("six", false).is_empty());
    }

    #[test]
    fn test_unique_dedup() {
        let mut trie: Trie<u32> = Trie::new();
        trie.insert("ten", 10);
        let hits_unique = trie.find("ten", true);
        let hits_all = trie.find("ten", false);
        assert_eq!(hits_unique.len(), hits_all.len());
    }
}
