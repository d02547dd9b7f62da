//! Pattern syntax trees.
//!
//! All patterns of a specification (rule patterns and definition bodies)
//! live in one [`PatternArena`]. Nodes are hash-consed on allocation, so a
//! definition referenced by twenty rules is one subtree, and two rules that
//! spell the same class share the node too.

use std::fmt::Write as _;

use lexr_ir::{ByteSet, Span};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Index of a node in a [`PatternArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Children list; most concatenations and alternations are short.
pub type NodeList = SmallVec<[NodeId; 4]>;

/// A pattern syntax node over bytes.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Node {
    /// Matches the empty string.
    Empty,
    /// A fixed byte sequence (quoted strings, runs of plain characters).
    Literal(Box<[u8]>),
    /// One byte from the set (`[...]`, `.`, escapes).
    Class(ByteSet),
    Concat(NodeList),
    Alt(NodeList),
    /// `min..=max` repetitions; `max == None` is unbounded.
    Repeat {
        node: NodeId,
        min: u32,
        max: Option<u32>,
    },
}

/// Arena owning every pattern node of a specification.
#[derive(Clone, Debug, Default)]
pub struct PatternArena {
    nodes: Vec<Node>,
    interned: FxHashMap<Node, NodeId>,
}

impl PatternArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena with room for `capacity` nodes (the `%e` hint).
    pub fn with_capacity(capacity: usize) -> Self {
        PatternArena {
            nodes: Vec::with_capacity(capacity),
            interned: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Allocate `node`, returning the existing id for a structurally
    /// identical node.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(&id) = self.interned.get(&node) {
            return id;
        }
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node.clone());
        self.interned.insert(node, id);
        id
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Concatenation with flattening and merging of adjacent literals.
    pub fn concat(&mut self, parts: impl IntoIterator<Item = NodeId>) -> NodeId {
        let mut flat: NodeList = SmallVec::new();
        let mut pending: Vec<u8> = Vec::new();
        for part in parts {
            match self.get(part).clone() {
                Node::Empty => {}
                Node::Literal(bytes) => pending.extend_from_slice(&bytes),
                Node::Concat(children) => {
                    for child in children {
                        if let Node::Literal(bytes) = self.get(child) {
                            pending.extend_from_slice(bytes);
                        } else {
                            self.flush_literal(&mut pending, &mut flat);
                            flat.push(child);
                        }
                    }
                }
                _ => {
                    self.flush_literal(&mut pending, &mut flat);
                    flat.push(part);
                }
            }
        }
        self.flush_literal(&mut pending, &mut flat);
        match flat.len() {
            0 => self.alloc(Node::Empty),
            1 => flat[0],
            _ => self.alloc(Node::Concat(flat)),
        }
    }

    fn flush_literal(&mut self, pending: &mut Vec<u8>, out: &mut NodeList) {
        if !pending.is_empty() {
            let bytes = std::mem::take(pending).into_boxed_slice();
            out.push(self.alloc(Node::Literal(bytes)));
        }
    }

    /// Alternation; a single branch is returned unchanged.
    pub fn alt(&mut self, branches: NodeList) -> NodeId {
        if branches.len() == 1 {
            branches[0]
        } else {
            self.alloc(Node::Alt(branches))
        }
    }

    /// Length of every string `id` matches, if they all share one length.
    pub fn fixed_len(&self, id: NodeId) -> Option<u32> {
        match self.get(id) {
            Node::Empty => Some(0),
            Node::Literal(bytes) => u32::try_from(bytes.len()).ok(),
            Node::Class(_) => Some(1),
            Node::Concat(children) => children
                .iter()
                .try_fold(0u32, |acc, &c| acc.checked_add(self.fixed_len(c)?)),
            Node::Alt(branches) => {
                let first = self.fixed_len(*branches.first()?)?;
                branches[1..]
                    .iter()
                    .all(|&b| self.fixed_len(b) == Some(first))
                    .then_some(first)
            }
            Node::Repeat { node, min, max } => {
                let inner = self.fixed_len(*node)?;
                if inner == 0 {
                    Some(0)
                } else if Some(*min) == *max {
                    inner.checked_mul(*min)
                } else {
                    None
                }
            }
        }
    }

    /// Whether `id` matches the empty string.
    pub fn nullable(&self, id: NodeId) -> bool {
        match self.get(id) {
            Node::Empty => true,
            Node::Literal(bytes) => bytes.is_empty(),
            Node::Class(_) => false,
            Node::Concat(children) => children.iter().all(|&c| self.nullable(c)),
            Node::Alt(branches) => branches.iter().any(|&b| self.nullable(b)),
            Node::Repeat { node, min, .. } => *min == 0 || self.nullable(*node),
        }
    }

    /// Every byte set the subtree can consume, for alphabet partitioning.
    pub fn collect_sets(&self, id: NodeId, out: &mut Vec<ByteSet>) {
        match self.get(id) {
            Node::Empty => {}
            Node::Literal(bytes) => out.extend(bytes.iter().map(|&b| ByteSet::single(b))),
            Node::Class(set) => out.push(*set),
            Node::Concat(children) | Node::Alt(children) => {
                for &child in children {
                    self.collect_sets(child, out);
                }
            }
            Node::Repeat { node, .. } => self.collect_sets(*node, out),
        }
    }

    /// Render the subtree back to normalized pattern syntax.
    pub fn display(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render(id, 0, &mut out);
        out
    }

    fn render(&self, id: NodeId, parent_prec: u8, out: &mut String) {
        let prec = match self.get(id) {
            Node::Alt(_) => 1,
            Node::Concat(_) => 2,
            Node::Literal(bytes) if bytes.len() > 1 => 2,
            _ => 3,
        };
        let wrap = prec < parent_prec;
        if wrap {
            out.push('(');
        }
        match self.get(id) {
            Node::Empty => out.push_str("()"),
            Node::Literal(bytes) => {
                for &b in bytes.iter() {
                    push_byte(out, b);
                }
            }
            Node::Class(set) => {
                if *set == ByteSet::any_but_newline() {
                    out.push('.');
                } else if set.len() == 1 {
                    if let Some(b) = set.iter().next() {
                        push_byte(out, b);
                    }
                } else {
                    let _ = write!(out, "{set:?}");
                }
            }
            Node::Concat(children) => {
                for &child in children {
                    self.render(child, 2, out);
                }
            }
            Node::Alt(branches) => {
                for (i, &branch) in branches.iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    self.render(branch, 1, out);
                }
            }
            Node::Repeat { node, min, max } => {
                self.render(*node, 3, out);
                match (min, max) {
                    (0, None) => out.push('*'),
                    (1, None) => out.push('+'),
                    (0, Some(1)) => out.push('?'),
                    (n, None) => {
                        let _ = write!(out, "{{{n},}}");
                    }
                    (n, Some(m)) if n == m => {
                        let _ = write!(out, "{{{n}}}");
                    }
                    (n, Some(m)) => {
                        let _ = write!(out, "{{{n},{m}}}");
                    }
                }
            }
        }
        if wrap {
            out.push(')');
        }
    }
}

fn push_byte(out: &mut String, b: u8) {
    match b {
        b'\n' => out.push_str("\\n"),
        b'\t' => out.push_str("\\t"),
        b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b' ' => out.push(b as char),
        0x21..=0x7e => {
            out.push('\\');
            out.push(b as char);
        }
        _ => {
            let _ = write!(out, "\\x{b:02x}");
        }
    }
}

/// What must follow the head of a rule pattern.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Trailing {
    None,
    /// `head/tail`: the tail is matched but not consumed.
    Context(NodeId),
    /// `head$`: a newline (not consumed) or end of input must follow.
    EndOfLine,
}

/// A fully parsed rule pattern.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RulePattern {
    pub head: NodeId,
    pub trailing: Trailing,
    /// `^`: only matches at the start of a line.
    pub bol: bool,
    /// Location of the pattern text in the specification.
    pub span: Span,
}

impl RulePattern {
    /// The `$` anchor flag.
    pub fn eol(&self) -> bool {
        self.trailing == Trailing::EndOfLine
    }
}
