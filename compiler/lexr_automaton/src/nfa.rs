//! Thompson NFA fragments and per-condition assembly.
//!
//! Each rule compiles to a self-contained [`Fragment`] with local state
//! numbering, so fragments can be built in parallel. A condition's NFA is
//! the concatenation of its rules' fragments behind two entry states: the
//! normal entry reaches every rule without `^`, the beginning-of-line entry
//! reaches every rule.

use lexr_ir::{ByteSet, RuleId};
use lexr_pattern::{ensure_sufficient_stack, Node, NodeId, PatternArena, RulePattern, Trailing};
use smallvec::SmallVec;

pub(crate) type StateId = u32;

/// What an NFA edge consumes.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Label {
    Bytes(ByteSet),
    /// The end-of-input pseudo symbol; only `$` produces it.
    EndOfInput,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct NfaState {
    pub eps: SmallVec<[StateId; 2]>,
    pub edges: SmallVec<[(Label, StateId); 1]>,
    pub accept: Option<RuleId>,
}

impl NfaState {
    fn shifted(&self, offset: StateId) -> NfaState {
        NfaState {
            eps: self.eps.iter().map(|&s| s + offset).collect(),
            edges: self.edges.iter().map(|&(l, s)| (l, s + offset)).collect(),
            accept: self.accept,
        }
    }
}

/// A rule's automaton with local state ids.
#[derive(Clone, Debug)]
pub(crate) struct Fragment {
    pub states: Vec<NfaState>,
    pub start: StateId,
    /// Only reachable from the beginning-of-line entry.
    pub bol: bool,
}

impl Fragment {
    /// Fragment accepting `head`, `head tail` or `head ($|\n)` for `rule`.
    pub fn for_rule(
        arena: &PatternArena,
        pattern: &RulePattern,
        rule: RuleId,
        fold_case: bool,
    ) -> Fragment {
        let mut builder = Builder::new(arena, fold_case);
        let (start, head_end) = builder.build(pattern.head);
        let accept = match pattern.trailing {
            Trailing::None => head_end,
            Trailing::Context(tail) => {
                let (tail_start, tail_end) = builder.build(tail);
                builder.eps(head_end, tail_start);
                tail_end
            }
            Trailing::EndOfLine => {
                let end = builder.state();
                builder.edge(head_end, Label::Bytes(ByteSet::single(b'\n')), end);
                builder.edge(head_end, Label::EndOfInput, end);
                end
            }
        };
        builder.states[accept as usize].accept = Some(rule);
        Fragment {
            states: builder.states,
            start,
            bol: pattern.bol,
        }
    }

    /// Fragment accepting exactly `node`, tagged with `rule`.
    pub fn for_node(arena: &PatternArena, node: NodeId, rule: RuleId, fold_case: bool) -> Fragment {
        let mut builder = Builder::new(arena, fold_case);
        let (start, end) = builder.build(node);
        builder.states[end as usize].accept = Some(rule);
        Fragment {
            states: builder.states,
            start,
            bol: false,
        }
    }
}

/// A complete NFA with its two entry points.
#[derive(Clone, Debug)]
pub(crate) struct Nfa {
    pub states: Vec<NfaState>,
    pub start: StateId,
    pub bol_start: StateId,
}

impl Nfa {
    /// Join fragments behind a normal and a beginning-of-line entry.
    pub fn assemble<'f>(fragments: impl IntoIterator<Item = &'f Fragment>, capacity: usize) -> Nfa {
        let mut states = Vec::with_capacity(capacity.max(2));
        states.push(NfaState::default());
        states.push(NfaState::default());
        for fragment in fragments {
            let offset = states.len() as StateId;
            states.extend(fragment.states.iter().map(|s| s.shifted(offset)));
            let entry = fragment.start + offset;
            states[1].eps.push(entry);
            if !fragment.bol {
                states[0].eps.push(entry);
            }
        }
        Nfa {
            states,
            start: 0,
            bol_start: 1,
        }
    }

    /// NFA of a single fragment with one entry point.
    pub fn single(fragment: &Fragment) -> Nfa {
        Nfa {
            states: fragment.states.clone(),
            start: fragment.start,
            bol_start: fragment.start,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn transitions(&self) -> usize {
        self.states.iter().map(|s| s.eps.len() + s.edges.len()).sum()
    }
}

struct Builder<'a> {
    arena: &'a PatternArena,
    fold_case: bool,
    states: Vec<NfaState>,
}

impl<'a> Builder<'a> {
    fn new(arena: &'a PatternArena, fold_case: bool) -> Self {
        Builder {
            arena,
            fold_case,
            states: Vec::new(),
        }
    }

    fn state(&mut self) -> StateId {
        self.states.push(NfaState::default());
        (self.states.len() - 1) as StateId
    }

    fn eps(&mut self, from: StateId, to: StateId) {
        self.states[from as usize].eps.push(to);
    }

    fn edge(&mut self, from: StateId, label: Label, to: StateId) {
        self.states[from as usize].edges.push((label, to));
    }

    fn bytes(&self, set: ByteSet) -> Label {
        if self.fold_case {
            Label::Bytes(set.fold_ascii_case())
        } else {
            Label::Bytes(set)
        }
    }

    /// Build `node`, returning its entry and exit states.
    fn build(&mut self, node: NodeId) -> (StateId, StateId) {
        ensure_sufficient_stack(|| self.build_node(node))
    }

    fn build_node(&mut self, node: NodeId) -> (StateId, StateId) {
        let arena = self.arena;
        match arena.get(node) {
            Node::Empty => {
                let s = self.state();
                (s, s)
            }
            Node::Literal(bytes) => {
                let start = self.state();
                let mut cur = start;
                for &b in bytes.iter() {
                    let next = self.state();
                    let label = self.bytes(ByteSet::single(b));
                    self.edge(cur, label, next);
                    cur = next;
                }
                (start, cur)
            }
            Node::Class(set) => {
                let start = self.state();
                let end = self.state();
                let label = self.bytes(*set);
                self.edge(start, label, end);
                (start, end)
            }
            Node::Concat(parts) => {
                let mut ends: Option<(StateId, StateId)> = None;
                for &part in parts {
                    let (s, e) = self.build(part);
                    ends = Some(match ends {
                        None => (s, e),
                        Some((first, prev)) => {
                            self.eps(prev, s);
                            (first, e)
                        }
                    });
                }
                ends.unwrap_or_else(|| {
                    let s = self.state();
                    (s, s)
                })
            }
            Node::Alt(branches) => {
                let start = self.state();
                let end = self.state();
                for &branch in branches {
                    let (s, e) = self.build(branch);
                    self.eps(start, s);
                    self.eps(e, end);
                }
                (start, end)
            }
            Node::Repeat { node, min, max } => self.build_repeat(*node, *min, *max),
        }
    }

    /// `node{min,max}` unrolled: `min` mandatory copies followed by either a
    /// loop (`max = None`) or `max - min` optional copies.
    fn build_repeat(&mut self, node: NodeId, min: u32, max: Option<u32>) -> (StateId, StateId) {
        let start = self.state();
        let mut cur = start;
        for _ in 0..min {
            let (s, e) = self.build(node);
            self.eps(cur, s);
            cur = e;
        }
        let end = self.state();
        match max {
            None => {
                let (s, e) = self.build(node);
                self.eps(cur, s);
                self.eps(e, s);
                self.eps(e, end);
            }
            Some(max) => {
                for _ in min..max {
                    let (s, e) = self.build(node);
                    self.eps(cur, s);
                    self.eps(cur, end);
                    cur = e;
                }
            }
        }
        self.eps(cur, end);
        (start, end)
    }
}
