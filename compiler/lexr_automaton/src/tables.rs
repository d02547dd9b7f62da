//! Compiled scanner tables.
//!
//! Everything the runtime needs, immutable after construction and
//! `Send + Sync`, so one [`ScannerTables`] can back any number of
//! concurrent scans through an `Arc`.

use lexr_ir::{ActionId, CondId, LexemeMode, RuleId, Span};

use crate::classes::ByteClasses;
use crate::conditions::{ConditionRegistry, StartCondition};

/// State index in a [`Dfa`].
pub type DfaState = u32;

/// A minimized DFA over byte classes plus the end-of-input symbol.
///
/// State 0 is the dead state: it has no candidates and every transition
/// loops back to it.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Dfa {
    symbols: usize,
    transitions: Vec<DfaState>,
    /// `accept_rules[accept_offsets[s]..accept_offsets[s + 1]]` are the
    /// candidates of state `s`, ascending.
    accept_offsets: Vec<u32>,
    accept_rules: Vec<RuleId>,
    start: DfaState,
    bol_start: DfaState,
}

impl Dfa {
    pub const DEAD: DfaState = 0;

    pub(crate) fn from_parts(
        symbols: usize,
        transitions: Vec<DfaState>,
        candidates: &[&[RuleId]],
        start: DfaState,
        bol_start: DfaState,
    ) -> Dfa {
        let mut accept_offsets = Vec::with_capacity(candidates.len() + 1);
        let mut accept_rules = Vec::new();
        accept_offsets.push(0);
        for set in candidates {
            accept_rules.extend_from_slice(set);
            accept_offsets.push(accept_rules.len() as u32);
        }
        Dfa {
            symbols,
            transitions,
            accept_offsets,
            accept_rules,
            start,
            bol_start,
        }
    }

    /// Entry state; the beginning-of-line entry also reaches `^` rules.
    #[inline]
    pub fn start(&self, at_bol: bool) -> DfaState {
        if at_bol {
            self.bol_start
        } else {
            self.start
        }
    }

    #[inline]
    pub fn next(&self, state: DfaState, symbol: usize) -> DfaState {
        self.transitions[state as usize * self.symbols + symbol]
    }

    /// Rules accepting in `state`, lowest id (highest priority) first.
    #[inline]
    pub fn candidates(&self, state: DfaState) -> &[RuleId] {
        let s = state as usize;
        let lo = self.accept_offsets[s] as usize;
        let hi = self.accept_offsets[s + 1] as usize;
        &self.accept_rules[lo..hi]
    }

    pub fn is_accepting(&self, state: DfaState) -> bool {
        !self.candidates(state).is_empty()
    }

    /// Number of states, the dead state included.
    pub fn len(&self) -> usize {
        self.accept_offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn symbols(&self) -> usize {
        self.symbols
    }

    pub fn table_entries(&self) -> usize {
        self.transitions.len()
    }

    /// Run over `bytes` from the normal entry; returns every prefix length
    /// at which the automaton accepts, ascending.
    pub fn accepting_prefixes(&self, classes: &ByteClasses, bytes: &[u8]) -> Vec<usize> {
        let mut state = self.start(false);
        let mut out = Vec::new();
        if self.is_accepting(state) {
            out.push(0);
        }
        for (i, &b) in bytes.iter().enumerate() {
            state = self.next(state, classes.class_of(b));
            if state == Self::DEAD {
                break;
            }
            if self.is_accepting(state) {
                out.push(i + 1);
            }
        }
        out
    }

    /// Whether the automaton accepts exactly `bytes`.
    pub fn matches(&self, classes: &ByteClasses, bytes: &[u8]) -> bool {
        let mut state = self.start(false);
        for &b in bytes {
            state = self.next(state, classes.class_of(b));
            if state == Self::DEAD {
                return false;
            }
        }
        self.is_accepting(state)
    }
}

/// Where a trailing-context match splits into lexeme and lookahead.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TrailingSplit {
    /// No trailing context: the whole match is the lexeme.
    None,
    /// The head has a fixed length.
    HeadLen(usize),
    /// The tail has a fixed length.
    TailLen(usize),
    /// `$`: the last byte is the `\n` lookahead, unless the match ended at
    /// end of input.
    EndOfLine,
    /// Neither side has a fixed length; the split is found by running the
    /// standalone head and tail automata.
    Variable { head: Box<Dfa>, tail: Box<Dfa> },
}

impl TrailingSplit {
    /// Length of the lexeme within a match of `text`.
    ///
    /// `at_end` is set when the match was accepted on the end-of-input
    /// symbol. For variable splits the longest head whose remainder
    /// matches the tail wins.
    pub fn lexeme_len(&self, classes: &ByteClasses, text: &[u8], at_end: bool) -> usize {
        match self {
            TrailingSplit::None => text.len(),
            TrailingSplit::HeadLen(n) => (*n).min(text.len()),
            TrailingSplit::TailLen(n) => text.len().saturating_sub(*n),
            TrailingSplit::EndOfLine if at_end => text.len(),
            TrailingSplit::EndOfLine => text.len().saturating_sub(1),
            TrailingSplit::Variable { head, tail } => head
                .accepting_prefixes(classes, text)
                .into_iter()
                .rev()
                .find(|&q| tail.matches(classes, &text[q..]))
                .unwrap_or(text.len()),
        }
    }

    pub fn has_lookahead(&self) -> bool {
        !matches!(self, TrailingSplit::None)
    }
}

/// Per-rule data the runtime needs after a match.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleInfo {
    pub id: RuleId,
    pub action: ActionId,
    pub split: TrailingSplit,
    /// Anchored with `^`.
    pub bol: bool,
    /// Pattern text as written.
    pub pattern: String,
    pub span: Span,
}

/// The compiled scanner: classes, one DFA per start condition, rule data.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ScannerTables {
    pub(crate) classes: ByteClasses,
    pub(crate) conditions: ConditionRegistry,
    /// Indexed by [`CondId`].
    pub(crate) automata: Vec<Dfa>,
    /// Indexed by [`RuleId`].
    pub(crate) rules: Vec<RuleInfo>,
    pub(crate) lexeme_mode: LexemeMode,
    pub(crate) count_lines: bool,
}

impl ScannerTables {
    pub fn classes(&self) -> &ByteClasses {
        &self.classes
    }

    pub fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    pub fn condition(&self, id: CondId) -> Option<&StartCondition> {
        self.conditions.get(id)
    }

    pub fn lookup_condition(&self, name: &str) -> Option<CondId> {
        self.conditions.lookup(name)
    }

    pub fn automaton(&self, id: CondId) -> Option<&Dfa> {
        self.automata.get(id.index())
    }

    pub fn automata(&self) -> impl Iterator<Item = (CondId, &Dfa)> {
        self.conditions
            .iter()
            .map(|(id, _)| id)
            .zip(self.automata.iter())
    }

    pub fn rule(&self, id: RuleId) -> Option<&RuleInfo> {
        self.rules.get(id.index())
    }

    pub fn rules(&self) -> &[RuleInfo] {
        &self.rules
    }

    /// Lexeme mode requested by the specification (`%array`/`%pointer`).
    pub fn lexeme_mode(&self) -> LexemeMode {
        self.lexeme_mode
    }

    /// Whether `%option yylineno` was given.
    pub fn counts_lines(&self) -> bool {
        self.count_lines
    }

    /// Total transition-table entries across every automaton.
    pub fn table_entries(&self) -> usize {
        let splits: usize = self
            .rules
            .iter()
            .map(|r| match &r.split {
                TrailingSplit::Variable { head, tail } => {
                    head.table_entries() + tail.table_entries()
                }
                _ => 0,
            })
            .sum();
        self.automata.iter().map(Dfa::table_entries).sum::<usize>() + splits
    }
}
