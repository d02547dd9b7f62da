//! Subset construction.

use lexr_ir::{RuleId, MAX_RESERVE};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::classes::ByteClasses;
use crate::nfa::{Label, Nfa, StateId};
use crate::tables::DfaState;

/// DFA straight out of subset construction, before minimization.
#[derive(Clone, Debug)]
pub(crate) struct RawDfa {
    pub symbols: usize,
    pub transitions: Vec<DfaState>,
    /// Sorted candidates per state.
    pub accepts: Vec<SmallVec<[RuleId; 2]>>,
    pub start: DfaState,
    pub bol_start: DfaState,
}

impl RawDfa {
    pub fn len(&self) -> usize {
        self.accepts.len()
    }

    #[inline]
    pub fn next(&self, state: DfaState, symbol: usize) -> DfaState {
        self.transitions[state as usize * self.symbols + symbol]
    }
}

/// Epsilon-closure with a generation-stamped visited set.
struct Closure {
    mark: Vec<u32>,
    generation: u32,
    stack: Vec<StateId>,
}

impl Closure {
    fn new(states: usize) -> Self {
        Closure {
            mark: vec![0; states],
            generation: 0,
            stack: Vec::new(),
        }
    }

    /// Close `seeds` under epsilon moves; the result is sorted.
    fn close(&mut self, nfa: &Nfa, seeds: &[StateId]) -> Box<[StateId]> {
        self.generation += 1;
        let generation = self.generation;
        let mut out = Vec::with_capacity(seeds.len() * 2);
        self.stack.clear();
        for &s in seeds {
            if self.mark[s as usize] != generation {
                self.mark[s as usize] = generation;
                self.stack.push(s);
            }
        }
        while let Some(s) = self.stack.pop() {
            out.push(s);
            for &t in &nfa.states[s as usize].eps {
                if self.mark[t as usize] != generation {
                    self.mark[t as usize] = generation;
                    self.stack.push(t);
                }
            }
        }
        out.sort_unstable();
        out.into_boxed_slice()
    }
}

/// Determinize `nfa` over `classes` plus the end-of-input symbol.
///
/// State 0 is the empty subset (dead). States are numbered in discovery
/// order, which only depends on the NFA, so construction is deterministic.
pub(crate) fn determinize(nfa: &Nfa, classes: &ByteClasses, capacity: usize) -> RawDfa {
    let symbols = classes.symbols();
    let eoi = classes.eoi();
    let reps = classes.representatives();

    let mut closure = Closure::new(nfa.len());
    let mut index: FxHashMap<Box<[StateId]>, DfaState> = FxHashMap::default();
    let mut subsets: Vec<Box<[StateId]>> = Vec::with_capacity(capacity);

    let mut intern = |set: Box<[StateId]>, subsets: &mut Vec<Box<[StateId]>>| -> DfaState {
        if let Some(&id) = index.get(&set) {
            return id;
        }
        let id = subsets.len() as DfaState;
        index.insert(set.clone(), id);
        subsets.push(set);
        id
    };

    intern(Box::default(), &mut subsets);
    let start = intern(closure.close(nfa, &[nfa.start]), &mut subsets);
    let bol_start = intern(closure.close(nfa, &[nfa.bol_start]), &mut subsets);

    let mut transitions: Vec<DfaState> = Vec::with_capacity(capacity.saturating_mul(symbols).min(MAX_RESERVE));
    let mut targets: Vec<StateId> = Vec::new();
    let mut next = 0usize;
    while next < subsets.len() {
        let current = subsets[next].clone();
        for symbol in 0..symbols {
            targets.clear();
            for &s in current.iter() {
                for &(label, t) in &nfa.states[s as usize].edges {
                    let hit = match label {
                        Label::Bytes(set) => symbol != eoi && set.contains(reps[symbol]),
                        Label::EndOfInput => symbol == eoi,
                    };
                    if hit {
                        targets.push(t);
                    }
                }
            }
            let target = if targets.is_empty() {
                0
            } else {
                intern(closure.close(nfa, &targets), &mut subsets)
            };
            transitions.push(target);
        }
        next += 1;
    }

    let accepts = subsets
        .iter()
        .map(|subset| {
            let mut rules: SmallVec<[RuleId; 2]> = subset
                .iter()
                .filter_map(|&s| nfa.states[s as usize].accept)
                .collect();
            rules.sort_unstable();
            rules.dedup();
            rules
        })
        .collect();

    RawDfa {
        symbols,
        transitions,
        accepts,
        start,
        bol_start,
    }
}

#[cfg(test)]
pub(crate) mod tests;
