//! DFA minimization by partition refinement, with canonical numbering.

use std::collections::VecDeque;

use lexr_ir::RuleId;
use rustc_hash::FxHashMap;

use crate::dfa::RawDfa;
use crate::tables::{Dfa, DfaState};

/// Merge equivalent states of `raw`.
///
/// Two states are equivalent when they have the same ordered candidate
/// set and their transitions agree block-wise. States that can never
/// accept collapse into the dead state. The result is renumbered
/// breadth-first from the entry points (dead state first), so equal
/// languages always produce identical tables.
#[tracing::instrument(level = "debug", skip_all, fields(states = raw.len()))]
pub(crate) fn minimize(raw: &RawDfa) -> Dfa {
    let n = raw.len();
    let symbols = raw.symbols;

    // Initial partition: by candidate set.
    let mut block = vec![0u32; n];
    let mut count = {
        let mut ids: FxHashMap<&[RuleId], u32> = FxHashMap::default();
        for (s, accepts) in raw.accepts.iter().enumerate() {
            let next = ids.len() as u32;
            block[s] = *ids.entry(accepts.as_slice()).or_insert(next);
        }
        ids.len()
    };

    let mut signature: Vec<u32> = Vec::with_capacity(symbols + 1);
    loop {
        let mut ids: FxHashMap<Vec<u32>, u32> = FxHashMap::default();
        let mut refined = vec![0u32; n];
        for s in 0..n {
            signature.clear();
            signature.push(block[s]);
            signature.extend((0..symbols).map(|c| block[raw.next(s as DfaState, c) as usize]));
            let next = ids.len() as u32;
            refined[s] = *ids.entry(signature.clone()).or_insert(next);
        }
        let refined_count = ids.len();
        block = refined;
        if refined_count == count {
            break;
        }
        count = refined_count;
    }

    renumber(raw, &block, count)
}

/// Build the minimized DFA with states numbered breadth-first.
fn renumber(raw: &RawDfa, block: &[u32], count: usize) -> Dfa {
    let symbols = raw.symbols;

    // One representative state per block.
    let mut rep = vec![u32::MAX; count];
    for (s, &b) in block.iter().enumerate() {
        if rep[b as usize] == u32::MAX {
            rep[b as usize] = s as u32;
        }
    }

    let mut new_id = vec![u32::MAX; count];
    let mut order: Vec<u32> = Vec::with_capacity(count);
    let mut queue = VecDeque::new();
    let mut visit = |b: u32, order: &mut Vec<u32>, queue: &mut VecDeque<u32>| -> DfaState {
        if new_id[b as usize] == u32::MAX {
            new_id[b as usize] = order.len() as u32;
            order.push(b);
            queue.push_back(b);
        }
        new_id[b as usize]
    };

    visit(block[0], &mut order, &mut queue);
    let start = visit(block[raw.start as usize], &mut order, &mut queue);
    let bol_start = visit(block[raw.bol_start as usize], &mut order, &mut queue);

    let mut transitions: Vec<DfaState> = Vec::with_capacity(count * symbols);
    while let Some(b) = queue.pop_front() {
        let s = rep[b as usize];
        for c in 0..symbols {
            let target = block[raw.next(s, c) as usize];
            transitions.push(visit(target, &mut order, &mut queue));
        }
    }

    let candidates: Vec<&[RuleId]> = order
        .iter()
        .map(|&b| raw.accepts[rep[b as usize] as usize].as_slice())
        .collect();
    Dfa::from_parts(symbols, transitions, &candidates, start, bol_start)
}
