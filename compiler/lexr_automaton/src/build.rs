//! Automaton construction from compiled rule patterns.

use lexr_ir::{ActionId, ByteSet, CapacityHints, HintKind, RuleId, Span};
use lexr_pattern::{NodeId, PatternArena, RulePattern, Trailing};
use rayon::prelude::*;

use crate::classes::ByteClasses;
use crate::conditions::{ConditionRegistry, StartCondition};
use crate::dfa::determinize;
use crate::minimize::minimize;
use crate::nfa::{Fragment, Nfa};
use crate::stats::TableStats;
use crate::tables::{Dfa, RuleInfo, TrailingSplit};

/// NFA states reserved per condition when `%p` is absent.
const DEFAULT_NFA_CAPACITY: usize = 256;
/// DFA states reserved per condition when `%n` is absent.
const DEFAULT_DFA_CAPACITY: usize = 64;

/// A rule whose pattern compiled.
#[derive(Clone, Debug)]
pub(crate) struct RuleInput {
    pub id: RuleId,
    pub action: ActionId,
    pub pattern: RulePattern,
    pub text: String,
    pub span: Span,
}

pub(crate) struct Built {
    pub classes: ByteClasses,
    /// Indexed by condition id.
    pub automata: Vec<Dfa>,
    /// Indexed by rule id.
    pub rules: Vec<RuleInfo>,
    pub stats: TableStats,
}

struct ConditionAutomaton {
    nfa_states: usize,
    nfa_transitions: usize,
    raw_states: usize,
    dfa: Dfa,
}

/// Build every condition's DFA plus the per-rule trailing splits.
///
/// `rules` must be numbered densely from 0 in declaration order.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(rules = rules.len(), conditions = registry.len())
)]
pub(crate) fn build(
    arena: &PatternArena,
    rules: &[RuleInput],
    registry: &ConditionRegistry,
    fold_case: bool,
    hints: CapacityHints,
) -> Built {
    let classes = alphabet(arena, rules, fold_case);
    tracing::debug!(classes = classes.len(), "byte classes");

    let fragments: Vec<Fragment> = rules
        .par_iter()
        .map(|r| Fragment::for_rule(arena, &r.pattern, r.id, fold_case))
        .collect();
    let infos: Vec<RuleInfo> = rules
        .par_iter()
        .map(|r| RuleInfo {
            id: r.id,
            action: r.action,
            split: trailing_split(arena, r, &classes, fold_case),
            bol: r.pattern.bol,
            pattern: r.text.clone(),
            span: r.span,
        })
        .collect();

    let nfa_capacity = hints.reserve(HintKind::Positions, DEFAULT_NFA_CAPACITY);
    let dfa_capacity = hints.reserve(HintKind::States, DEFAULT_DFA_CAPACITY);
    let conditions: Vec<&StartCondition> = registry.iter().map(|(_, c)| c).collect();
    let built: Vec<ConditionAutomaton> = conditions
        .into_par_iter()
        .map(|cond| build_condition(cond, &fragments, &classes, nfa_capacity, dfa_capacity))
        .collect();

    let mut stats = TableStats {
        parse_nodes: arena.len(),
        classes: classes.len(),
        hints,
        ..TableStats::default()
    };
    for c in &built {
        stats.nfa_states += c.nfa_states;
        stats.nfa_transitions += c.nfa_transitions;
        stats.dfa_states_raw += c.raw_states;
        stats.dfa_states += c.dfa.len();
        stats.table_entries += c.dfa.table_entries();
    }
    for info in &infos {
        if let TrailingSplit::Variable { head, tail } = &info.split {
            stats.table_entries += head.table_entries() + tail.table_entries();
        }
    }
    stats.log_overflow();
    tracing::debug!(
        nfa_states = stats.nfa_states,
        dfa_states = stats.dfa_states,
        entries = stats.table_entries,
        "automata built"
    );

    Built {
        classes,
        automata: built.into_iter().map(|c| c.dfa).collect(),
        rules: infos,
        stats,
    }
}

#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(condition = %cond.name, rules = cond.rules.len())
)]
fn build_condition(
    cond: &StartCondition,
    fragments: &[Fragment],
    classes: &ByteClasses,
    nfa_capacity: usize,
    dfa_capacity: usize,
) -> ConditionAutomaton {
    let nfa = Nfa::assemble(
        cond.rules.iter().filter_map(|r| fragments.get(r.index())),
        nfa_capacity,
    );
    let raw = determinize(&nfa, classes, dfa_capacity);
    let dfa = minimize(&raw);
    tracing::debug!(nfa = nfa.len(), raw = raw.len(), dfa = dfa.len(), "condition built");
    ConditionAutomaton {
        nfa_states: nfa.len(),
        nfa_transitions: nfa.transitions(),
        raw_states: raw.len(),
        dfa,
    }
}

/// Byte classes from every set any rule uses, plus `\n` for `$`.
fn alphabet(arena: &PatternArena, rules: &[RuleInput], fold_case: bool) -> ByteClasses {
    let mut sets = vec![ByteSet::single(b'\n')];
    for rule in rules {
        arena.collect_sets(rule.pattern.head, &mut sets);
        if let Trailing::Context(tail) = rule.pattern.trailing {
            arena.collect_sets(tail, &mut sets);
        }
    }
    if fold_case {
        for set in &mut sets {
            *set = set.fold_ascii_case();
        }
    }
    sets.sort_unstable();
    sets.dedup();
    ByteClasses::from_sets(&sets)
}

fn trailing_split(
    arena: &PatternArena,
    rule: &RuleInput,
    classes: &ByteClasses,
    fold_case: bool,
) -> TrailingSplit {
    match rule.pattern.trailing {
        Trailing::None => TrailingSplit::None,
        Trailing::EndOfLine => TrailingSplit::EndOfLine,
        Trailing::Context(tail) => {
            if let Some(n) = arena.fixed_len(rule.pattern.head) {
                TrailingSplit::HeadLen(n as usize)
            } else if let Some(n) = arena.fixed_len(tail) {
                TrailingSplit::TailLen(n as usize)
            } else {
                TrailingSplit::Variable {
                    head: Box::new(side_automaton(arena, rule.pattern.head, rule.id, classes, fold_case)),
                    tail: Box::new(side_automaton(arena, tail, rule.id, classes, fold_case)),
                }
            }
        }
    }
}

/// Standalone DFA for one side of a trailing-context rule.
fn side_automaton(
    arena: &PatternArena,
    node: NodeId,
    rule: RuleId,
    classes: &ByteClasses,
    fold_case: bool,
) -> Dfa {
    let fragment = Fragment::for_node(arena, node, rule, fold_case);
    let nfa = Nfa::single(&fragment);
    minimize(&determinize(&nfa, classes, fragment.states.len()))
}

/// Rules that are never the preferred candidate of any accepting state.
///
/// Each is paired with a rule that wins wherever it could have matched,
/// when there is one.
pub(crate) fn unreachable_rules(automata: &[Dfa], rule_count: usize) -> Vec<(RuleId, Option<RuleId>)> {
    let mut wins = vec![false; rule_count];
    let mut shadowed_by: Vec<Option<RuleId>> = vec![None; rule_count];
    for dfa in automata {
        for state in 0..dfa.len() {
            let candidates = dfa.candidates(state as u32);
            let Some((&first, rest)) = candidates.split_first() else {
                continue;
            };
            if let Some(w) = wins.get_mut(first.index()) {
                *w = true;
            }
            for r in rest {
                if let Some(slot) = shadowed_by.get_mut(r.index()) {
                    slot.get_or_insert(first);
                }
            }
        }
    }
    (0..rule_count)
        .filter(|&i| !wins[i])
        .map(|i| (RuleId::new(i as u32), shadowed_by[i]))
        .collect()
}
