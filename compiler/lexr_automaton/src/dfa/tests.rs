use super::*;
use crate::nfa::Fragment;
use lexr_pattern::PatternCompiler;
use pretty_assertions::assert_eq;

/// Raw DFA of one condition holding `rules` in order.
pub(crate) fn raw_dfa(rules: &[&str]) -> (ByteClasses, RawDfa) {
    let mut patterns = PatternCompiler::new();
    let compiled: Vec<_> = rules
        .iter()
        .map(|text| patterns.compile_rule(text, 0).unwrap())
        .collect();
    let arena = patterns.finish();
    let mut sets = vec![lexr_ir::ByteSet::single(b'\n')];
    for pattern in &compiled {
        arena.collect_sets(pattern.head, &mut sets);
    }
    let classes = ByteClasses::from_sets(&sets);
    let fragments: Vec<Fragment> = compiled
        .iter()
        .enumerate()
        .map(|(i, p)| Fragment::for_rule(&arena, p, RuleId::new(i as u32), false))
        .collect();
    let nfa = Nfa::assemble(&fragments, 0);
    let raw = determinize(&nfa, &classes, 0);
    (classes, raw)
}

fn run(classes: &ByteClasses, dfa: &RawDfa, input: &[u8]) -> DfaState {
    input
        .iter()
        .fold(dfa.start, |s, &b| dfa.next(s, classes.class_of(b)))
}

fn rules(ids: &[u32]) -> Vec<RuleId> {
    ids.iter().map(|&i| RuleId::new(i)).collect()
}

#[test]
fn state_zero_is_dead() {
    let (classes, dfa) = raw_dfa(&["a"]);
    assert!(dfa.accepts[0].is_empty());
    for symbol in 0..classes.symbols() {
        assert_eq!(dfa.next(0, symbol), 0);
    }
    assert_eq!(run(&classes, &dfa, b"b"), 0);
}

#[test]
fn candidate_sets_are_sorted_by_rule() {
    let (classes, dfa) = raw_dfa(&["if", "[a-z]+"]);
    let after_i = run(&classes, &dfa, b"i");
    let after_if = run(&classes, &dfa, b"if");
    let after_ifx = run(&classes, &dfa, b"ifx");
    assert_eq!(dfa.accepts[after_i as usize].to_vec(), rules(&[1]));
    assert_eq!(dfa.accepts[after_if as usize].to_vec(), rules(&[0, 1]));
    assert_eq!(dfa.accepts[after_ifx as usize].to_vec(), rules(&[1]));
}

#[test]
fn end_of_input_symbol_is_unused_without_eol_rules() {
    let (classes, dfa) = raw_dfa(&["[a-z]+", "[0-9]"]);
    for state in 0..dfa.len() as DfaState {
        assert_eq!(dfa.next(state, classes.eoi()), 0);
    }
}

#[test]
fn end_of_line_rule_accepts_after_end_of_input() {
    let (classes, dfa) = raw_dfa(&["x$"]);
    let after_x = run(&classes, &dfa, b"x");
    assert!(dfa.accepts[after_x as usize].is_empty());
    let at_end = dfa.next(after_x, classes.eoi());
    assert_eq!(dfa.accepts[at_end as usize].to_vec(), rules(&[0]));
    let at_newline = run(&classes, &dfa, b"x\n");
    assert_eq!(dfa.accepts[at_newline as usize].to_vec(), rules(&[0]));
}

#[test]
fn bol_entry_differs_only_with_anchored_rules() {
    let (_, plain) = raw_dfa(&["a", "b"]);
    let plain = crate::minimize::minimize(&plain);
    assert_eq!(plain.start(false), plain.start(true));
    let (classes, anchored) = raw_dfa(&["^a", "b"]);
    assert_ne!(anchored.start, anchored.bol_start);
    let a = classes.class_of(b'a');
    assert_eq!(anchored.next(anchored.start, a), 0);
    assert_ne!(anchored.next(anchored.bol_start, a), 0);
}
