//! Property tests: compiled tables against brute-force matching.

use lexr_automaton::{compile, CompileOptions, Dfa, ScannerTables};
use lexr_diagnostic::DiagnosticQueue;
use lexr_ir::{CondId, RuleId};
use proptest::prelude::*;

fn tables(source: &str) -> ScannerTables {
    let out = lexr_spec::parse(source);
    assert!(out.errors.is_empty(), "{:#?}", out.errors);
    let mut queue = DiagnosticQueue::new();
    let options = CompileOptions {
        report_unreachable: false,
        ..CompileOptions::default()
    };
    match compile(&out.spec, &options, &mut queue) {
        Ok(compiled) => compiled.tables,
        Err(_) => panic!("compile failed: {:#?}", queue.flush()),
    }
}

fn rules_source(patterns: &[String]) -> String {
    let mut source = String::from("%%\n");
    for p in patterns {
        source.push_str(p);
        source.push_str(" ;\n");
    }
    source
}

fn dfa_longest(tables: &ScannerTables, input: &[u8]) -> Option<(usize, RuleId)> {
    let dfa = tables.automaton(CondId::INITIAL).unwrap();
    let mut state = dfa.start(true);
    let mut best = dfa.candidates(state).first().map(|&r| (0, r));
    for (i, &b) in input.iter().enumerate() {
        state = dfa.next(state, tables.classes().class_of(b));
        if state == Dfa::DEAD {
            break;
        }
        if let Some(&r) = dfa.candidates(state).first() {
            best = Some((i + 1, r));
        }
    }
    best
}

fn brute_longest(words: &[String], input: &str) -> Option<(usize, RuleId)> {
    words
        .iter()
        .enumerate()
        .filter(|(_, w)| input.starts_with(w.as_str()))
        .map(|(i, w)| (w.len(), RuleId::new(i as u32)))
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
}

proptest! {
    #[test]
    fn same_rules_same_tables(
        patterns in prop::collection::vec("[a-c]{1,3}[*+?]?", 1..6)
    ) {
        let source = rules_source(&patterns);
        prop_assert_eq!(tables(&source), tables(&source));
    }

    #[test]
    fn longest_literal_then_first_rule(
        words in prop::collection::vec("[a-d]{1,4}", 1..6),
        input in "[a-d]{0,8}",
    ) {
        let quoted: Vec<String> = words.iter().map(|w| format!("\"{w}\"")).collect();
        let tables = tables(&rules_source(&quoted));
        prop_assert_eq!(dfa_longest(&tables, input.as_bytes()), brute_longest(&words, &input));
    }
}
