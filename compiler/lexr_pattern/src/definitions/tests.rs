use super::*;
use crate::error::SyntaxReason;
use pretty_assertions::assert_eq;

fn table(defs: &[(&str, &str)]) -> DefinitionTable {
    let mut table = DefinitionTable::new();
    let mut offset = 0u32;
    for &(name, text) in defs {
        let len = u32::try_from(text.len()).unwrap_or(0);
        table
            .define(name, text, Span::new(offset, offset + len))
            .unwrap_or_else(|e| panic!("{e:?}"));
        offset += len + 1;
    }
    table
}

#[test]
fn duplicate_definition_points_at_both() {
    let mut defs = DefinitionTable::new();
    assert!(defs.define("digit", "[0-9]", Span::new(6, 11)).is_ok());
    let err = defs.define("digit", "[0-7]", Span::new(18, 23));
    assert_eq!(
        err,
        Err(DefinitionError {
            span: Span::new(18, 23),
            kind: DefinitionErrorKind::Duplicate {
                name: "digit".to_owned(),
                first: Span::new(6, 11),
            },
        })
    );
    assert_eq!(defs.text("digit"), Some("[0-9]"));
}

#[test]
fn nested_references_expand() {
    let mut defs = table(&[("digit", "[0-9]"), ("number", "{digit}+(\\.{digit}+)?")]);
    let mut arena = PatternArena::new();
    let node = defs
        .resolve("number", Span::DUMMY, &mut arena)
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(arena.display(node), "[0-9]+(\\.[0-9]+)?");
}

#[test]
fn resolution_is_memoized_and_shared() {
    let mut defs = table(&[("word", "[a-z]+")]);
    let mut arena = PatternArena::new();
    let first = defs.resolve("word", Span::DUMMY, &mut arena);
    let nodes = arena.len();
    let second = defs.resolve("word", Span::DUMMY, &mut arena);
    assert_eq!(first, second);
    assert_eq!(arena.len(), nodes);
}

#[test]
fn direct_cycle() {
    let mut defs = table(&[("a", "x{a}")]);
    let mut arena = PatternArena::new();
    let Err(CompileError::Definition(err)) = defs.resolve("a", Span::DUMMY, &mut arena) else {
        panic!("expected a cycle");
    };
    assert_eq!(
        err.kind,
        DefinitionErrorKind::Cyclic {
            path: vec!["a".to_owned(), "a".to_owned()]
        }
    );
    assert_eq!(err.span, Span::new(1, 4));
}

#[test]
fn indirect_cycle_reports_path() {
    let mut defs = table(&[("a", "{b}"), ("b", "{c}y"), ("c", "{a}|z")]);
    let mut arena = PatternArena::new();
    let Err(CompileError::Definition(err)) = defs.resolve("a", Span::DUMMY, &mut arena) else {
        panic!("expected a cycle");
    };
    let DefinitionErrorKind::Cyclic { path } = &err.kind else {
        panic!("expected a cycle, got {:?}", err.kind);
    };
    assert_eq!(path, &["a", "b", "c", "a"]);
    assert!(err.to_diagnostic().notes[0].contains("a -> b -> c -> a"));
}

#[test]
fn failures_are_memoized() {
    let mut defs = table(&[("a", "{missing}"), ("b", "{a}{a}")]);
    let mut arena = PatternArena::new();
    let direct = defs.resolve("a", Span::DUMMY, &mut arena);
    let via_b = defs.resolve("b", Span::DUMMY, &mut arena);
    assert!(direct.is_err());
    assert_eq!(direct, via_b);
}

#[test]
fn slash_and_anchors_in_definitions() {
    let mut defs = table(&[("line", "^x$"), ("bad", "a/b")]);
    let mut arena = PatternArena::new();
    let line = defs
        .resolve("line", Span::DUMMY, &mut arena)
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(arena.display(line), "\\^x\\$");

    let Err(CompileError::Pattern(err)) = defs.resolve("bad", Span::DUMMY, &mut arena) else {
        panic!("expected a syntax error");
    };
    assert_eq!(err.reason, SyntaxReason::MisplacedTrailingContext);
}

#[test]
fn resolve_all_reports_each_failure_once() {
    let mut defs = table(&[
        ("ok", "[a-z]"),
        ("a", "{b}"),
        ("b", "{a}"),
        ("typo", "{nope}"),
    ]);
    let mut arena = PatternArena::new();
    let errors = defs.resolve_all(&mut arena);
    let codes: Vec<_> = errors.iter().map(CompileError::code).collect();
    assert_eq!(
        codes,
        vec![lexr_diagnostic::ErrorCode::L1003, lexr_diagnostic::ErrorCode::L1002]
    );
}
