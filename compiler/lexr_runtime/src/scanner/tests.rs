use std::collections::VecDeque;

use super::*;
use crate::input::{ChainInput, SliceInput};
use lexr_automaton::CompileOptions;
use lexr_diagnostic::DiagnosticQueue;
use pretty_assertions::assert_eq;

fn tables(source: &str) -> Arc<ScannerTables> {
    let out = lexr_spec::parse(source);
    assert!(out.errors.is_empty(), "unexpected errors: {:#?}", out.errors);
    let mut queue = DiagnosticQueue::new();
    let compiled = lexr_automaton::compile(&out.spec, &CompileOptions::default(), &mut queue)
        .unwrap_or_else(|_| panic!("compile failed: {:#?}", queue.flush()));
    Arc::new(compiled.tables)
}

/// Returns every match as (rule index, lexeme).
struct Record;

impl Actions for Record {
    type Token = (usize, String);

    fn on_match(&mut self, rule: RuleId, ctx: &mut ActionContext<'_>) -> Flow<Self::Token> {
        Flow::Return((rule.index(), ctx.text().into_owned()))
    }
}

fn tok(rule: usize, text: &str) -> (usize, String) {
    (rule, text.to_owned())
}

fn tokens(source: &str, input: &str) -> Vec<(usize, String)> {
    let mut scanner = Scanner::new(tables(source), SliceInput::from(input));
    scanner.scan_all(&mut Record).unwrap()
}

#[test]
fn longest_match_then_first_rule() {
    let source = "%%\n\"if\" ;\n[a-z]+ ;\n[0-9]+ ;\n[ ] ;\n";
    assert_eq!(
        tokens(source, "if ifx 42"),
        vec![
            tok(0, "if"),
            tok(3, " "),
            tok(1, "ifx"),
            tok(3, " "),
            tok(2, "42"),
        ]
    );
}

#[test]
fn alternation_with_escaped_newline() {
    let source = "%%\na|b\\nc ;\n\\n ;\n";
    assert_eq!(
        tokens(source, "ab\nc\n"),
        vec![tok(0, "a"), tok(0, "b\nc"), tok(1, "\n")]
    );
}

#[test]
fn continued_rules_share_one_action() {
    let t = tables("%%\n\"x\" |\n\"y\" ;\n\"z\" ;\n");
    let mut calls = Vec::new();
    let mut actions = |rule: RuleId, ctx: &mut ActionContext<'_>| -> Flow<()> {
        calls.push((rule.index(), ctx.action(), ctx.text().into_owned()));
        Flow::Continue
    };
    let mut scanner = Scanner::new(t, SliceInput::from("xyz"));
    assert_eq!(scanner.scan(&mut actions).unwrap(), None);

    let rules: Vec<(usize, &str)> = calls.iter().map(|(r, _, text)| (*r, text.as_str())).collect();
    assert_eq!(rules, vec![(0, "x"), (1, "y"), (2, "z")]);
    assert_eq!(calls[0].1, calls[1].1);
    assert_ne!(calls[1].1, calls[2].1);
}

#[test]
fn unmatched_bytes_are_echoed() {
    let t = tables("%%\n[0-9]+ ;\n");
    let mut scanner = Scanner::with_config(t, SliceInput::from("a1b22"), Vec::new(), ScannerConfig::default());
    assert_eq!(
        scanner.scan_all(&mut Record).unwrap(),
        vec![tok(0, "1"), tok(0, "22")]
    );
    assert_eq!(scanner.into_echo_sink(), b"ab");
}

#[test]
fn no_match_error_consumes_the_byte() {
    let t = tables("%%\n[0-9]+ ;\n");
    let config = ScannerConfig::default().with_no_match(NoMatchPolicy::Error);
    let mut scanner = Scanner::with_config(t, SliceInput::from("1x2"), io::sink(), config);
    assert_eq!(scanner.scan(&mut Record).unwrap(), Some(tok(0, "1")));
    let err = scanner.scan(&mut Record).unwrap_err();
    assert!(matches!(err, ScanError::NoMatch { position: 1 }), "{err:?}");
    assert!(err.is_resumable());
    assert_eq!(scanner.scan(&mut Record).unwrap(), Some(tok(0, "2")));
    assert_eq!(scanner.scan(&mut Record).unwrap(), None);
}

/// Records `she` and `he` and rejects both, so overlapping words are all
/// seen; everything else is skipped.
#[derive(Default)]
struct Overlaps {
    seen: Vec<String>,
}

impl Actions for Overlaps {
    type Token = ();

    fn on_match(&mut self, rule: RuleId, ctx: &mut ActionContext<'_>) -> Flow<()> {
        if rule.index() < 2 {
            self.seen.push(ctx.text().into_owned());
            ctx.reject();
        }
        Flow::Continue
    }
}

#[test]
fn reject_moves_to_the_next_candidate() {
    let t = tables("%%\nshe ;\nhe ;\n.|\\n ;\n");
    let mut actions = Overlaps::default();
    let mut scanner = Scanner::new(t, SliceInput::from("she\nhe"));
    assert_eq!(scanner.scan(&mut actions).unwrap(), None);
    assert_eq!(actions.seen, vec!["she", "he", "he"]);
}

#[test]
fn reject_with_trailing_context_tries_the_next_rule() {
    let t = tables("%%\n[a-z]+/[1-9]+ ;\n[a-z]+ ;\n");
    let mut seen = Vec::new();
    let mut actions = |rule: RuleId, ctx: &mut ActionContext<'_>| {
        seen.push(tok(rule.index(), &ctx.text()));
        if rule.index() == 0 && ctx.lexeme() == b"test" {
            ctx.reject();
            return Flow::Continue;
        }
        Flow::Return(tok(rule.index(), &ctx.text()))
    };
    let mut scanner = Scanner::with_config(t, SliceInput::from("test1"), Vec::new(), ScannerConfig::default());
    assert_eq!(scanner.scan_all(&mut actions).unwrap(), vec![tok(1, "test")]);
    assert_eq!(seen, vec![tok(0, "test"), tok(1, "test")]);
    assert_eq!(scanner.into_echo_sink(), b"1");
}

#[test]
fn reject_falls_back_to_shorter_matches() {
    let t = tables("%%\na+ ;\n");
    let mut rejected_once = false;
    let mut actions = |_: RuleId, ctx: &mut ActionContext<'_>| {
        if ctx.len() == 3 && !rejected_once {
            rejected_once = true;
            ctx.reject();
            return Flow::Return(String::new());
        }
        Flow::Return(ctx.text().into_owned())
    };
    let mut scanner = Scanner::new(t, SliceInput::from("aaa"));
    assert_eq!(scanner.scan_all(&mut actions).unwrap(), vec!["aa", "a"]);
}

#[test]
fn rejecting_everything_uses_the_fallback() {
    let t = tables("%%\n[a-z]+ ;\n");
    let mut actions = |_: RuleId, ctx: &mut ActionContext<'_>| -> Flow<()> {
        ctx.reject();
        Flow::Continue
    };
    let mut scanner = Scanner::with_config(t, SliceInput::from("ab"), Vec::new(), ScannerConfig::default());
    assert_eq!(scanner.scan(&mut actions).unwrap(), None);
    assert_eq!(scanner.into_echo_sink(), b"ab");
}

/// Quoted strings through an exclusive condition.
struct Strings;

impl Actions for Strings {
    type Token = (usize, String, String);

    fn on_match(&mut self, rule: RuleId, ctx: &mut ActionContext<'_>) -> Flow<Self::Token> {
        match rule.index() {
            0 => ctx.begin_named("STR").unwrap(),
            2 => ctx.begin(CondId::INITIAL).unwrap(),
            _ => {}
        }
        Flow::Return((
            rule.index(),
            ctx.text().into_owned(),
            ctx.condition_name().to_owned(),
        ))
    }
}

#[test]
fn start_conditions_switch_from_actions() {
    let t = tables("%x STR\n%%\n\\\" ;\n<STR>[^\"]+ ;\n<STR>\\\" ;\n[a-z]+ ;\n");
    let mut scanner = Scanner::new(t, SliceInput::from("ab\"c d\"e"));
    let got = scanner.scan_all(&mut Strings).unwrap();
    let expected: Vec<(usize, String, String)> = [
        (3, "ab", "INITIAL"),
        (0, "\"", "STR"),
        (1, "c d", "STR"),
        (2, "\"", "INITIAL"),
        (3, "e", "INITIAL"),
    ]
    .into_iter()
    .map(|(r, t, c)| (r, t.to_owned(), c.to_owned()))
    .collect();
    assert_eq!(got, expected);
    assert_eq!(scanner.condition(), CondId::INITIAL);
}

#[test]
fn begin_from_outside_and_unknown_conditions() {
    let t = tables("%x STR\n%%\n<STR>[a-z]+ ;\n[a-z] ;\n");
    let mut scanner = Scanner::new(t, SliceInput::from("abc"));
    assert!(matches!(
        scanner.begin_named("NOPE"),
        Err(ScanError::UnknownCondition(name)) if name == "NOPE"
    ));
    assert!(scanner.begin(CondId::new(7)).is_err());
    scanner.begin_named("STR").unwrap();
    assert_eq!(scanner.scan(&mut Record).unwrap(), Some(tok(0, "abc")));

    let mut actions = |_: RuleId, ctx: &mut ActionContext<'_>| Flow::Return(ctx.begin_named("NOPE").is_err());
    let mut scanner = Scanner::new(tables("%%\nx ;\n"), SliceInput::from("x"));
    assert_eq!(scanner.scan(&mut actions).unwrap(), Some(true));
}

#[test]
fn line_anchors() {
    let source = "%%\n^# ;\n# ;\n[a-z]+$ ;\n[a-z]+ ;\n\\n ;\n[ ] ;\n";
    assert_eq!(
        tokens(source, "#a #b\nc #\nd"),
        vec![
            tok(0, "#"),
            tok(3, "a"),
            tok(5, " "),
            tok(1, "#"),
            tok(2, "b"),
            tok(4, "\n"),
            tok(3, "c"),
            tok(5, " "),
            tok(1, "#"),
            tok(4, "\n"),
            tok(2, "d"),
        ]
    );
}

#[test]
fn trailing_context_is_not_consumed() {
    let source = "%%\n[a-z]+/[0-9] ;\n[a-z]+ ;\n[0-9]+ ;\n";
    assert_eq!(
        tokens(source, "ab1cd"),
        vec![tok(0, "ab"), tok(2, "1"), tok(1, "cd")]
    );

    let source = "%%\na+/b+ ;\nb+ ;\n";
    assert_eq!(tokens(source, "aaabb"), vec![tok(0, "aaa"), tok(1, "bb")]);
}

#[test]
fn array_mode_limits_the_lexeme() {
    let source = "%array\n%option yylmax=4\n%%\n[a-z]+ ;\n[ ] ;\n";
    let mut scanner = Scanner::new(tables(source), SliceInput::from("abc abcdef"));
    assert_eq!(scanner.scan(&mut Record).unwrap(), Some(tok(0, "abc")));
    assert_eq!(scanner.scan(&mut Record).unwrap(), Some(tok(1, " ")));
    assert!(matches!(
        scanner.scan(&mut Record),
        Err(ScanError::LexemeTooLong {
            len: 6,
            capacity: 4
        })
    ));

    let config = ScannerConfig::default().with_lexeme_mode(LexemeMode::Pointer);
    let mut scanner = Scanner::with_config(tables(source), SliceInput::from("abc abcdef"), io::sink(), config);
    assert_eq!(
        scanner.scan_all(&mut Record).unwrap(),
        vec![tok(0, "abc"), tok(1, " "), tok(0, "abcdef")]
    );
}

#[test]
fn huge_yylmax_does_not_preallocate() {
    let source = "%array\n%option yylmax=18446744073709551615\n%%\n[a-z]+ ;\n";
    assert_eq!(tokens(source, "abc"), vec![tok(0, "abc")]);
}

#[test]
fn less_returns_text_to_the_input() {
    let t = tables("%%\n[a-z]+ ;\n");
    let mut actions = |_: RuleId, ctx: &mut ActionContext<'_>| {
        if ctx.len() > 2 {
            ctx.less(2);
        }
        Flow::Return(ctx.text().into_owned())
    };
    let mut scanner = Scanner::new(t, SliceInput::from("abcde"));
    assert_eq!(scanner.scan_all(&mut actions).unwrap(), vec!["ab", "cd", "e"]);
}

#[test]
fn zero_length_match_still_advances() {
    let t = tables("%%\na* ;\n");
    let mut scanner = Scanner::with_config(t, SliceInput::from("ab"), Vec::new(), ScannerConfig::default());
    assert_eq!(
        scanner.scan_all(&mut Record).unwrap(),
        vec![tok(0, "a"), tok(0, "")]
    );
    assert_eq!(scanner.position(), 2);
    assert_eq!(scanner.into_echo_sink(), b"b");
}

/// Returns (line, lexeme) for everything but blanks.
struct Lines;

impl Actions for Lines {
    type Token = (usize, String);

    fn on_match(&mut self, rule: RuleId, ctx: &mut ActionContext<'_>) -> Flow<Self::Token> {
        if rule.index() == 2 {
            return Flow::Continue;
        }
        Flow::Return((ctx.line(), ctx.text().into_owned()))
    }
}

#[test]
fn line_counting() {
    let rules = "%%\n\\\"[^\"]*\\\" ;\n[a-z]+ ;\n[ \\n] ;\n";
    let input = "a \"x\ny\" b\nc";

    let mut scanner = Scanner::new(tables(&format!("%option yylineno\n{rules}")), SliceInput::from(input));
    assert_eq!(
        scanner.scan_all(&mut Lines).unwrap(),
        vec![
            (1, "a".to_owned()),
            (2, "\"x\ny\"".to_owned()),
            (2, "b".to_owned()),
            (3, "c".to_owned()),
        ]
    );
    assert_eq!(scanner.line(), 3);

    let mut scanner = Scanner::new(tables(rules), SliceInput::from(input));
    let lines: Vec<usize> = scanner.scan_all(&mut Lines).unwrap().into_iter().map(|(l, _)| l).collect();
    assert_eq!(lines, vec![1, 1, 1, 1]);

    let config = ScannerConfig::default().with_line_counting(true);
    let mut scanner = Scanner::with_config(tables(rules), SliceInput::from(input), io::sink(), config);
    scanner.scan_all(&mut Lines).unwrap();
    assert_eq!(scanner.line(), 3);
}

#[test]
fn chained_sources_never_share_a_token() {
    let t = tables("%%\n^a ;\na ;\n[a-z]+ ;\n");
    let input = ChainInput::new([SliceInput::from("xa"), SliceInput::from("a"), SliceInput::from("bc")]);
    let mut scanner = Scanner::new(t, input);
    assert_eq!(
        scanner.scan_all(&mut Record).unwrap(),
        vec![tok(2, "xa"), tok(0, "a"), tok(2, "bc")]
    );
    // finished scanners stay finished
    assert_eq!(scanner.scan(&mut Record).unwrap(), None);
}

#[test]
fn restart_scans_a_new_input() {
    let t = tables("%%\n[a-z]+ ;\n");
    let mut scanner = Scanner::new(t, SliceInput::from("ab"));
    assert_eq!(scanner.scan_all(&mut Record).unwrap(), vec![tok(0, "ab")]);
    scanner.restart(SliceInput::from("cd"));
    assert_eq!(scanner.scan_all(&mut Record).unwrap(), vec![tok(0, "cd")]);
    assert_eq!(scanner.position(), 2);
}

enum Step {
    Data(&'static [u8]),
    Block,
}

/// Replays data and would-block answers in order.
struct Scripted(VecDeque<Step>);

impl InputSource for Scripted {
    fn refill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.pop_front() {
            Some(Step::Data(data)) => {
                buf[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
            Some(Step::Block) => Err(io::ErrorKind::WouldBlock.into()),
            None => Ok(0),
        }
    }
}

#[test]
fn would_block_retries_the_match() {
    let t = tables("%%\n[a-z]+ ;\n[ ] ;\n");
    let input = Scripted(VecDeque::from([
        Step::Data(b"ab"),
        Step::Block,
        Step::Data(b"c "),
        Step::Data(b"d"),
    ]));
    let mut scanner = Scanner::new(t, input);
    assert!(matches!(scanner.scan(&mut Record), Err(ScanError::WouldBlock)));
    assert_eq!(scanner.position(), 0);
    assert_eq!(scanner.scan(&mut Record).unwrap(), Some(tok(0, "abc")));
    assert_eq!(scanner.scan(&mut Record).unwrap(), Some(tok(1, " ")));
    assert_eq!(scanner.scan(&mut Record).unwrap(), Some(tok(0, "d")));
    assert_eq!(scanner.scan(&mut Record).unwrap(), None);
}

#[test]
fn read_errors_abort() {
    struct Failing;
    impl InputSource for Failing {
        fn refill(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("gone"))
        }
    }
    let mut scanner = Scanner::new(tables("%%\nx ;\n"), Failing);
    let err = scanner.scan(&mut Record).unwrap_err();
    assert!(matches!(err, ScanError::Aborted(_)));
    assert!(!err.is_resumable());
}

#[test]
fn actions_echo_and_output() {
    let t = tables("%%\n[a-z]+ ;\n[ ] ;\n");
    let mut actions = |rule: RuleId, ctx: &mut ActionContext<'_>| -> Flow<()> {
        ctx.echo().unwrap();
        if rule.index() == 0 {
            ctx.output(b"|").unwrap();
        }
        Flow::Continue
    };
    let mut scanner = Scanner::with_config(t, SliceInput::from("ab cd"), Vec::new(), ScannerConfig::default());
    assert_eq!(scanner.scan(&mut actions).unwrap(), None);
    assert_eq!(scanner.into_echo_sink(), b"ab| cd|");
}

#[test]
fn candidates_rank_longest_then_lowest_rule() {
    let t = tables("%%\n[a-z]+ ;\nab ;\na ;\n");
    let dfa = t.automaton(CondId::INITIAL).unwrap();
    let classes = t.classes();
    let mut candidates = Candidates::default();
    let mut state = dfa.start(false);
    for (i, &b) in b"ab".iter().enumerate() {
        state = dfa.next(state, classes.class_of(b));
        candidates.push(Accept {
            len: i + 1,
            state,
            at_end: false,
        });
    }
    let ranked: Vec<(usize, usize)> = std::iter::from_fn(|| candidates.next(dfa))
        .map(|c| (c.len, c.rule.index()))
        .collect();
    assert_eq!(ranked, vec![(2, 0), (2, 1), (1, 0), (1, 2)]);
}
