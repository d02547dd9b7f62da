use super::*;
use crate::ErrorCode;
use lexr_ir::Span;
use pretty_assertions::assert_eq;

fn render(source: &str, diags: &[Diagnostic]) -> String {
    let mut emitter = TerminalEmitter::new(Vec::new(), "t.l", source, ColorMode::Never, false);
    emitter.emit_all(diags).unwrap_or_default();
    let errors = diags.iter().filter(|d| d.is_error()).count();
    let warnings = diags.len() - errors;
    emitter.emit_summary(errors, warnings).unwrap_or_default();
    String::from_utf8(emitter.into_inner()).unwrap_or_default()
}

#[test]
fn renders_snippet_with_caret() {
    let source = "abc\n{digit}+ x\n";
    let diag = Diagnostic::error(ErrorCode::L1002)
        .with_message("undefined definition `digit`")
        .with_label(Span::new(4, 11), "referenced here");

    let expected = "\
error[L1002]: undefined definition `digit`
 --> t.l:2:1
  |
2 | {digit}+ x
  | ^^^^^^^ referenced here
error: could not compile `t.l` due to 1 error
";
    assert_eq!(render(source, &[diag]), expected);
}

#[test]
fn renders_notes_and_help() {
    let source = "x\n";
    let diag = Diagnostic::warning(ErrorCode::W3001)
        .with_message("rule #1 can never be matched")
        .with_label(Span::new(0, 1), "shadowed")
        .with_note("rule #0 matches the same text first")
        .with_suggestion("move this rule above rule #0");

    let out = render(source, &[diag]);
    assert!(out.starts_with("warning[W3001]: rule #1 can never be matched\n"));
    assert!(out.contains("  = note: rule #0 matches the same text first\n"));
    assert!(out.contains("  = help: move this rule above rule #0\n"));
    assert!(out.ends_with("warning: 1 warning emitted\n"));
}

#[test]
fn color_mode_resolution() {
    assert!(ColorMode::Always.should_use_colors(false));
    assert!(!ColorMode::Never.should_use_colors(true));
    assert!(ColorMode::Auto.should_use_colors(true));
    assert!(!ColorMode::Auto.should_use_colors(false));
}
