//! Specification text to match listing, through the public driver API.

use std::process::Command;

use lexr_automaton::CompileOptions;
use lexr_diagnostic::ErrorCode;
use lexr_runtime::{ChainInput, ScannerConfig, SliceInput};
use lexrc::{compile_source, render_summary, scan_to};
use pretty_assertions::assert_eq;

const C_SUBSET: &str = r#"%{
/* token numbers live in the caller */
%}
D       [0-9]
L       [a-zA-Z_]
%x COMMENT
%%
"/*"                    BEGIN(COMMENT);
<COMMENT>"*/"           BEGIN(INITIAL);
<COMMENT>.|\n           ;
"if"|"else"|"while"     return KEYWORD;
{L}({L}|{D})*           return IDENT;
{D}+                    return NUMBER;
"=="|"="|"<"|"+"|";"    return OP;
[ \t\n]+                ;
%%
int yywrap(void) { return 1; }
"#;

fn listing(source: &str, input: &str, options: &CompileOptions) -> String {
    let c = compile_source(source, options).unwrap();
    let mut out = Vec::new();
    scan_to(c.tables, SliceInput::from(input), &mut out, ScannerConfig::default()).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn c_subset_listing() {
    let got = listing(
        C_SUBSET,
        "if (x1 == 42) /* done */ y = x1;",
        &CompileOptions::default(),
    );
    // Rules: 0 "/*", 1-2 comment body, 3 keywords, 4 identifiers,
    // 5 numbers, 6 operators, 7 blanks. The listing never runs
    // BEGIN(COMMENT), so the comment is scanned in INITIAL and unmatched
    // bytes are echoed in place.
    assert_eq!(
        got,
        "3\tif\n\
         7\t \n\
         (4\tx1\n\
         7\t \n\
         6\t==\n\
         7\t \n\
         5\t42\n\
         )7\t \n\
         0\t/*\n\
         7\t \n\
         4\tdone\n\
         7\t \n\
         */7\t \n\
         4\ty\n\
         7\t \n\
         6\t=\n\
         7\t \n\
         4\tx1\n\
         6\t;\n"
    );
}

#[test]
fn case_insensitive_keywords() {
    let source = "%%\nselect ;\n[A-Za-z]+ ;\n";
    assert_eq!(
        listing(source, "SELECT", &CompileOptions::default()),
        "1\tSELECT\n"
    );
    let folded = CompileOptions {
        case_insensitive: true,
        ..CompileOptions::default()
    };
    assert_eq!(listing(source, "SELECT", &folded), "0\tSELECT\n");
}

#[test]
fn chained_files_never_share_a_token() {
    let c = compile_source(C_SUBSET, &CompileOptions::default()).unwrap();
    let input = ChainInput::new([
        SliceInput::from("int x"),
        SliceInput::from("y 1"),
        SliceInput::from("2"),
    ]);
    let mut out = Vec::new();
    let summary = scan_to(c.tables, input, &mut out, ScannerConfig::default()).unwrap();
    assert_eq!(summary.matches, 7);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "4\tint\n7\t \n4\tx\n4\ty\n7\t \n5\t1\n5\t2\n"
    );
}

#[test]
fn summary_and_failures() {
    let c = compile_source(C_SUBSET, &CompileOptions::default()).unwrap();
    assert!(c.warnings.is_empty(), "{:#?}", c.warnings);
    assert!(render_summary(&c).starts_with("8 rules, 2 conditions, "));

    let errors = compile_source("%%\n<NOPE>x ;\n", &CompileOptions::default()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::L0005);
}

#[test]
fn explain_command() {
    let out = Command::new(env!("CARGO_BIN_EXE_lexr"))
        .args(["explain", "l2001"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.starts_with("L2001 (error): "), "{text}");

    let out = Command::new(env!("CARGO_BIN_EXE_lexr"))
        .args(["explain", "X9"])
        .output()
        .unwrap();
    assert!(!out.status.success());
}
