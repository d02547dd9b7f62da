//! Human-readable views of compiled tables.

use std::fmt::Write;

use lexr_automaton::{Dfa, DfaState, ScannerTables, TrailingSplit};
use lexr_ir::ByteSet;

use crate::compile::Compilation;

/// One-line size summary.
pub fn render_summary(c: &Compilation) -> String {
    format!(
        "{} rules, {} conditions, {} dfa states, {} byte classes",
        c.tables.rules().len(),
        c.tables.conditions().len(),
        c.stats.dfa_states,
        c.stats.classes,
    )
}

/// Full dump: byte classes, every condition's states, and the rules.
pub fn render_tables(tables: &ScannerTables) -> String {
    let mut out = String::new();
    let classes = tables.classes();
    let _ = writeln!(out, "byte classes: {}", classes.len());
    for class in 0..classes.len() {
        let _ = writeln!(out, "  {class:>3}: {}", format_set(&classes.members(class)));
    }

    for (id, dfa) in tables.automata() {
        let Some(cond) = tables.condition(id) else {
            continue;
        };
        let _ = writeln!(
            out,
            "\ncondition {} ({}): {} states, start {}, bol start {}",
            cond.name,
            cond.kind,
            dfa.len(),
            dfa.start(false),
            dfa.start(true),
        );
        for state in 1..dfa.len() as DfaState {
            write_state(&mut out, tables, dfa, state);
        }
    }

    let _ = writeln!(out, "\nrules:");
    for rule in tables.rules() {
        let _ = write!(out, "  {:<4} {}", rule.id.to_string(), rule.pattern);
        match &rule.split {
            TrailingSplit::None => {}
            TrailingSplit::HeadLen(n) => {
                let _ = write!(out, "  (trailing context, head {n})");
            }
            TrailingSplit::TailLen(n) => {
                let _ = write!(out, "  (trailing context, tail {n})");
            }
            TrailingSplit::EndOfLine => {
                let _ = write!(out, "  (end of line)");
            }
            TrailingSplit::Variable { .. } => {
                let _ = write!(out, "  (trailing context, variable)");
            }
        }
        let _ = writeln!(out);
    }
    out
}

fn write_state(out: &mut String, tables: &ScannerTables, dfa: &Dfa, state: DfaState) {
    let classes = tables.classes();
    let _ = write!(out, "  state {state}");
    let candidates = dfa.candidates(state);
    if !candidates.is_empty() {
        let ids: Vec<String> = candidates.iter().map(ToString::to_string).collect();
        let _ = write!(out, "  accepts {}", ids.join(" "));
    }
    let _ = writeln!(out);

    // Group classes by target so each line shows one destination.
    let mut targets: Vec<(DfaState, ByteSet)> = Vec::new();
    for class in 0..classes.len() {
        let target = dfa.next(state, class);
        if target == Dfa::DEAD {
            continue;
        }
        let members = classes.members(class);
        match targets.iter_mut().find(|(t, _)| *t == target) {
            Some((_, set)) => *set = set.union(&members),
            None => targets.push((target, members)),
        }
    }
    targets.sort_by_key(|&(t, _)| t);
    for (target, set) in targets {
        let _ = writeln!(out, "    {} -> {target}", format_set(&set));
    }
    let end = dfa.next(state, classes.eoi());
    if end != Dfa::DEAD {
        let _ = writeln!(out, "    <<EOF>> -> {end}");
    }
}

/// Bracket notation: `[a-z_]`, with escapes for anything not printable.
fn format_set(set: &ByteSet) -> String {
    let mut out = String::from("[");
    for (lo, hi) in set.ranges() {
        push_byte(&mut out, lo);
        if hi > lo {
            if hi > lo + 1 {
                out.push('-');
            }
            push_byte(&mut out, hi);
        }
    }
    out.push(']');
    out
}

fn push_byte(out: &mut String, byte: u8) {
    match byte {
        b'\n' => out.push_str("\\n"),
        b'\t' => out.push_str("\\t"),
        b'\\' | b']' | b'[' | b'-' | b'^' => {
            out.push('\\');
            out.push(char::from(byte));
        }
        b' '..=b'~' => out.push(char::from(byte)),
        _ => {
            let _ = write!(out, "\\x{byte:02x}");
        }
    }
}
