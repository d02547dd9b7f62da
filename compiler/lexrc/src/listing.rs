//! Match listing for `lexr scan`: one `rule<TAB>lexeme` line per match.

use std::io::Write;
use std::sync::Arc;

use lexr_automaton::ScannerTables;
use lexr_ir::RuleId;
use lexr_runtime::{ActionContext, Actions, Flow, InputSource, ScanError, Scanner, ScannerConfig};

/// Outcome of a listing run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub matches: usize,
    /// Offsets where no rule matched (error policy only).
    pub unmatched: Vec<u64>,
}

/// Writes each match through the echo sink, so listing lines and echoed
/// bytes stay in input order.
#[derive(Default)]
struct Listing {
    matches: usize,
}

impl Actions for Listing {
    type Token = ScanError;

    fn on_match(&mut self, rule: RuleId, ctx: &mut ActionContext<'_>) -> Flow<ScanError> {
        self.matches += 1;
        let line = format!("{}\t{}\n", rule.index(), ctx.text().escape_debug());
        match ctx.output(line.as_bytes()) {
            Ok(()) => Flow::Continue,
            Err(e) => Flow::Return(e),
        }
    }
}

/// Scan `input` to the end, writing the listing to `out`.
///
/// No-match errors are collected and scanning goes on; any other error
/// stops the run.
pub fn scan_to<S: InputSource, W: Write>(
    tables: Arc<ScannerTables>,
    input: S,
    out: W,
    config: ScannerConfig,
) -> Result<ScanSummary, ScanError> {
    let mut scanner = Scanner::with_config(tables, input, out, config);
    let mut listing = Listing::default();
    let mut unmatched = Vec::new();
    loop {
        match scanner.scan(&mut listing) {
            Ok(None) => break,
            Ok(Some(e)) => return Err(e),
            Err(ScanError::NoMatch { position }) => unmatched.push(position),
            Err(e) => return Err(e),
        }
    }
    scanner.into_echo_sink().flush().map_err(ScanError::Output)?;
    Ok(ScanSummary {
        matches: listing.matches,
        unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile_source;
    use lexr_automaton::CompileOptions;
    use lexr_runtime::{NoMatchPolicy, SliceInput};
    use pretty_assertions::assert_eq;

    const WORDS: &str = "%%\n[a-z]+ ;\n[0-9]+ ;\n\\n ;\n";

    #[test]
    fn listing_interleaves_echo() {
        let c = compile_source(WORDS, &CompileOptions::default()).unwrap();
        let mut out = Vec::new();
        let summary = scan_to(c.tables, SliceInput::from("ab 12\n"), &mut out, ScannerConfig::default()).unwrap();
        assert_eq!(summary.matches, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "0\tab\n 1\t12\n2\t\\n\n");
    }

    #[test]
    fn error_policy_collects_offsets() {
        let c = compile_source(WORDS, &CompileOptions::default()).unwrap();
        let config = ScannerConfig::default().with_no_match(NoMatchPolicy::Error);
        let mut out = Vec::new();
        let summary = scan_to(c.tables, SliceInput::from("a?b!"), &mut out, config).unwrap();
        assert_eq!(
            summary,
            ScanSummary {
                matches: 2,
                unmatched: vec![1, 3],
            }
        );
        assert_eq!(String::from_utf8(out).unwrap(), "0\ta\n0\tb\n");
    }
}
