//! The `scan` command: run a specification over an input and list the
//! matches.

use std::fs::File;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use lexr_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use lexr_diagnostic::Diagnostic;
use lexr_runtime::{InputSource, ReaderInput, ScanError};

use super::{load, CliOptions};
use crate::listing::scan_to;

/// Scan `input` (a file, or stdin for `None` and `-`) with the tables of
/// `spec_path`. Each match prints `rule<TAB>lexeme`; unmatched bytes follow
/// `--policy`.
pub fn scan_file(spec_path: &str, input: Option<&str>, options: &CliOptions) -> ExitCode {
    let (_, compilation) = match load(spec_path, options) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let input_name = input.unwrap_or("-");
    let source: Box<dyn InputSource> = if input_name == "-" {
        Box::new(ReaderInput::new(io::stdin().lock()))
    } else {
        match File::open(input_name) {
            Ok(file) => Box::new(ReaderInput::new(io::BufReader::new(file))),
            Err(e) => {
                eprintln!("error: cannot open '{input_name}': {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    let stdout = io::stdout().lock();
    match scan_to(compilation.tables, source, stdout, options.scanner_config()) {
        Ok(summary) if summary.unmatched.is_empty() => {
            if options.verbose {
                eprintln!("{} matches", summary.matches);
            }
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            let errors: Vec<Diagnostic> = summary
                .unmatched
                .iter()
                .map(|&position| ScanError::NoMatch { position }.to_diagnostic())
                .collect();
            emit(input_name, &errors);
            ExitCode::FAILURE
        }
        Err(e) => {
            emit(input_name, &[e.to_diagnostic()]);
            ExitCode::FAILURE
        }
    }
}

/// Runtime diagnostics carry no spans; only the header lines are shown.
fn emit(input_name: &str, diagnostics: &[Diagnostic]) {
    let stderr = io::stderr();
    let is_tty = stderr.is_terminal();
    let mut emitter = TerminalEmitter::new(stderr.lock(), input_name, "", ColorMode::Auto, is_tty);
    if let Err(e) = emitter.emit_all(diagnostics) {
        tracing::debug!(error = %e, "could not write diagnostics");
    }
}
