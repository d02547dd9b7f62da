//! Command handlers for the `lexr` binary.
//!
//! Each submodule implements one command. Shared helpers (reading files,
//! option parsing, rendering diagnostics) live here.

use std::io::IsTerminal;
use std::process::ExitCode;

use lexr_automaton::CompileOptions;
use lexr_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use lexr_diagnostic::Diagnostic;
use lexr_runtime::{NoMatchPolicy, ScannerConfig};

use crate::compile::{compile_source, Compilation};

mod check;
mod explain;
mod scan;
mod tables;

pub use check::check_file;
pub use explain::explain_error;
pub use scan::scan_file;
pub use tables::show_tables;

/// Flags shared by every command, plus positional arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    /// `-i`: case-insensitive patterns.
    pub case_insensitive: bool,
    /// `-v`: print table statistics.
    pub verbose: bool,
    /// `-n`: no summary line.
    pub quiet: bool,
    /// `-t`: dump the full tables.
    pub dump: bool,
    /// `--policy=echo|error`.
    pub policy: NoMatchPolicy,
    pub positional: Vec<String>,
}

impl CliOptions {
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            case_insensitive: self.case_insensitive,
            ..CompileOptions::default()
        }
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig::default().with_no_match(self.policy)
    }
}

/// Parse the arguments after the command name.
pub fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    for arg in args {
        if let Some(policy) = arg.strip_prefix("--policy=") {
            options.policy = match policy {
                "echo" => NoMatchPolicy::Echo,
                "error" => NoMatchPolicy::Error,
                other => return Err(format!("unknown policy '{other}' (expected echo or error)")),
            };
            continue;
        }
        match arg.as_str() {
            "-i" | "--case-insensitive" => options.case_insensitive = true,
            "-v" | "--verbose" => options.verbose = true,
            "-n" => options.quiet = true,
            "-t" => options.dump = true,
            "-" => options.positional.push(arg.clone()),
            other if other.starts_with('-') => return Err(format!("unknown option '{other}'")),
            _ => options.positional.push(arg.clone()),
        }
    }
    Ok(options)
}

pub(super) fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
        std::io::ErrorKind::PermissionDenied => format!("permission denied reading '{path}'"),
        std::io::ErrorKind::InvalidData => format!("'{path}' contains invalid UTF-8 data"),
        _ => format!("error reading '{path}': {e}"),
    })
}

/// Render diagnostics for `path` on stderr, with a summary line.
pub(super) fn report(path: &str, source: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    let stderr = std::io::stderr();
    let is_tty = stderr.is_terminal();
    let mut emitter = TerminalEmitter::new(stderr.lock(), path, source, ColorMode::Auto, is_tty);
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;
    let result = emitter
        .emit_all(diagnostics)
        .and_then(|()| emitter.emit_summary(errors, warnings));
    if let Err(e) = result {
        tracing::debug!(error = %e, "could not write diagnostics");
    }
}

/// Read and compile `path`, reporting every diagnostic.
pub(super) fn load(path: &str, options: &CliOptions) -> Result<(String, Compilation), ExitCode> {
    let source = read_file(path).map_err(|msg| {
        eprintln!("error: {msg}");
        ExitCode::FAILURE
    })?;
    match compile_source(&source, &options.compile_options()) {
        Ok(compilation) => {
            report(path, &source, &compilation.warnings);
            Ok((source, compilation))
        }
        Err(diagnostics) => {
            report(path, &source, &diagnostics);
            Err(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn flags_and_positionals() {
        let options = parse_options(&args(&["-i", "scanner.l", "-v", "--policy=error", "-"])).unwrap();
        assert_eq!(
            options,
            CliOptions {
                case_insensitive: true,
                verbose: true,
                policy: NoMatchPolicy::Error,
                positional: args(&["scanner.l", "-"]),
                ..CliOptions::default()
            }
        );
        assert!(options.compile_options().case_insensitive);
        assert_eq!(options.scanner_config().no_match, NoMatchPolicy::Error);
    }

    #[test]
    fn bad_flags() {
        assert_eq!(parse_options(&args(&["-x"])), Err("unknown option '-x'".to_owned()));
        assert_eq!(
            parse_options(&args(&["--policy=loud"])),
            Err("unknown policy 'loud' (expected echo or error)".to_owned())
        );
    }
}
