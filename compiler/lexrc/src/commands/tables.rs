//! The `tables` command: compile and show the generated tables.

use std::process::ExitCode;

use super::{load, CliOptions};
use crate::dump::{render_summary, render_tables};

/// `-t` dumps every state, `-v` prints the table statistics against the
/// `%p %n %a %e %k %o` hints, `-n` drops the summary line.
pub fn show_tables(path: &str, options: &CliOptions) -> ExitCode {
    let (_, compilation) = match load(path, options) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    if options.dump {
        print!("{}", render_tables(&compilation.tables));
    }
    if options.verbose {
        eprint!("{}", compilation.stats);
    }
    if !options.quiet {
        eprintln!("{}", render_summary(&compilation));
    }
    ExitCode::SUCCESS
}
