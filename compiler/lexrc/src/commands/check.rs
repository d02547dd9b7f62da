//! The `check` command: compile a specification and report diagnostics.

use std::process::ExitCode;

use super::{load, CliOptions};
use crate::dump::render_summary;

/// Compile `path` without running it. Warnings do not fail the check.
pub fn check_file(path: &str, options: &CliOptions) -> ExitCode {
    let (_, compilation) = match load(path, options) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    if !options.quiet {
        println!("OK: {path} ({})", render_summary(&compilation));
    }
    ExitCode::SUCCESS
}
