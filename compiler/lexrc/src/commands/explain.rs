//! The `explain` command: describe an error code.

use std::process::ExitCode;

use lexr_diagnostic::ErrorCode;

pub fn explain_error(code_str: &str) -> ExitCode {
    let Some(code) = ErrorCode::parse(code_str) else {
        eprintln!("Unknown error code: {code_str}");
        eprintln!();
        eprintln!("Codes have the format LXXXX (errors) or WXXXX (warnings) where X is a digit.");
        eprintln!("Examples: L0005, L2001, W3001");
        return ExitCode::FAILURE;
    };
    let kind = if code.is_warning() { "warning" } else { "error" };
    println!("{code} ({kind}): {}", code.description());
    ExitCode::SUCCESS
}
