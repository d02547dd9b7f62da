//! lexr command-line driver.

use std::process::ExitCode;

use lexrc::commands::{check_file, explain_error, parse_options, scan_file, show_tables};

fn main() -> ExitCode {
    lexrc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let command = &args[1];
    let options = match parse_options(&args[2..]) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("error: {msg}");
            return ExitCode::FAILURE;
        }
    };
    let first = options.positional.first().map(String::as_str);

    match command.as_str() {
        "check" => {
            let Some(path) = first else {
                eprintln!("Usage: lexr check <file.l> [-i] [-n]");
                return ExitCode::FAILURE;
            };
            check_file(path, &options)
        }
        "tables" => {
            let Some(path) = first else {
                eprintln!("Usage: lexr tables <file.l> [-t] [-v] [-n] [-i]");
                return ExitCode::FAILURE;
            };
            show_tables(path, &options)
        }
        "scan" => {
            let Some(path) = first else {
                eprintln!("Usage: lexr scan <file.l> [input] [--policy=echo|error] [-i] [-v]");
                return ExitCode::FAILURE;
            };
            let input = options.positional.get(1).map(String::as_str);
            scan_file(path, input, &options)
        }
        "explain" | "--explain" => {
            let Some(code) = first else {
                eprintln!("Usage: lexr explain <ERROR_CODE>");
                eprintln!("Example: lexr explain L2001");
                return ExitCode::FAILURE;
            };
            explain_error(code)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" => {
            println!("lexr {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!("lexr, a lex-compatible scanner generator");
    println!();
    println!("Usage: lexr <command> [options]");
    println!();
    println!("Commands:");
    println!("  check <file.l>           Compile a specification and report problems");
    println!("  tables <file.l>          Compile and show the generated tables");
    println!("  scan <file.l> [input]    Run the scanner, printing rule<TAB>lexeme per match");
    println!("  explain <code>           Explain a diagnostic code (e.g., L2001)");
    println!("  help                     Show this help message");
    println!("  version                  Show version information");
    println!();
    println!("Options:");
    println!("  -i                  Case-insensitive patterns");
    println!("  -v                  Print table statistics (tables) or match count (scan)");
    println!("  -n                  No summary line");
    println!("  -t                  Dump every state and transition (tables)");
    println!("  --policy=<mode>     Unmatched input: echo (default) or error (scan)");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=lexr_automaton=debug) for tracing output.");
}
