//! The lexr driver.
//!
//! Runs the stages in order (read the specification, compile patterns,
//! build the automata) and collects every diagnostic on the way. The `lexr`
//! binary wraps this library with `check`, `tables`, `scan` and `explain`
//! commands.

pub mod commands;
mod compile;
mod dump;
mod listing;
mod tracing_setup;

pub use compile::{compile_source, Compilation};
pub use dump::{render_summary, render_tables};
pub use listing::{scan_to, ScanSummary};
pub use tracing_setup::init_tracing;
