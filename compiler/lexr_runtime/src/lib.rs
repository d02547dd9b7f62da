//! Scanner runtime for lexr-compiled tables.
//!
//! [`Scanner`] drives shared, immutable [`ScannerTables`] over an
//! [`InputSource`]. Each call to [`Scanner::scan`] runs actions for matched
//! lexemes until one returns [`Flow::Return`] or the input ends.
//!
//! ```text
//! let mut scanner = Scanner::new(Arc::clone(&tables), SliceInput::from("x = 42"));
//! while let Some(token) = scanner.scan(&mut my_actions)? { ... }
//! ```
//!
//! Several scanners can share one `Arc<ScannerTables>` across threads; each
//! owns its buffer, condition, and line count.
//!
//! [`ScannerTables`]: lexr_automaton::ScannerTables

mod buffer;
mod config;
mod context;
mod error;
mod input;
mod scanner;

pub use config::{NoMatchPolicy, ScannerConfig, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use context::{ActionContext, Actions, Flow};
pub use error::ScanError;
pub use input::{ChainInput, InputSource, ReaderInput, SliceInput, Wrap};
pub use scanner::Scanner;
