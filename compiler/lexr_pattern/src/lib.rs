//! Pattern stage of the lexr scanner generator.
//!
//! Turns lex pattern text into [`RulePattern`]s over a shared, hash-consed
//! [`PatternArena`]:
//!
//! - [`definitions`]: the `name pattern` table with lazy, memoized and
//!   cycle-checked expansion of `{name}` references
//! - [`parser`]: classes, quotes, escapes, grouping, alternation, postfix
//!   and bounded repetition, `^`/`$` anchors and `/` trailing context
//! - [`ast`]: the node arena plus fixed-length analysis used to place
//!   trailing-context split points
//!
//! Errors are plain data ([`PatternError`], [`DefinitionError`]) converted
//! to diagnostics by the caller.

pub mod ast;
mod compiler;
pub mod definitions;
mod error;
pub mod parser;
pub mod stack;

pub use ast::{Node, NodeId, NodeList, PatternArena, RulePattern, Trailing};
pub use compiler::PatternCompiler;
pub use definitions::DefinitionTable;
pub use error::{CompileError, DefinitionError, DefinitionErrorKind, PatternError, SyntaxReason};
pub use parser::{is_identifier, posix_class, MAX_REPETITION};
pub use stack::ensure_sufficient_stack;
