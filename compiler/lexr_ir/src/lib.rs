//! Shared types for the lexr scanner generator.
//!
//! Everything here is small, `Copy` where possible, and free of any
//! compilation logic: source spans, the identifiers that tie rules, actions
//! and start conditions together across crates, 256-bit byte sets used as
//! transition labels, capacity hints, and the lexeme storage mode.

mod byte_set;
mod hints;
mod ids;
mod lexeme;
mod span;

pub use byte_set::ByteSet;
pub use hints::{CapacityHints, HintKind, MAX_RESERVE};
pub use ids::{ActionId, CondId, ConditionKind, RuleId};
pub use lexeme::{LexemeMode, DEFAULT_LEXEME_CAPACITY};
pub use span::{Span, SpanError};
