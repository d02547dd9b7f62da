//! Automaton stage of the lexr scanner generator.
//!
//! Takes a [`Specification`](lexr_spec::Specification), compiles its
//! definitions and rule patterns, and builds one minimized DFA per start
//! condition:
//!
//! 1. [`conditions`]: which rules are active in which condition
//! 2. [`classes`]: byte equivalence classes over every set the rules use
//! 3. NFA fragments per rule, built in parallel, joined per condition
//!    behind a normal and a beginning-of-line entry
//! 4. subset construction, then minimization with canonical numbering
//!
//! The result is an immutable [`ScannerTables`] plus [`TableStats`] for the
//! `%p %n %a %e %k %o` hints.

mod build;
pub mod classes;
mod compile;
pub mod conditions;
mod dfa;
mod minimize;
mod nfa;
mod options;
mod stats;
pub mod tables;

pub use classes::ByteClasses;
pub use compile::{compile, Compiled};
pub use conditions::{ConditionRegistry, StartCondition, TooManyConditions, MAX_CONDITIONS};
pub use options::CompileOptions;
pub use stats::TableStats;
pub use tables::{Dfa, DfaState, RuleInfo, ScannerTables, TrailingSplit};
