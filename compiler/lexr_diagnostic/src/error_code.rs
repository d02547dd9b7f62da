//! Error codes for all lexr diagnostics.
//!
//! Each code is a unique identifier (e.g., `L2001`) with the first digit
//! indicating the stage that reports it. Used for `lexr explain` lookups.

use std::fmt;

/// Error codes for all lexr diagnostics.
///
/// Format: L#### / W#### where the first digit indicates the stage:
/// - L0xxx: Specification file structure
/// - L1xxx: Named definitions
/// - L2xxx: Pattern syntax
/// - W3xxx: Automaton construction (warnings)
/// - L4xxx: Scanner runtime
/// - L9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Specification Errors (L0xxx)
    /// Unterminated `%{` code block
    L0001,
    /// Unknown `%` directive
    L0002,
    /// Invalid directive argument
    L0003,
    /// Invalid definition or condition name
    L0004,
    /// Undeclared start condition
    L0005,
    /// Start condition declared twice
    L0006,
    /// Malformed start-condition list
    L0007,
    /// Rule without an action
    L0008,
    /// `|` continuation with no following rule
    L0009,
    /// Unbalanced start-condition block group
    L0010,
    /// Unterminated action block
    L0011,
    /// Missing `%%` section separator
    L0012,
    /// More start conditions than a `CondId` can number
    L0013,

    // Definition Errors (L1xxx)
    /// Definition declared twice
    L1001,
    /// Reference to an undefined definition
    L1002,
    /// Definition refers to itself through substitutions
    L1003,

    // Pattern Errors (L2xxx)
    /// Malformed pattern
    L2001,

    // Automaton Warnings (W3xxx)
    /// Rule can never be matched
    W3001,

    // Runtime Errors (L4xxx)
    /// No rule matches at the current position
    L4001,
    /// Lexeme exceeds the bounded buffer capacity
    L4002,
    /// Input refill failed
    L4003,
    /// Writing echoed text failed
    L4004,
    /// `BEGIN` named an unknown start condition
    L4005,

    // Internal Errors (L9xxx)
    /// Internal compiler error
    L9001,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::L0001,
        ErrorCode::L0002,
        ErrorCode::L0003,
        ErrorCode::L0004,
        ErrorCode::L0005,
        ErrorCode::L0006,
        ErrorCode::L0007,
        ErrorCode::L0008,
        ErrorCode::L0009,
        ErrorCode::L0010,
        ErrorCode::L0011,
        ErrorCode::L0012,
        ErrorCode::L0013,
        ErrorCode::L1001,
        ErrorCode::L1002,
        ErrorCode::L1003,
        ErrorCode::L2001,
        ErrorCode::W3001,
        ErrorCode::L4001,
        ErrorCode::L4002,
        ErrorCode::L4003,
        ErrorCode::L4004,
        ErrorCode::L4005,
        ErrorCode::L9001,
    ];

    /// Get the code as a string (e.g., "L2001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::L0001 => "L0001",
            ErrorCode::L0002 => "L0002",
            ErrorCode::L0003 => "L0003",
            ErrorCode::L0004 => "L0004",
            ErrorCode::L0005 => "L0005",
            ErrorCode::L0006 => "L0006",
            ErrorCode::L0007 => "L0007",
            ErrorCode::L0008 => "L0008",
            ErrorCode::L0009 => "L0009",
            ErrorCode::L0010 => "L0010",
            ErrorCode::L0011 => "L0011",
            ErrorCode::L0012 => "L0012",
            ErrorCode::L0013 => "L0013",
            ErrorCode::L1001 => "L1001",
            ErrorCode::L1002 => "L1002",
            ErrorCode::L1003 => "L1003",
            ErrorCode::L2001 => "L2001",
            ErrorCode::W3001 => "W3001",
            ErrorCode::L4001 => "L4001",
            ErrorCode::L4002 => "L4002",
            ErrorCode::L4003 => "L4003",
            ErrorCode::L4004 => "L4004",
            ErrorCode::L4005 => "L4005",
            ErrorCode::L9001 => "L9001",
        }
    }

    /// Short explanation used by `lexr explain`.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::L0001 => "a `%{` code block in the header is never closed by `%}`",
            ErrorCode::L0002 => "the header contains a `%` directive lexr does not know",
            ErrorCode::L0003 => "a directive argument is missing or not a valid number",
            ErrorCode::L0004 => "definition and condition names must be C identifiers",
            ErrorCode::L0005 => "a rule refers to a start condition never declared with %s or %x",
            ErrorCode::L0006 => "the same start condition is declared more than once",
            ErrorCode::L0007 => "a `<...>` start-condition list is empty or not closed",
            ErrorCode::L0008 => "a rule pattern is not followed by an action",
            ErrorCode::L0009 => "the last rule uses the `|` continuation but no rule follows",
            ErrorCode::L0010 => "a `<cond>{` block group is not closed, or `}` closes nothing",
            ErrorCode::L0011 => "a `{` action block is not closed before the end of the section",
            ErrorCode::L0012 => "the specification has no `%%` line separating the rules section",
            ErrorCode::L0013 => "the specification declares more start conditions than lexr can number",
            ErrorCode::L1001 => "a named definition is declared twice",
            ErrorCode::L1002 => "a `{name}` reference names no definition",
            ErrorCode::L1003 => "definitions refer to each other in a cycle",
            ErrorCode::L2001 => "a pattern is malformed (unbalanced brackets, dangling operator)",
            ErrorCode::W3001 => "an earlier rule always wins, so this rule can never match",
            ErrorCode::L4001 => "no rule matches the input at the current position",
            ErrorCode::L4002 => "a match is longer than the %array lexeme buffer",
            ErrorCode::L4003 => "reading more input failed",
            ErrorCode::L4004 => "writing echoed text to the output failed",
            ErrorCode::L4005 => "an action switched to a start condition the scanner does not have",
            ErrorCode::L9001 => "internal compiler error",
        }
    }

    /// Parse a code string such as `"L2001"` (case-insensitive).
    pub fn parse(code: &str) -> Option<ErrorCode> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(code))
    }

    /// Check if this is a specification structure error (L0xxx).
    pub fn is_spec_error(&self) -> bool {
        self.as_str().starts_with("L0")
    }

    /// Check if this is a definition error (L1xxx).
    pub fn is_definition_error(&self) -> bool {
        self.as_str().starts_with("L1")
    }

    /// Check if this is a pattern syntax error (L2xxx).
    pub fn is_pattern_error(&self) -> bool {
        self.as_str().starts_with("L2")
    }

    /// Check if this is a runtime error (L4xxx).
    pub fn is_runtime_error(&self) -> bool {
        self.as_str().starts_with("L4")
    }

    /// Check if this is an internal error (L9xxx).
    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("L9")
    }

    /// Check if this is a warning code (W-prefixed).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
