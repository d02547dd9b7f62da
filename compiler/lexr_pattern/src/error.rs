//! Pattern and definition errors.
//!
//! Both are plain data with a span; the integration layer converts them to
//! [`Diagnostic`]s with [`CompileError::to_diagnostic`].

use std::fmt;

use lexr_diagnostic::{Diagnostic, ErrorCode};
use lexr_ir::Span;

/// Why a pattern failed to parse.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum SyntaxReason {
    /// `(` without a matching `)`.
    UnclosedGroup,
    /// `)` without a matching `(`.
    UnmatchedParen,
    UnclosedClass,
    UnclosedQuote,
    /// `{` without `}` (reference or repetition).
    UnclosedBrace,
    /// `*`, `+`, `?` or `{n}` with nothing to apply to.
    DanglingOperator(char),
    /// `a||b`, `|a` or `a|` outside a group.
    EmptyAlternative,
    /// `()`.
    EmptyGroup,
    EmptyPattern,
    ReversedRange { lo: u8, hi: u8 },
    /// Multi-byte character as a range endpoint.
    NonByteRange,
    InvalidRepetition,
    RepetitionTooLarge { limit: u32 },
    UnknownPosixClass(String),
    InvalidReferenceName(String),
    /// `\` at the very end of the pattern.
    TrailingBackslash,
    /// More than one `/` in a rule.
    MultipleTrailingContext,
    /// `/` inside a group or a named definition.
    MisplacedTrailingContext,
    /// `r/s$`.
    TrailingContextWithEndOfLine,
}

impl fmt::Display for SyntaxReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxReason::UnclosedGroup => write!(f, "unclosed group: missing `)`"),
            SyntaxReason::UnmatchedParen => write!(f, "unmatched `)`"),
            SyntaxReason::UnclosedClass => write!(f, "unclosed character class: missing `]`"),
            SyntaxReason::UnclosedQuote => write!(f, "unclosed quoted string: missing `\"`"),
            SyntaxReason::UnclosedBrace => write!(f, "unclosed `{{`"),
            SyntaxReason::DanglingOperator(op) => {
                write!(f, "`{op}` has nothing to repeat")
            }
            SyntaxReason::EmptyAlternative => write!(f, "empty alternative"),
            SyntaxReason::EmptyGroup => write!(f, "empty group `()`"),
            SyntaxReason::EmptyPattern => write!(f, "empty pattern"),
            SyntaxReason::ReversedRange { lo, hi } => write!(
                f,
                "reversed range `{}-{}`",
                lo.escape_ascii(),
                hi.escape_ascii()
            ),
            SyntaxReason::NonByteRange => {
                write!(f, "range endpoints must be single-byte characters")
            }
            SyntaxReason::InvalidRepetition => write!(f, "invalid repetition bounds"),
            SyntaxReason::RepetitionTooLarge { limit } => {
                write!(f, "repetition bound exceeds {limit}")
            }
            SyntaxReason::UnknownPosixClass(name) => {
                write!(f, "unknown character class `[:{name}:]`")
            }
            SyntaxReason::InvalidReferenceName(name) => {
                write!(f, "`{name}` is not a valid definition name")
            }
            SyntaxReason::TrailingBackslash => write!(f, "pattern ends with `\\`"),
            SyntaxReason::MultipleTrailingContext => {
                write!(f, "a rule may have only one trailing context `/`")
            }
            SyntaxReason::MisplacedTrailingContext => {
                write!(f, "trailing context `/` is only allowed at the top level of a rule")
            }
            SyntaxReason::TrailingContextWithEndOfLine => {
                write!(f, "`$` cannot be combined with trailing context `/`")
            }
        }
    }
}

/// A malformed pattern.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PatternError {
    pub span: Span,
    pub reason: SyntaxReason,
}

impl PatternError {
    pub fn new(span: Span, reason: SyntaxReason) -> Self {
        PatternError { span, reason }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(ErrorCode::L2001)
            .with_message(format!("malformed pattern: {}", self.reason))
            .with_label(self.span, "here");
        match &self.reason {
            SyntaxReason::EmptyAlternative => {
                diag.with_suggestion("use `?` to make part of a pattern optional")
            }
            SyntaxReason::UnknownPosixClass(_) => diag.with_note(
                "known classes: alnum alpha blank cntrl digit graph lower print punct space upper xdigit",
            ),
            SyntaxReason::MisplacedTrailingContext => {
                diag.with_suggestion("escape it as `\\/` to match a literal slash")
            }
            _ => diag,
        }
    }
}

/// What went wrong with a named definition.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DefinitionErrorKind {
    Duplicate { name: String, first: Span },
    Undefined { name: String },
    /// Names along the expansion path, ending with the repeated one.
    Cyclic { path: Vec<String> },
}

/// A definition error, located at the offending declaration or reference.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DefinitionError {
    pub span: Span,
    pub kind: DefinitionErrorKind,
}

impl DefinitionError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match &self.kind {
            DefinitionErrorKind::Duplicate { name, first } => Diagnostic::error(ErrorCode::L1001)
                .with_message(format!("definition `{name}` is declared twice"))
                .with_label(self.span, "redeclared here")
                .with_secondary_label(*first, "first declared here"),
            DefinitionErrorKind::Undefined { name } => Diagnostic::error(ErrorCode::L1002)
                .with_message(format!("undefined definition `{name}`"))
                .with_label(self.span, "referenced here")
                .with_suggestion(format!("declare it in the header: `{name} <pattern>`")),
            DefinitionErrorKind::Cyclic { path } => Diagnostic::error(ErrorCode::L1003)
                .with_message(format!(
                    "definition `{}` refers to itself",
                    path.first().map_or("?", String::as_str)
                ))
                .with_label(self.span, "cycle closes here")
                .with_note(format!("expansion path: {}", path.join(" -> "))),
        }
    }
}

/// Any error from compiling a pattern.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompileError {
    Definition(DefinitionError),
    Pattern(PatternError),
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::Definition(e) => e.span,
            CompileError::Pattern(e) => e.span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::Definition(e) => match e.kind {
                DefinitionErrorKind::Duplicate { .. } => ErrorCode::L1001,
                DefinitionErrorKind::Undefined { .. } => ErrorCode::L1002,
                DefinitionErrorKind::Cyclic { .. } => ErrorCode::L1003,
            },
            CompileError::Pattern(_) => ErrorCode::L2001,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Definition(e) => e.to_diagnostic(),
            CompileError::Pattern(e) => e.to_diagnostic(),
        }
    }
}

impl From<PatternError> for CompileError {
    fn from(e: PatternError) -> Self {
        CompileError::Pattern(e)
    }
}

impl From<DefinitionError> for CompileError {
    fn from(e: DefinitionError) -> Self {
        CompileError::Definition(e)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diag = self.to_diagnostic();
        write!(f, "{diag}")
    }
}

impl std::error::Error for CompileError {}
