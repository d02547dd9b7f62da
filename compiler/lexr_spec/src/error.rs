//! Structural errors in a specification file.

use std::fmt;

use lexr_diagnostic::{Diagnostic, ErrorCode};
use lexr_ir::Span;

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum SpecErrorKind {
    UnterminatedCodeBlock,
    UnknownDirective(String),
    InvalidDirectiveArgument { directive: String, detail: String },
    InvalidName(String),
    UndeclaredCondition(String),
    DuplicateCondition { name: String, first: Option<Span> },
    MalformedStateList,
    MissingAction,
    DanglingContinuation,
    /// `<S>{` never closed (`true`) or `}` with no open group (`false`).
    UnbalancedGroup { unclosed: bool },
    UnterminatedAction,
    MissingSectionSeparator,
    TooManyConditions { limit: usize },
}

impl SpecErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            SpecErrorKind::UnterminatedCodeBlock => ErrorCode::L0001,
            SpecErrorKind::UnknownDirective(_) => ErrorCode::L0002,
            SpecErrorKind::InvalidDirectiveArgument { .. } => ErrorCode::L0003,
            SpecErrorKind::InvalidName(_) => ErrorCode::L0004,
            SpecErrorKind::UndeclaredCondition(_) => ErrorCode::L0005,
            SpecErrorKind::DuplicateCondition { .. } => ErrorCode::L0006,
            SpecErrorKind::MalformedStateList => ErrorCode::L0007,
            SpecErrorKind::MissingAction => ErrorCode::L0008,
            SpecErrorKind::DanglingContinuation => ErrorCode::L0009,
            SpecErrorKind::UnbalancedGroup { .. } => ErrorCode::L0010,
            SpecErrorKind::UnterminatedAction => ErrorCode::L0011,
            SpecErrorKind::MissingSectionSeparator => ErrorCode::L0012,
            SpecErrorKind::TooManyConditions { .. } => ErrorCode::L0013,
        }
    }
}

impl fmt::Display for SpecErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecErrorKind::UnterminatedCodeBlock => write!(f, "`%{{` block is never closed"),
            SpecErrorKind::UnknownDirective(word) => write!(f, "unknown directive `%{word}`"),
            SpecErrorKind::InvalidDirectiveArgument { directive, detail } => {
                write!(f, "invalid argument to `%{directive}`: {detail}")
            }
            SpecErrorKind::InvalidName(name) => write!(f, "`{name}` is not a valid name"),
            SpecErrorKind::UndeclaredCondition(name) => {
                write!(f, "start condition `{name}` is not declared")
            }
            SpecErrorKind::DuplicateCondition { name, .. } => {
                write!(f, "start condition `{name}` is declared twice")
            }
            SpecErrorKind::MalformedStateList => write!(f, "malformed start-condition list"),
            SpecErrorKind::MissingAction => write!(f, "rule has no action"),
            SpecErrorKind::DanglingContinuation => {
                write!(f, "`|` action is not followed by another rule")
            }
            SpecErrorKind::UnbalancedGroup { unclosed: true } => {
                write!(f, "start-condition block is never closed")
            }
            SpecErrorKind::UnbalancedGroup { unclosed: false } => {
                write!(f, "`}}` does not close any start-condition block")
            }
            SpecErrorKind::UnterminatedAction => write!(f, "action block is never closed"),
            SpecErrorKind::MissingSectionSeparator => write!(f, "missing `%%` before the rules"),
            SpecErrorKind::TooManyConditions { limit } => {
                write!(f, "too many start conditions (at most {limit})")
            }
        }
    }
}

/// A structural error located in the specification text.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SpecError {
    pub span: Span,
    pub kind: SpecErrorKind,
}

impl SpecError {
    pub fn new(span: Span, kind: SpecErrorKind) -> Self {
        SpecError { span, kind }
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_message(self.kind.to_string())
            .with_label(self.span, "here");
        match &self.kind {
            SpecErrorKind::DuplicateCondition {
                first: Some(first), ..
            } => diag.with_secondary_label(*first, "first declared here"),
            SpecErrorKind::UndeclaredCondition(name) => {
                diag.with_suggestion(format!("declare it in the header with `%s {name}` or `%x {name}`"))
            }
            SpecErrorKind::DanglingContinuation => {
                diag.with_note("`|` shares the action of the rule on the next line")
            }
            SpecErrorKind::MissingSectionSeparator => {
                diag.with_note("a specification needs at least one `%%` line")
            }
            _ => diag,
        }
    }
}
