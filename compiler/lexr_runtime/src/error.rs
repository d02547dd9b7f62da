//! Scan-time errors.

use std::io;

use lexr_diagnostic::{Diagnostic, ErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// `%array` mode and the lexeme does not fit the buffer.
    #[error("lexeme of {len} bytes exceeds the {capacity}-byte lexeme buffer")]
    LexemeTooLong { len: usize, capacity: usize },

    /// No rule matched at `position` under [`NoMatchPolicy::Error`]. The
    /// offending byte has been consumed.
    ///
    /// [`NoMatchPolicy::Error`]: crate::NoMatchPolicy::Error
    #[error("no rule matches the input at byte {position}")]
    NoMatch { position: u64 },

    /// The input source failed.
    #[error("reading input failed")]
    Aborted(#[source] io::Error),

    /// The input source has no data yet. Nothing was consumed; call
    /// `scan` again once it is readable.
    #[error("input is not ready")]
    WouldBlock,

    /// Writing echoed text failed.
    #[error("writing echoed text failed")]
    Output(#[source] io::Error),

    /// `begin` named a start condition the tables do not have.
    #[error("unknown start condition `{0}`")]
    UnknownCondition(String),
}

impl ScanError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ScanError::NoMatch { .. } => ErrorCode::L4001,
            ScanError::LexemeTooLong { .. } => ErrorCode::L4002,
            ScanError::Aborted(_) | ScanError::WouldBlock => ErrorCode::L4003,
            ScanError::Output(_) => ErrorCode::L4004,
            ScanError::UnknownCondition(_) => ErrorCode::L4005,
        }
    }

    /// Whether scanning can continue by calling `scan` again.
    pub fn is_resumable(&self) -> bool {
        matches!(self, ScanError::WouldBlock | ScanError::NoMatch { .. })
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            ScanError::Aborted(e) | ScanError::Output(e) => diag.with_note(e.to_string()),
            ScanError::LexemeTooLong { .. } => diag.with_suggestion(
                "raise the limit with `%option yylmax=N` or switch to `%pointer`",
            ),
            _ => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_messages() {
        let err = ScanError::LexemeTooLong {
            len: 10,
            capacity: 4,
        };
        assert_eq!(err.code(), ErrorCode::L4002);
        assert_eq!(
            err.to_string(),
            "lexeme of 10 bytes exceeds the 4-byte lexeme buffer"
        );
        assert!(!err.is_resumable());
        assert!(ScanError::WouldBlock.is_resumable());

        let io = ScanError::Aborted(io::Error::other("disk on fire"));
        let diag = io.to_diagnostic();
        assert_eq!(diag.code, ErrorCode::L4003);
        assert_eq!(diag.notes, vec!["disk on fire".to_owned()]);
    }
}
