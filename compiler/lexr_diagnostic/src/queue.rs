//! Diagnostic queue for collecting and ordering diagnostics across stages.
//!
//! Stages push everything they find; nothing aborts early. When the driver
//! flushes the queue, diagnostics come out in source order with exact
//! duplicates removed (a definition referenced by ten rules reports its
//! own syntax error once).

use crate::{Diagnostic, ErrorGuaranteed, Severity};

/// Queue for collecting diagnostics.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic of any severity.
    ///
    /// Exact duplicates of an already-queued diagnostic are dropped.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.contains(&diagnostic) {
            return;
        }
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diagnostic);
    }

    /// Record an error and return the proof that it was recorded.
    pub fn emit_error(&mut self, diagnostic: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diagnostic.is_error(), "emit_error called with a non-error");
        self.push(diagnostic);
        ErrorGuaranteed::new()
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Proof of failure, when at least one error was recorded.
    pub fn error_guaranteed(&self) -> Option<ErrorGuaranteed> {
        self.has_errors().then(ErrorGuaranteed::new)
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Drain the queue in source order.
    ///
    /// Diagnostics without a primary span sort last; ties keep insertion
    /// order so a stage's reporting order is preserved.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut out = std::mem::take(&mut self.diagnostics);
        out.sort_by_key(|d| d.primary_span().map_or(u32::MAX, |s| s.start));
        self.error_count = 0;
        self.warning_count = 0;
        out
    }
}

#[cfg(test)]
mod tests;
