//! Type-level proof that an error was emitted.

/// Proof that at least one error diagnostic was recorded.
///
/// Only [`DiagnosticQueue`](crate::DiagnosticQueue) can create one, so a
/// stage returning `Err(ErrorGuaranteed)` cannot fail silently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }
}
