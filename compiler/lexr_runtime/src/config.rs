//! Scanner configuration.

use lexr_ir::LexemeMode;

/// Refill request size when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Largest refill request; bigger sizes are lowered to this.
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// What happens when no rule matches at the cursor (or every candidate
/// was rejected).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum NoMatchPolicy {
    /// Copy one byte to the echo sink and move on, like lex's default rule.
    #[default]
    Echo,
    /// Consume one byte and fail with `ScanError::NoMatch`.
    Error,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ScannerConfig {
    /// Overrides the tables' `%array`/`%pointer` mode.
    pub lexeme_mode: Option<LexemeMode>,
    pub no_match: NoMatchPolicy,
    /// Bytes requested per refill, always in `1..=MAX_CHUNK_SIZE`.
    chunk_size: usize,
    /// Overrides `%option yylineno`.
    pub count_lines: Option<bool>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            lexeme_mode: None,
            no_match: NoMatchPolicy::Echo,
            chunk_size: DEFAULT_CHUNK_SIZE,
            count_lines: None,
        }
    }
}

impl ScannerConfig {
    pub fn with_lexeme_mode(mut self, mode: LexemeMode) -> Self {
        self.lexeme_mode = Some(mode);
        self
    }

    pub fn with_no_match(mut self, policy: NoMatchPolicy) -> Self {
        self.no_match = policy;
        self
    }

    /// Clamped to `1..=MAX_CHUNK_SIZE`.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn with_line_counting(mut self, enabled: bool) -> Self {
        self.count_lines = Some(enabled);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_stays_in_range() {
        assert_eq!(ScannerConfig::default().chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(ScannerConfig::default().with_chunk_size(0).chunk_size(), 1);
        assert_eq!(
            ScannerConfig::default().with_chunk_size(usize::MAX).chunk_size(),
            MAX_CHUNK_SIZE
        );
    }
}
