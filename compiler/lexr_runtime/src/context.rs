//! The action callback surface.

use std::borrow::Cow;
use std::io::Write;

use lexr_automaton::ScannerTables;
use lexr_ir::{ActionId, CondId, RuleId};

use crate::error::ScanError;

/// What the scan call does after an action returns.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Flow<T> {
    /// Keep scanning.
    Continue,
    /// Return `T` from the scan call.
    Return(T),
}

/// User code run for each match.
///
/// Per-rule state (counters, nesting depth, a symbol table) lives in the
/// implementing value. Closures `FnMut(RuleId, &mut ActionContext) ->
/// Flow<T>` implement this trait.
pub trait Actions {
    type Token;

    fn on_match(&mut self, rule: RuleId, ctx: &mut ActionContext<'_>) -> Flow<Self::Token>;
}

impl<T, F> Actions for F
where
    F: FnMut(RuleId, &mut ActionContext<'_>) -> Flow<T>,
{
    type Token = T;

    fn on_match(&mut self, rule: RuleId, ctx: &mut ActionContext<'_>) -> Flow<T> {
        self(rule, ctx)
    }
}

/// Requests an action made, applied by the scanner after it returns.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub(crate) struct Requests {
    pub reject: bool,
    /// Bytes of the lexeme to keep; the rest goes back to the input.
    pub keep: Option<usize>,
}

/// View of the current match handed to [`Actions::on_match`].
pub struct ActionContext<'a> {
    pub(crate) lexeme: &'a [u8],
    pub(crate) rule: RuleId,
    pub(crate) action: ActionId,
    pub(crate) tables: &'a ScannerTables,
    pub(crate) condition: &'a mut CondId,
    pub(crate) line: usize,
    pub(crate) echo: &'a mut dyn Write,
    pub(crate) requests: Requests,
}

impl<'a> ActionContext<'a> {
    /// The matched text, without trailing context.
    pub fn lexeme(&self) -> &'a [u8] {
        self.lexeme
    }

    /// The lexeme as text; invalid UTF-8 is replaced.
    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.lexeme)
    }

    pub fn len(&self) -> usize {
        self.lexeme.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexeme.is_empty()
    }

    pub fn rule(&self) -> RuleId {
        self.rule
    }

    pub fn action(&self) -> ActionId {
        self.action
    }

    /// Current line, 1-based, counting the newlines of this lexeme. Stays
    /// at 1 unless line counting is enabled.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Active start condition.
    pub fn condition(&self) -> CondId {
        *self.condition
    }

    pub fn condition_name(&self) -> &str {
        self.tables
            .condition(*self.condition)
            .map_or("", |c| c.name.as_str())
    }

    /// Switch start condition; takes effect with the next match.
    pub fn begin(&mut self, condition: CondId) -> Result<(), ScanError> {
        if self.tables.automaton(condition).is_none() {
            return Err(ScanError::UnknownCondition(format!("#{}", condition.index())));
        }
        *self.condition = condition;
        Ok(())
    }

    pub fn begin_named(&mut self, name: &str) -> Result<(), ScanError> {
        let condition = self
            .tables
            .lookup_condition(name)
            .ok_or_else(|| ScanError::UnknownCondition(name.to_owned()))?;
        self.begin(condition)
    }

    /// Give the match up: once the action returns (its flow is ignored),
    /// the scanner picks the next candidate, shorter matches and
    /// lower-priority rules included.
    pub fn reject(&mut self) {
        self.requests.reject = true;
    }

    /// Keep only the first `n` bytes of the lexeme and return the rest to
    /// the input. `n` larger than the lexeme is clamped.
    pub fn less(&mut self, n: usize) {
        let n = n.min(self.lexeme.len());
        let dropped = &self.lexeme[n..];
        self.line -= memchr::memchr_iter(b'\n', dropped).count().min(self.line - 1);
        self.lexeme = &self.lexeme[..n];
        self.requests.keep = Some(n);
    }

    /// Copy the lexeme to the echo sink.
    pub fn echo(&mut self) -> Result<(), ScanError> {
        self.echo.write_all(self.lexeme).map_err(ScanError::Output)
    }

    /// Write arbitrary bytes to the echo sink.
    pub fn output(&mut self, bytes: &[u8]) -> Result<(), ScanError> {
        self.echo.write_all(bytes).map_err(ScanError::Output)
    }
}
