//! The table-driven scanner.
//!
//! Each step runs the active condition's DFA from the cursor as far as it
//! goes, recording every accepting position. The longest match wins, ties
//! go to the lowest rule id, and `reject()` walks further down the same
//! ranking without rescanning.

use std::io::{self, Write};
use std::sync::Arc;

use bitflags::bitflags;
use lexr_automaton::{Dfa, DfaState, ScannerTables};
use lexr_ir::{CondId, LexemeMode, RuleId, MAX_RESERVE};
use smallvec::SmallVec;

use crate::buffer::InputBuffer;
use crate::config::{NoMatchPolicy, ScannerConfig};
use crate::context::{ActionContext, Actions, Flow, Requests};
use crate::error::ScanError;
use crate::input::{InputSource, Wrap};

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    struct ScanFlags: u8 {
        /// The cursor is at the start of a line.
        const AT_BOL = 1 << 0;
        /// The current source returned end of input.
        const SOURCE_DONE = 1 << 1;
        /// `wrap` said stop; every further scan returns `None`.
        const FINISHED = 1 << 2;
    }
}

/// An accepting position seen during one DFA run.
#[derive(Copy, Clone, Debug)]
struct Accept {
    len: usize,
    state: DfaState,
    /// Accepted on the end-of-input symbol.
    at_end: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct Candidate {
    len: usize,
    rule: RuleId,
    at_end: bool,
}

/// Candidates of one run, longest first, then lowest rule id.
#[derive(Debug, Default)]
struct Candidates {
    accepts: SmallVec<[Accept; 8]>,
    /// Accepts not yet expanded, counted from the front.
    unranked: usize,
    group: SmallVec<[(RuleId, bool); 4]>,
    group_len: usize,
    next_in_group: usize,
}

impl Candidates {
    fn push(&mut self, accept: Accept) {
        self.accepts.push(accept);
        self.unranked = self.accepts.len();
    }

    fn next(&mut self, dfa: &Dfa) -> Option<Candidate> {
        loop {
            if let Some(&(rule, at_end)) = self.group.get(self.next_in_group) {
                self.next_in_group += 1;
                return Some(Candidate {
                    len: self.group_len,
                    rule,
                    at_end,
                });
            }
            let last = *self.accepts.get(self.unranked.checked_sub(1)?)?;
            self.group.clear();
            self.next_in_group = 0;
            self.group_len = last.len;
            while let Some(accept) = self.unranked.checked_sub(1).map(|i| self.accepts[i]) {
                if accept.len != last.len {
                    break;
                }
                self.unranked -= 1;
                self.group
                    .extend(dfa.candidates(accept.state).iter().map(|&r| (r, accept.at_end)));
            }
            self.group.sort_by_key(|&(rule, _)| rule);
            self.group.dedup_by_key(|&mut (rule, _)| rule);
        }
    }
}

/// A scanner over one input, driven by shared compiled tables.
///
/// `W` receives echoed text: explicit `echo()` calls and unmatched bytes
/// under [`NoMatchPolicy::Echo`].
pub struct Scanner<S, W = io::Sink> {
    tables: Arc<ScannerTables>,
    input: S,
    echo: W,
    config: ScannerConfig,
    mode: LexemeMode,
    count_lines: bool,
    buf: InputBuffer,
    /// Lexeme copy in `%array` mode.
    array: Vec<u8>,
    condition: CondId,
    line: usize,
    flags: ScanFlags,
}

impl<S: InputSource> Scanner<S, io::Sink> {
    /// Scanner with the default configuration; echoed text is discarded.
    pub fn new(tables: Arc<ScannerTables>, input: S) -> Self {
        Scanner::with_config(tables, input, io::sink(), ScannerConfig::default())
    }
}

impl<S: InputSource, W: Write> Scanner<S, W> {
    pub fn with_config(tables: Arc<ScannerTables>, input: S, echo: W, config: ScannerConfig) -> Self {
        let mode = config.lexeme_mode.unwrap_or_else(|| tables.lexeme_mode());
        let count_lines = config.count_lines.unwrap_or_else(|| tables.counts_lines());
        let array = match mode {
            LexemeMode::Array { capacity } => Vec::with_capacity(capacity.min(MAX_RESERVE)),
            LexemeMode::Pointer => Vec::new(),
        };
        Scanner {
            tables,
            input,
            echo,
            buf: InputBuffer::with_capacity(config.chunk_size()),
            config,
            mode,
            count_lines,
            array,
            condition: CondId::INITIAL,
            line: 1,
            flags: ScanFlags::AT_BOL,
        }
    }

    pub fn tables(&self) -> &Arc<ScannerTables> {
        &self.tables
    }

    pub fn condition(&self) -> CondId {
        self.condition
    }

    pub fn begin(&mut self, condition: CondId) -> Result<(), ScanError> {
        if self.tables.automaton(condition).is_none() {
            return Err(ScanError::UnknownCondition(format!("#{}", condition.index())));
        }
        self.condition = condition;
        Ok(())
    }

    pub fn begin_named(&mut self, name: &str) -> Result<(), ScanError> {
        let condition = self
            .tables
            .lookup_condition(name)
            .ok_or_else(|| ScanError::UnknownCondition(name.to_owned()))?;
        self.begin(condition)
    }

    /// Line at the cursor, 1-based (always 1 without line counting).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Stream offset of the cursor.
    pub fn position(&self) -> u64 {
        self.buf.position()
    }

    pub fn echo_sink(&self) -> &W {
        &self.echo
    }

    pub fn into_echo_sink(self) -> W {
        self.echo
    }

    /// Start over on a new input, keeping the condition and line count.
    pub fn restart(&mut self, input: S) {
        self.input = input;
        self.buf = InputBuffer::with_capacity(self.config.chunk_size());
        self.flags = ScanFlags::AT_BOL;
    }

    /// Scan until an action returns [`Flow::Return`] or the input ends.
    ///
    /// Returns `Ok(None)` at the end of input, once `wrap` answered
    /// [`Wrap::Stop`]. After [`ScanError::WouldBlock`] the interrupted match
    /// is retried from scratch by the next call.
    pub fn scan<A: Actions + ?Sized>(&mut self, actions: &mut A) -> Result<Option<A::Token>, ScanError> {
        loop {
            if self.flags.contains(ScanFlags::FINISHED) {
                return Ok(None);
            }
            self.buf.compact();
            if self.buf.pending().is_empty() {
                if !self.flags.contains(ScanFlags::SOURCE_DONE) && self.fill()? > 0 {
                    continue;
                }
                match self.input.wrap() {
                    Wrap::Continue => {
                        tracing::debug!(position = self.buf.position(), "input wrapped; continuing");
                        self.flags.remove(ScanFlags::SOURCE_DONE);
                        self.flags.insert(ScanFlags::AT_BOL);
                        continue;
                    }
                    Wrap::Stop => {
                        self.flags.insert(ScanFlags::FINISHED);
                        return Ok(None);
                    }
                }
            }
            let mut candidates = self.run()?;
            if let Some(token) = self.dispatch(&mut candidates, actions)? {
                return Ok(Some(token));
            }
        }
    }

    /// Scan to the end of input, collecting every returned token.
    pub fn scan_all<A: Actions + ?Sized>(&mut self, actions: &mut A) -> Result<Vec<A::Token>, ScanError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.scan(actions)? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Refill once; `Ok(0)` marks the current source done.
    fn fill(&mut self) -> Result<usize, ScanError> {
        match self.buf.fill(&mut self.input, self.config.chunk_size()) {
            Ok(0) => {
                self.flags.insert(ScanFlags::SOURCE_DONE);
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(ScanError::WouldBlock),
            Err(e) => Err(ScanError::Aborted(e)),
        }
    }

    /// Run the active DFA from the cursor, refilling as needed.
    fn run(&mut self) -> Result<Candidates, ScanError> {
        let tables = Arc::clone(&self.tables);
        let dfa = self.automaton(&tables)?;
        let classes = tables.classes();

        let mut candidates = Candidates::default();
        let mut state = dfa.start(self.flags.contains(ScanFlags::AT_BOL));
        if dfa.is_accepting(state) {
            candidates.push(Accept {
                len: 0,
                state,
                at_end: false,
            });
        }
        let mut len = 0;
        loop {
            if len == self.buf.pending().len() {
                if !self.flags.contains(ScanFlags::SOURCE_DONE) && self.fill()? > 0 {
                    continue;
                }
                let end = dfa.next(state, classes.eoi());
                if dfa.is_accepting(end) {
                    candidates.push(Accept {
                        len,
                        state: end,
                        at_end: true,
                    });
                }
                break;
            }
            state = dfa.next(state, classes.class_of(self.buf.pending()[len]));
            if state == Dfa::DEAD {
                break;
            }
            len += 1;
            if dfa.is_accepting(state) {
                candidates.push(Accept {
                    len,
                    state,
                    at_end: false,
                });
            }
        }
        Ok(candidates)
    }

    fn automaton<'t>(&self, tables: &'t ScannerTables) -> Result<&'t Dfa, ScanError> {
        tables
            .automaton(self.condition)
            .ok_or_else(|| ScanError::UnknownCondition(format!("#{}", self.condition.index())))
    }

    /// Hand ranked candidates to the actions until one is accepted.
    fn dispatch<A: Actions + ?Sized>(
        &mut self,
        candidates: &mut Candidates,
        actions: &mut A,
    ) -> Result<Option<A::Token>, ScanError> {
        let tables = Arc::clone(&self.tables);
        let dfa = self.automaton(&tables)?;
        let count_lines = self.count_lines;
        let mode = self.mode;
        let Scanner {
            buf,
            array,
            condition,
            line,
            echo,
            flags,
            ..
        } = self;

        while let Some(candidate) = candidates.next(dfa) {
            let Some(info) = tables.rule(candidate.rule) else {
                continue;
            };
            let text = &buf.pending()[..candidate.len];
            let lexeme_len = info.split.lexeme_len(tables.classes(), text, candidate.at_end);
            let lexeme: &[u8] = match mode {
                LexemeMode::Array { capacity } => {
                    if lexeme_len > capacity {
                        return Err(ScanError::LexemeTooLong {
                            len: lexeme_len,
                            capacity,
                        });
                    }
                    array.clear();
                    array.extend_from_slice(&text[..lexeme_len]);
                    array.as_slice()
                }
                LexemeMode::Pointer => &text[..lexeme_len],
            };
            let line_at_end = if count_lines {
                *line + memchr::memchr_iter(b'\n', lexeme).count()
            } else {
                *line
            };

            tracing::trace!(
                rule = %candidate.rule,
                len = lexeme_len,
                matched = candidate.len,
                condition = condition.index(),
                "match"
            );
            let mut ctx = ActionContext {
                lexeme,
                rule: candidate.rule,
                action: info.action,
                tables: &tables,
                condition: &mut *condition,
                line: line_at_end,
                echo: &mut *echo,
                requests: Requests::default(),
            };
            let flow = actions.on_match(candidate.rule, &mut ctx);
            let Requests { reject, keep } = ctx.requests;
            let line_after = ctx.line;
            if reject {
                tracing::trace!(rule = %candidate.rule, "rejected");
                continue;
            }

            let consumed = keep.unwrap_or(lexeme_len);
            *line = line_after;
            if consumed > 0 {
                flags.set(ScanFlags::AT_BOL, buf.pending()[consumed - 1] == b'\n');
            }
            buf.advance(consumed);
            if lexeme_len == 0 {
                self.fallback()?;
            }
            return Ok(match flow {
                Flow::Continue => None,
                Flow::Return(token) => Some(token),
            });
        }

        self.fallback()?;
        Ok(None)
    }

    /// Consume one byte under the no-match policy.
    fn fallback(&mut self) -> Result<(), ScanError> {
        let Some(&byte) = self.buf.pending().first() else {
            return Ok(());
        };
        let position = self.buf.position();
        self.buf.advance(1);
        self.flags.set(ScanFlags::AT_BOL, byte == b'\n');
        if self.count_lines && byte == b'\n' {
            self.line += 1;
        }
        match self.config.no_match {
            NoMatchPolicy::Echo => self.echo.write_all(&[byte]).map_err(ScanError::Output),
            NoMatchPolicy::Error => {
                tracing::trace!(position, byte, "no match");
                Err(ScanError::NoMatch { position })
            }
        }
    }
}

#[cfg(test)]
mod tests;
