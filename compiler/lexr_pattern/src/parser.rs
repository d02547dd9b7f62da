//! Recursive-descent parser for lex patterns.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! rule    := '^'? alt ('/' alt | '$')?
//! alt     := seq ('|' seq)*
//! seq     := postfix*
//! postfix := atom ('*' | '+' | '?' | '{' n (',' m?)? '}')*
//! atom    := '(' alt ')' | '[' class ']' | '"' quoted '"' | '{' name '}'
//!          | '.' | '\' escape | char
//! ```
//!
//! `^` is an anchor only as the first character of a rule and `$` only as
//! the last; anywhere else (and anywhere in a definition body) both are
//! ordinary characters.

use lexr_ir::{ByteSet, Span};
use smallvec::SmallVec;

use crate::ast::{Node, NodeId, NodeList, PatternArena, RulePattern, Trailing};
use crate::definitions::DefinitionTable;
use crate::error::{CompileError, PatternError, SyntaxReason};
use crate::stack::ensure_sufficient_stack;

/// Largest bound accepted in `{n,m}`.
pub const MAX_REPETITION: u32 = 1000;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Mode {
    Rule,
    Definition,
}

/// Result of decoding one escape sequence or character.
#[derive(Copy, Clone, Debug)]
enum Unit {
    Byte(u8),
    /// A multi-byte UTF-8 character.
    Char(char),
    /// `\d`, `\w`, `\s` and their complements.
    Set(ByteSet),
}

struct Parser<'a, 'd> {
    text: &'a str,
    src: &'a [u8],
    pos: usize,
    base: u32,
    mode: Mode,
    /// Group nesting depth.
    depth: u32,
    defs: &'d mut DefinitionTable,
    arena: &'d mut PatternArena,
}

/// Parse a rule pattern located at byte offset `base` of the specification.
pub fn parse_rule(
    text: &str,
    base: u32,
    defs: &mut DefinitionTable,
    arena: &mut PatternArena,
) -> Result<RulePattern, CompileError> {
    let mut p = Parser::new(text, base, Mode::Rule, defs, arena);
    let span = p.span(0, text.len());
    let bol = p.eat(b'^');

    let head = if p.is_eol_anchor() {
        p.arena.alloc(Node::Empty)
    } else if p.at_end() {
        return Err(p.error(0, text.len(), SyntaxReason::EmptyPattern));
    } else {
        p.parse_alt()?
    };

    let trailing = if p.peek() == Some(b'/') {
        let slash = p.pos;
        p.pos += 1;
        if p.at_end() {
            return Err(p.error(slash, slash + 1, SyntaxReason::EmptyPattern));
        }
        if p.is_eol_anchor() {
            return Err(p.error(p.pos, p.pos + 1, SyntaxReason::TrailingContextWithEndOfLine));
        }
        let tail = p.parse_alt()?;
        match p.peek() {
            Some(b'/') => {
                return Err(p.error(p.pos, p.pos + 1, SyntaxReason::MultipleTrailingContext));
            }
            _ if p.is_eol_anchor() => {
                return Err(p.error(p.pos, p.pos + 1, SyntaxReason::TrailingContextWithEndOfLine));
            }
            _ => Trailing::Context(tail),
        }
    } else if p.is_eol_anchor() {
        p.pos += 1;
        Trailing::EndOfLine
    } else {
        Trailing::None
    };

    p.expect_end()?;
    Ok(RulePattern {
        head,
        trailing,
        bol,
        span,
    })
}

/// Parse a definition body; anchors and `/` have no special meaning here.
pub(crate) fn parse_definition(
    text: &str,
    base: u32,
    defs: &mut DefinitionTable,
    arena: &mut PatternArena,
) -> Result<NodeId, CompileError> {
    let mut p = Parser::new(text, base, Mode::Definition, defs, arena);
    if p.at_end() {
        return Err(p.error(0, 0, SyntaxReason::EmptyPattern));
    }
    let node = p.parse_alt()?;
    p.expect_end()?;
    Ok(node)
}

impl<'a, 'd> Parser<'a, 'd> {
    fn new(
        text: &'a str,
        base: u32,
        mode: Mode,
        defs: &'d mut DefinitionTable,
        arena: &'d mut PatternArena,
    ) -> Self {
        Parser {
            text,
            src: text.as_bytes(),
            pos: 0,
            base,
            mode,
            depth: 0,
            defs,
            arena,
        }
    }

    // Cursor helpers

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn span(&self, start: usize, end: usize) -> Span {
        let start = u32::try_from(start).unwrap_or(u32::MAX);
        let end = u32::try_from(end).unwrap_or(u32::MAX);
        Span::new(start, end.max(start)).offset_by(self.base)
    }

    fn error(&self, start: usize, end: usize, reason: SyntaxReason) -> CompileError {
        PatternError::new(self.span(start, end), reason).into()
    }

    /// `$` as the last character of a rule, outside any group.
    fn is_eol_anchor(&self) -> bool {
        self.mode == Mode::Rule
            && self.depth == 0
            && self.pos + 1 == self.src.len()
            && self.peek() == Some(b'$')
    }

    /// Whether the current sequence ends here.
    fn at_seq_end(&self) -> bool {
        match self.peek() {
            None | Some(b'|' | b')') => true,
            Some(b'/') => self.mode == Mode::Rule && self.depth == 0,
            Some(_) => self.is_eol_anchor(),
        }
    }

    fn expect_end(&self) -> Result<(), CompileError> {
        match self.peek() {
            None => Ok(()),
            Some(b')') => Err(self.error(self.pos, self.pos + 1, SyntaxReason::UnmatchedParen)),
            Some(_) => Err(self.error(
                self.pos,
                self.src.len(),
                SyntaxReason::MisplacedTrailingContext,
            )),
        }
    }

    // Structure

    fn parse_alt(&mut self) -> Result<NodeId, CompileError> {
        let mut branches: NodeList = SmallVec::new();
        loop {
            let start = self.pos;
            let branch = self.parse_seq()?;
            if branch.is_none() && self.depth == 0 {
                let reason = if branches.is_empty() && self.at_end() {
                    SyntaxReason::EmptyPattern
                } else {
                    SyntaxReason::EmptyAlternative
                };
                return Err(self.error(start, (start + 1).min(self.src.len()), reason));
            }
            let branch = match branch {
                Some(node) => node,
                None => self.arena.alloc(Node::Empty),
            };
            branches.push(branch);
            if !self.eat(b'|') {
                break;
            }
        }
        Ok(self.arena.alt(branches))
    }

    /// A concatenation, or `None` when it is empty.
    fn parse_seq(&mut self) -> Result<Option<NodeId>, CompileError> {
        let mut items: SmallVec<[NodeId; 8]> = SmallVec::new();
        while !self.at_seq_end() {
            items.push(self.parse_postfix()?);
        }
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.arena.concat(items)))
    }

    fn parse_postfix(&mut self) -> Result<NodeId, CompileError> {
        let mut node = self.parse_atom()?;
        loop {
            let (min, max) = match self.peek() {
                Some(b'*') => (0, None),
                Some(b'+') => (1, None),
                Some(b'?') => (0, Some(1)),
                Some(b'{') if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => {
                    node = self.parse_bounds(node)?;
                    continue;
                }
                _ => break,
            };
            self.pos += 1;
            node = self.arena.alloc(Node::Repeat { node, min, max });
        }
        Ok(node)
    }

    /// `{n}`, `{n,}` or `{n,m}` applied to `node`; the cursor is on `{`.
    fn parse_bounds(&mut self, node: NodeId) -> Result<NodeId, CompileError> {
        let open = self.pos;
        self.pos += 1;
        let min = self.parse_number(open)?;
        let max = if self.eat(b',') {
            if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                Some(self.parse_number(open)?)
            } else {
                None
            }
        } else {
            Some(min)
        };
        if !self.eat(b'}') {
            let reason = if self.at_end() {
                SyntaxReason::UnclosedBrace
            } else {
                SyntaxReason::InvalidRepetition
            };
            return Err(self.error(open, self.pos, reason));
        }
        if max.is_some_and(|m| m < min) {
            return Err(self.error(open, self.pos, SyntaxReason::InvalidRepetition));
        }
        if min == 1 && max == Some(1) {
            return Ok(node);
        }
        Ok(self.arena.alloc(Node::Repeat { node, min, max }))
    }

    fn parse_number(&mut self, open: usize) -> Result<u32, CompileError> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = &self.text[start..self.pos];
        if digits.is_empty() {
            return Err(self.error(open, self.pos, SyntaxReason::InvalidRepetition));
        }
        match digits.parse::<u32>() {
            Ok(n) if n <= MAX_REPETITION => Ok(n),
            _ => Err(self.error(
                open,
                self.pos,
                SyntaxReason::RepetitionTooLarge {
                    limit: MAX_REPETITION,
                },
            )),
        }
    }

    fn parse_atom(&mut self) -> Result<NodeId, CompileError> {
        let start = self.pos;
        let Some(byte) = self.peek() else {
            return Err(self.error(start, start, SyntaxReason::EmptyPattern));
        };
        match byte {
            b'(' => ensure_sufficient_stack(|| self.parse_group()),
            b'[' => self.parse_class(),
            b'"' => self.parse_quoted(),
            b'{' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => Err(self.error(
                start,
                start + 1,
                SyntaxReason::DanglingOperator('{'),
            )),
            b'{' => self.parse_reference(),
            b'.' => {
                self.pos += 1;
                Ok(self.arena.alloc(Node::Class(ByteSet::any_but_newline())))
            }
            b'*' | b'+' | b'?' => Err(self.error(
                start,
                start + 1,
                SyntaxReason::DanglingOperator(byte as char),
            )),
            b'/' => Err(self.error(start, start + 1, SyntaxReason::MisplacedTrailingContext)),
            b'\\' => {
                self.pos += 1;
                let unit = self.parse_escape(true)?;
                Ok(self.unit_node(unit))
            }
            _ => {
                let unit = self.next_char();
                Ok(self.unit_node(unit))
            }
        }
    }

    fn unit_node(&mut self, unit: Unit) -> NodeId {
        match unit {
            Unit::Byte(b) => self.arena.alloc(Node::Literal(Box::new([b]))),
            Unit::Char(c) => {
                let mut buf = [0u8; 4];
                let bytes: Box<[u8]> = c.encode_utf8(&mut buf).as_bytes().into();
                self.arena.alloc(Node::Literal(bytes))
            }
            Unit::Set(set) => self.arena.alloc(Node::Class(set)),
        }
    }

    /// Consume one (possibly multi-byte) character.
    fn next_char(&mut self) -> Unit {
        let c = self.text[self.pos..].chars().next().unwrap_or('\0');
        self.pos += c.len_utf8().max(1);
        if c.is_ascii() {
            Unit::Byte(c as u8)
        } else {
            Unit::Char(c)
        }
    }

    fn parse_group(&mut self) -> Result<NodeId, CompileError> {
        let open = self.pos;
        self.pos += 1;
        if self.peek() == Some(b')') {
            return Err(self.error(open, open + 2, SyntaxReason::EmptyGroup));
        }
        self.depth += 1;
        let inner = self.parse_alt();
        self.depth -= 1;
        let inner = inner?;
        if !self.eat(b')') {
            return Err(self.error(open, open + 1, SyntaxReason::UnclosedGroup));
        }
        Ok(inner)
    }

    fn parse_reference(&mut self) -> Result<NodeId, CompileError> {
        let open = self.pos;
        self.pos += 1;
        let name_start = self.pos;
        while self.peek().is_some_and(|b| b != b'}') {
            self.pos += 1;
        }
        if self.at_end() {
            return Err(self.error(open, self.pos, SyntaxReason::UnclosedBrace));
        }
        let name = &self.text[name_start..self.pos];
        self.pos += 1;
        let span = self.span(open, self.pos);
        if !is_identifier(name) {
            return Err(PatternError::new(
                span,
                SyntaxReason::InvalidReferenceName(name.to_owned()),
            )
            .into());
        }
        self.defs.resolve(name, span, self.arena)
    }

    fn parse_quoted(&mut self) -> Result<NodeId, CompileError> {
        let open = self.pos;
        self.pos += 1;
        let mut bytes: Vec<u8> = Vec::new();
        loop {
            match self.peek() {
                None => return Err(self.error(open, self.pos, SyntaxReason::UnclosedQuote)),
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    push_unit(&mut bytes, self.parse_escape(false)?);
                }
                Some(_) => {
                    let unit = self.next_char();
                    push_unit(&mut bytes, unit);
                }
            }
        }
        if bytes.is_empty() {
            return Ok(self.arena.alloc(Node::Empty));
        }
        Ok(self.arena.alloc(Node::Literal(bytes.into_boxed_slice())))
    }

    fn parse_class(&mut self) -> Result<NodeId, CompileError> {
        let open = self.pos;
        self.pos += 1;
        let negate = self.eat(b'^');
        let mut set = ByteSet::EMPTY;
        let mut first = true;
        loop {
            let item_start = self.pos;
            let lo = match self.peek() {
                None => return Err(self.error(open, self.pos, SyntaxReason::UnclosedClass)),
                Some(b']') if !first => {
                    self.pos += 1;
                    break;
                }
                Some(b'[') if self.peek_at(1) == Some(b':') => {
                    if let Some(posix) = self.parse_posix()? {
                        set = set.union(&posix);
                        first = false;
                        continue;
                    }
                    self.pos += 1;
                    Unit::Byte(b'[')
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.parse_escape(true)?
                }
                Some(_) => self.next_char(),
            };
            first = false;

            let is_range = self.peek() == Some(b'-')
                && self.peek_at(1).is_some_and(|b| b != b']');
            if !is_range {
                match lo {
                    Unit::Byte(b) => set.insert(b),
                    Unit::Char(c) => {
                        let mut buf = [0u8; 4];
                        for &b in c.encode_utf8(&mut buf).as_bytes() {
                            set.insert(b);
                        }
                    }
                    Unit::Set(s) => set = set.union(&s),
                }
                continue;
            }

            self.pos += 1;
            let hi = if self.peek() == Some(b'\\') {
                self.pos += 1;
                self.parse_escape(true)?
            } else {
                self.next_char()
            };
            match (lo, hi) {
                (Unit::Byte(lo), Unit::Byte(hi)) if lo <= hi => set.insert_range(lo, hi),
                (Unit::Byte(lo), Unit::Byte(hi)) => {
                    return Err(self.error(
                        item_start,
                        self.pos,
                        SyntaxReason::ReversedRange { lo, hi },
                    ));
                }
                _ => return Err(self.error(item_start, self.pos, SyntaxReason::NonByteRange)),
            }
        }
        if negate {
            set = set.complement();
        }
        Ok(self.arena.alloc(Node::Class(set)))
    }

    /// `[:name:]` inside a class. Returns `None` (cursor unchanged) when the
    /// `[:` is not closed by `:]`, in which case `[` is an ordinary member.
    fn parse_posix(&mut self) -> Result<Option<ByteSet>, CompileError> {
        let start = self.pos;
        let rest = &self.text[start + 2..];
        let Some(close) = rest.find(":]") else {
            return Ok(None);
        };
        let name = &rest[..close];
        if !name.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Ok(None);
        }
        let end = start + 2 + close + 2;
        match posix_class(name) {
            Some(set) => {
                self.pos = end;
                Ok(Some(set))
            }
            None => Err(self.error(
                start,
                end,
                SyntaxReason::UnknownPosixClass(name.to_owned()),
            )),
        }
    }

    /// Decode an escape; the cursor is just past the backslash.
    ///
    /// `sets` enables the `\d \w \s` shorthands (off inside quotes).
    fn parse_escape(&mut self, sets: bool) -> Result<Unit, CompileError> {
        let Some(byte) = self.peek() else {
            return Err(self.error(
                self.pos.saturating_sub(1),
                self.pos,
                SyntaxReason::TrailingBackslash,
            ));
        };
        let simple = match byte {
            b'n' => Some(b'\n'),
            b't' => Some(b'\t'),
            b'r' => Some(b'\r'),
            b'f' => Some(0x0c),
            b'v' => Some(0x0b),
            b'a' => Some(0x07),
            b'b' => Some(0x08),
            b'e' => Some(0x1b),
            _ => None,
        };
        if let Some(b) = simple {
            self.pos += 1;
            return Ok(Unit::Byte(b));
        }
        match byte {
            b'0'..=b'7' => {
                let mut value: u32 = 0;
                let mut digits = 0;
                while digits < 3 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') if value * 8 + u32::from(d - b'0') <= 0xff => {
                            value = value * 8 + u32::from(d - b'0');
                            self.pos += 1;
                            digits += 1;
                        }
                        _ => break,
                    }
                }
                Ok(Unit::Byte(value as u8))
            }
            b'x' if self.peek_at(1).is_some_and(|b| b.is_ascii_hexdigit()) => {
                self.pos += 1;
                let mut value: u8 = 0;
                for _ in 0..2 {
                    match self.peek().and_then(|b| (b as char).to_digit(16)) {
                        Some(d) => {
                            value = value * 16 + d as u8;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                Ok(Unit::Byte(value))
            }
            b'd' | b'w' | b's' | b'D' | b'W' | b'S' if sets => {
                self.pos += 1;
                let set = match byte.to_ascii_lowercase() {
                    b'd' => ByteSet::range(b'0', b'9'),
                    b'w' => word_set(),
                    _ => space_set(),
                };
                Ok(Unit::Set(if byte.is_ascii_uppercase() {
                    set.complement()
                } else {
                    set
                }))
            }
            _ => Ok(self.next_char()),
        }
    }
}

fn push_unit(bytes: &mut Vec<u8>, unit: Unit) {
    match unit {
        Unit::Byte(b) => bytes.push(b),
        Unit::Char(c) => {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        // Shorthands are disabled inside quotes.
        Unit::Set(_) => {}
    }
}

/// C identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn word_set() -> ByteSet {
    let mut set = posix_class("alnum").unwrap_or(ByteSet::EMPTY);
    set.insert(b'_');
    set
}

fn space_set() -> ByteSet {
    posix_class("space").unwrap_or(ByteSet::EMPTY)
}

/// The byte set named by a POSIX bracket expression.
pub fn posix_class(name: &str) -> Option<ByteSet> {
    let set = match name {
        "alnum" => (0u8..=127).filter(u8::is_ascii_alphanumeric).collect(),
        "alpha" => (0u8..=127).filter(u8::is_ascii_alphabetic).collect(),
        "blank" => [b' ', b'\t'].into_iter().collect(),
        "cntrl" => (0u8..=127).filter(u8::is_ascii_control).collect(),
        "digit" => ByteSet::range(b'0', b'9'),
        "graph" => (0u8..=127).filter(u8::is_ascii_graphic).collect(),
        "lower" => ByteSet::range(b'a', b'z'),
        "print" => ByteSet::range(b' ', b'~'),
        "punct" => (0u8..=127).filter(u8::is_ascii_punctuation).collect(),
        "space" => [b' ', b'\t', b'\n', 0x0b, 0x0c, b'\r'].into_iter().collect(),
        "upper" => ByteSet::range(b'A', b'Z'),
        "xdigit" => (0u8..=127).filter(u8::is_ascii_hexdigit).collect(),
        _ => return None,
    };
    Some(set)
}
