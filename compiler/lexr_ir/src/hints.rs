//! Table-size capacity hints (`%p %n %a %e %k %o`).
//!
//! Legacy lex implementations sized their internal tables from these
//! directives and aborted when a table overflowed. Here they are only
//! preallocation hints: builders reserve the hinted capacity and keep
//! growing past it.

use std::fmt;

/// Largest capacity a hint may preallocate; builders grow past it on demand.
pub const MAX_RESERVE: usize = 1 << 16;

/// Which internal table a hint refers to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum HintKind {
    /// `%p`: NFA positions (states).
    Positions,
    /// `%n`: DFA states.
    States,
    /// `%a`: NFA transitions.
    Transitions,
    /// `%e`: pattern parse-tree nodes.
    ParseNodes,
    /// `%k`: packed character classes.
    PackedClasses,
    /// `%o`: output table entries.
    OutputSize,
}

impl HintKind {
    pub const ALL: [HintKind; 6] = [
        HintKind::Positions,
        HintKind::States,
        HintKind::Transitions,
        HintKind::ParseNodes,
        HintKind::PackedClasses,
        HintKind::OutputSize,
    ];

    /// Parse the directive letter (case-insensitive).
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'p' => Some(HintKind::Positions),
            'n' => Some(HintKind::States),
            'a' => Some(HintKind::Transitions),
            'e' => Some(HintKind::ParseNodes),
            'k' => Some(HintKind::PackedClasses),
            'o' => Some(HintKind::OutputSize),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            HintKind::Positions => 'p',
            HintKind::States => 'n',
            HintKind::Transitions => 'a',
            HintKind::ParseNodes => 'e',
            HintKind::PackedClasses => 'k',
            HintKind::OutputSize => 'o',
        }
    }

    fn slot(self) -> usize {
        match self {
            HintKind::Positions => 0,
            HintKind::States => 1,
            HintKind::Transitions => 2,
            HintKind::ParseNodes => 3,
            HintKind::PackedClasses => 4,
            HintKind::OutputSize => 5,
        }
    }
}

impl fmt::Display for HintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HintKind::Positions => "positions",
            HintKind::States => "states",
            HintKind::Transitions => "transitions",
            HintKind::ParseNodes => "parse nodes",
            HintKind::PackedClasses => "packed classes",
            HintKind::OutputSize => "output table",
        };
        write!(f, "%{} ({name})", self.letter())
    }
}

/// The six optional capacity hints of a specification.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CapacityHints {
    values: [Option<usize>; 6],
}

impl CapacityHints {
    pub fn set(&mut self, kind: HintKind, value: usize) {
        self.values[kind.slot()] = Some(value);
    }

    pub fn get(&self, kind: HintKind) -> Option<usize> {
        self.values[kind.slot()]
    }

    /// Capacity to reserve for `kind`, or `fallback` when no hint was given.
    ///
    /// Never more than [`MAX_RESERVE`].
    pub fn reserve(&self, kind: HintKind, fallback: usize) -> usize {
        self.get(kind).unwrap_or(fallback).min(MAX_RESERVE)
    }

    /// Whether any directive was present.
    pub fn any(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }

    /// Whether `used` exceeds the hinted capacity for `kind`.
    ///
    /// Always `false` without a hint.
    pub fn exceeded(&self, kind: HintKind, used: usize) -> bool {
        self.get(kind).is_some_and(|hint| used > hint)
    }
}
