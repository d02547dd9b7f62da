//! Lexeme storage mode (`%array` / `%pointer`).

/// Default capacity of the bounded lexeme buffer (the traditional `YYLMAX`).
pub const DEFAULT_LEXEME_CAPACITY: usize = 8192;

/// How the runtime exposes the text of a match to actions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum LexemeMode {
    /// `%array`: the lexeme is copied into a fixed-capacity buffer.
    /// Matches longer than `capacity` fail with `LexemeTooLong`.
    Array { capacity: usize },
    /// `%pointer`: the lexeme is a slice of the input buffer, valid until
    /// the next match.
    #[default]
    Pointer,
}

impl LexemeMode {
    pub const fn array() -> Self {
        LexemeMode::Array {
            capacity: DEFAULT_LEXEME_CAPACITY,
        }
    }
}
