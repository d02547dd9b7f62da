//! Front door of the pattern stage: definitions plus rule patterns sharing
//! one arena.

use lexr_ir::{CapacityHints, HintKind, Span};

use crate::ast::{PatternArena, RulePattern};
use crate::definitions::DefinitionTable;
use crate::error::{CompileError, DefinitionError};
use crate::parser;

/// Node count reserved when `%e` is absent.
const DEFAULT_NODE_CAPACITY: usize = 256;

/// Owns the pattern arena and the definition table of one specification.
#[derive(Clone, Debug, Default)]
pub struct PatternCompiler {
    arena: PatternArena,
    defs: DefinitionTable,
    hints: CapacityHints,
}

impl PatternCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate the arena from the `%e` hint.
    pub fn with_hints(hints: CapacityHints) -> Self {
        PatternCompiler {
            arena: PatternArena::with_capacity(
                hints.reserve(HintKind::ParseNodes, DEFAULT_NODE_CAPACITY),
            ),
            defs: DefinitionTable::new(),
            hints,
        }
    }

    pub fn define(&mut self, name: &str, text: &str, span: Span) -> Result<(), DefinitionError> {
        self.defs.define(name, text, span)
    }

    /// Expand every definition up front; see [`DefinitionTable::resolve_all`].
    pub fn resolve_definitions(&mut self) -> Vec<CompileError> {
        self.defs.resolve_all(&mut self.arena)
    }

    /// Parse one rule pattern whose text starts at `base` in the file.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn compile_rule(&mut self, text: &str, base: u32) -> Result<RulePattern, CompileError> {
        parser::parse_rule(text, base, &mut self.defs, &mut self.arena)
    }

    pub fn arena(&self) -> &PatternArena {
        &self.arena
    }

    pub fn definitions(&self) -> &DefinitionTable {
        &self.defs
    }

    /// Finish the stage, handing the arena to the automaton builder.
    pub fn finish(self) -> PatternArena {
        let used = self.arena.len();
        if self.hints.exceeded(HintKind::ParseNodes, used) {
            tracing::debug!(
                hint = self.hints.get(HintKind::ParseNodes),
                used,
                "%e hint exceeded; arena grew"
            );
        }
        tracing::debug!(nodes = used, definitions = self.defs.len(), "patterns compiled");
        self.arena
    }
}
