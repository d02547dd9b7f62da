//! Named pattern definitions (`digit [0-9]`).
//!
//! A definition's body is parsed the first time it is referenced, and the
//! resulting subtree is shared by every later reference. Expansion keeps
//! the active path on a stack so `a {b}` / `b {a}` is reported as a cycle
//! instead of recursing forever.

use lexr_ir::Span;
use rustc_hash::FxHashMap;

use crate::ast::{NodeId, PatternArena};
use crate::error::{CompileError, DefinitionError, DefinitionErrorKind};
use crate::parser;

#[derive(Clone, Debug)]
enum Resolution {
    Unresolved,
    Resolving,
    Resolved(NodeId),
    Failed(CompileError),
}

#[derive(Clone, Debug)]
struct Definition {
    name: String,
    text: String,
    /// Span of the pattern text in the specification file.
    span: Span,
    state: Resolution,
}

/// Table of named definitions, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct DefinitionTable {
    index: FxHashMap<String, usize>,
    defs: Vec<Definition>,
    /// Indices of definitions currently being expanded.
    active: Vec<usize>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` with the pattern `text` found at `span`.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        text: impl Into<String>,
        span: Span,
    ) -> Result<(), DefinitionError> {
        let name = name.into();
        if let Some(&existing) = self.index.get(&name) {
            return Err(DefinitionError {
                span,
                kind: DefinitionErrorKind::Duplicate {
                    name,
                    first: self.defs[existing].span,
                },
            });
        }
        self.index.insert(name.clone(), self.defs.len());
        self.defs.push(Definition {
            name,
            text: text.into(),
            span,
            state: Resolution::Unresolved,
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(|d| d.name.as_str())
    }

    /// The raw pattern text of `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&i| self.defs[i].text.as_str())
    }

    /// Expand `name`, referenced at `use_span`, into a node of `arena`.
    ///
    /// Results (including failures) are memoized, so every reference to a
    /// broken definition reports the same error.
    pub fn resolve(
        &mut self,
        name: &str,
        use_span: Span,
        arena: &mut PatternArena,
    ) -> Result<NodeId, CompileError> {
        let Some(&idx) = self.index.get(name) else {
            return Err(DefinitionError {
                span: use_span,
                kind: DefinitionErrorKind::Undefined {
                    name: name.to_owned(),
                },
            }
            .into());
        };

        match &self.defs[idx].state {
            Resolution::Resolved(node) => return Ok(*node),
            Resolution::Failed(err) => return Err(err.clone()),
            Resolution::Resolving => {
                let mut path: Vec<String> = self
                    .active
                    .iter()
                    .skip_while(|&&i| i != idx)
                    .map(|&i| self.defs[i].name.clone())
                    .collect();
                path.push(name.to_owned());
                return Err(DefinitionError {
                    span: use_span,
                    kind: DefinitionErrorKind::Cyclic { path },
                }
                .into());
            }
            Resolution::Unresolved => {}
        }

        tracing::trace!(name, "expanding definition");
        self.defs[idx].state = Resolution::Resolving;
        self.active.push(idx);
        let text = self.defs[idx].text.clone();
        let base = self.defs[idx].span.start;
        let result = parser::parse_definition(&text, base, self, arena);
        self.active.pop();

        self.defs[idx].state = match &result {
            Ok(node) => Resolution::Resolved(*node),
            Err(err) => Resolution::Failed(err.clone()),
        };
        result
    }

    /// Resolve every definition, returning each distinct failure once.
    ///
    /// Unused definitions are checked too, so a typo in a definition nobody
    /// references still fails compilation.
    pub fn resolve_all(&mut self, arena: &mut PatternArena) -> Vec<CompileError> {
        let mut errors: Vec<CompileError> = Vec::new();
        for idx in 0..self.defs.len() {
            let name = self.defs[idx].name.clone();
            let span = self.defs[idx].span;
            if let Err(err) = self.resolve(&name, span, arena) {
                if !errors.contains(&err) {
                    errors.push(err);
                }
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests;
