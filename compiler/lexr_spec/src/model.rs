//! The desugared contents of a specification file.

use lexr_ir::{ActionId, CapacityHints, ConditionKind, LexemeMode, RuleId, Span};

/// Opaque code copied from the file (`%{ %}` blocks, indented lines).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CodeBlock {
    pub text: String,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ConditionDecl {
    pub name: String,
    pub kind: ConditionKind,
    pub span: Span,
}

/// `name pattern` from the header.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DefinitionDecl {
    pub name: String,
    pub pattern: String,
    pub name_span: Span,
    pub pattern_span: Span,
}

/// `%option` settings that affect compilation.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct SpecOptions {
    /// `caseless` / `case-insensitive`.
    pub case_insensitive: bool,
    /// `yylineno`: the scanner counts lines.
    pub yylineno: bool,
}

/// Start conditions a rule is active in, before name resolution.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum RuleScope {
    /// No `<...>` prefix: every inclusive condition.
    Unscoped,
    /// `<*>`.
    AllConditions,
    /// Named conditions, deduplicated, in first-mention order.
    Conditions(Vec<String>),
}

impl RuleScope {
    /// Union of two scopes, as used for nested block groups.
    pub fn union(&self, other: &RuleScope) -> RuleScope {
        match (self, other) {
            (RuleScope::AllConditions, _) | (_, RuleScope::AllConditions) => {
                RuleScope::AllConditions
            }
            (RuleScope::Unscoped, s) | (s, RuleScope::Unscoped) => s.clone(),
            (RuleScope::Conditions(a), RuleScope::Conditions(b)) => {
                let mut names = a.clone();
                for name in b {
                    if !names.contains(name) {
                        names.push(name.clone());
                    }
                }
                RuleScope::Conditions(names)
            }
        }
    }
}

/// One rule after block groups and `|` continuations are desugared.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RuleDecl {
    /// Declaration order; lower ids win ties.
    pub id: RuleId,
    pub scope: RuleScope,
    pub pattern: String,
    pub pattern_span: Span,
    pub action: ActionId,
}

/// An action body, shared by every rule continued into it with `|`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ActionDecl {
    pub id: ActionId,
    pub text: String,
    pub span: Span,
}

/// Everything read from a specification file.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Specification {
    pub header_code: Vec<CodeBlock>,
    pub conditions: Vec<ConditionDecl>,
    pub definitions: Vec<DefinitionDecl>,
    pub hints: CapacityHints,
    pub lexeme_mode: LexemeMode,
    pub options: SpecOptions,
    /// Code in the rules section outside any rule.
    pub rule_code: Vec<CodeBlock>,
    pub rules: Vec<RuleDecl>,
    pub actions: Vec<ActionDecl>,
    /// Everything after the second `%%`, verbatim.
    pub trailer: String,
}

impl Specification {
    pub fn action(&self, id: ActionId) -> Option<&ActionDecl> {
        self.actions.get(id.index())
    }

    pub fn rule(&self, id: RuleId) -> Option<&RuleDecl> {
        self.rules.get(id.index())
    }
}
