//! Reader for lex specification files.
//!
//! A specification has three sections separated by `%%` lines:
//!
//! ```text
//! %{ #include "tokens.h" %}      header: code, %s/%x, %p..%o, %array,
//! digit   [0-9]                          %option, definitions
//! %x COMMENT
//! %%
//! {digit}+        { return NUM; }        rules: [<list>]pattern action
//! "/*"            BEGIN(COMMENT);
//! <COMMENT>{
//!   "*/"          BEGIN(INITIAL);
//!   .|\n          ;
//! }
//! %%
//! int yywrap(void) { return 1; }         trailer: copied verbatim
//! ```
//!
//! Block groups and `|` continuations are desugared here: every
//! [`RuleDecl`] carries its own scope and [`ActionId`](lexr_ir::ActionId).
//! Patterns and action bodies stay as text; patterns are compiled by
//! `lexr_pattern`, actions are opaque.

mod error;
mod model;
mod reader;
mod scan;

pub use error::{SpecError, SpecErrorKind};
pub use model::{
    ActionDecl, CodeBlock, ConditionDecl, DefinitionDecl, RuleDecl, RuleScope, SpecOptions,
    Specification,
};
pub use reader::{parse, ParseOutput, INITIAL};
