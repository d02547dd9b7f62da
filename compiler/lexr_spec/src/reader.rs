//! Reader for the three `%%`-separated sections of a specification.
//!
//! The reader never stops at the first problem: each malformed line is
//! recorded as a [`SpecError`] and reading resumes on the next line, so one
//! run reports every structural error in the file.

use lexr_ir::{
    ActionId, ConditionKind, HintKind, LexemeMode, RuleId, Span, DEFAULT_LEXEME_CAPACITY,
};
use lexr_pattern::is_identifier;
use rustc_hash::FxHashMap;

use crate::error::{SpecError, SpecErrorKind};
use crate::model::{
    ActionDecl, CodeBlock, ConditionDecl, DefinitionDecl, RuleDecl, RuleScope, Specification,
};
use crate::scan::{offset_in, scan_braced, split_lines, split_pattern, Line};

/// Name of the implicit start condition.
pub const INITIAL: &str = "INITIAL";

/// Result of reading a specification: everything that could be read plus
/// every structural error found on the way.
#[derive(Clone, Debug)]
pub struct ParseOutput {
    pub spec: Specification,
    pub errors: Vec<SpecError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Read a whole specification file.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn parse(source: &str) -> ParseOutput {
    let mut reader = Reader::new(source);
    reader.read();
    tracing::debug!(
        conditions = reader.spec.conditions.len(),
        definitions = reader.spec.definitions.len(),
        rules = reader.spec.rules.len(),
        errors = reader.errors.len(),
        "specification read"
    );
    ParseOutput {
        spec: reader.spec,
        errors: reader.errors,
    }
}

/// A rule whose action is `|`, waiting for the next rule's action.
struct PendingRule {
    scope: RuleScope,
    pattern: String,
    pattern_span: Span,
}

/// An open `<list>{` block group.
struct Group {
    scope: RuleScope,
    open: Span,
}

struct Reader<'s> {
    src: &'s str,
    lines: Vec<Line<'s>>,
    idx: usize,
    spec: Specification,
    errors: Vec<SpecError>,
    /// Declared condition names, including `INITIAL`.
    declared: FxHashMap<String, Option<Span>>,
    yylmax: Option<usize>,
}

impl<'s> Reader<'s> {
    fn new(src: &'s str) -> Self {
        let mut declared = FxHashMap::default();
        declared.insert(INITIAL.to_owned(), None);
        Reader {
            src,
            lines: split_lines(src),
            idx: 0,
            spec: Specification::default(),
            errors: Vec::new(),
            declared,
            yylmax: None,
        }
    }

    fn error(&mut self, span: Span, kind: SpecErrorKind) {
        self.errors.push(SpecError::new(span, kind));
    }

    /// Span of `part`, a subslice of `line`.
    fn span_in(line: Line<'_>, part: &str) -> Span {
        let start = line.start + offset_in(line.text, part);
        Span::from_range(start..start + part.len())
    }

    fn line_span(line: Line<'_>) -> Span {
        Span::from_range(line.start..line.start + line.text.len())
    }

    fn read(&mut self) {
        if !self.read_header() {
            let end = self.src.len();
            self.error(
                Span::from_range(end..end),
                SpecErrorKind::MissingSectionSeparator,
            );
            return;
        }
        self.read_rules();
        if let LexemeMode::Array { .. } = self.spec.lexeme_mode {
            self.spec.lexeme_mode = LexemeMode::Array {
                capacity: self.yylmax.unwrap_or(DEFAULT_LEXEME_CAPACITY),
            };
        }
    }

    // Header

    /// Returns `false` if the file ends before a `%%` line.
    fn read_header(&mut self) -> bool {
        while let Some(&line) = self.lines.get(self.idx) {
            let text = line.text;
            if text.starts_with("%%") {
                self.idx += 1;
                return true;
            }
            if text.starts_with("%{") {
                if let Some(block) = self.read_code_block() {
                    self.spec.header_code.push(block);
                }
                continue;
            }
            if text.starts_with("/*") {
                let block = self.read_comment();
                self.spec.header_code.push(block);
                continue;
            }
            self.idx += 1;
            if text.trim().is_empty() {
                continue;
            }
            if text.starts_with(|c: char| c.is_ascii_whitespace()) {
                self.spec.header_code.push(CodeBlock {
                    text: text.to_owned(),
                    span: Self::line_span(line),
                });
            } else if let Some(directive) = text.strip_prefix('%') {
                self.directive(line, directive);
            } else {
                self.definition(line);
            }
        }
        false
    }

    /// `%{ ... %}` starting at the current line; the cursor moves past it.
    fn read_code_block(&mut self) -> Option<CodeBlock> {
        let open = self.lines[self.idx];
        let body_start = open.next;
        self.idx += 1;
        while let Some(&line) = self.lines.get(self.idx) {
            self.idx += 1;
            if line.text.starts_with("%}") {
                return Some(CodeBlock {
                    text: self.src[body_start..line.start].to_owned(),
                    span: Span::from_range(open.start..line.start + line.text.len()),
                });
            }
        }
        self.error(Self::line_span(open), SpecErrorKind::UnterminatedCodeBlock);
        None
    }

    /// A `/* ... */` comment starting at the current line.
    fn read_comment(&mut self) -> CodeBlock {
        let first = self.lines[self.idx];
        let mut last = first;
        while let Some(&line) = self.lines.get(self.idx) {
            self.idx += 1;
            last = line;
            let from = if line.start == first.start { 2 } else { 0 };
            if line.text.get(from..).is_some_and(|rest| rest.contains("*/")) {
                break;
            }
        }
        let end = last.start + last.text.len();
        CodeBlock {
            text: self.src[first.start..end].to_owned(),
            span: Span::from_range(first.start..end),
        }
    }

    fn directive(&mut self, line: Line<'s>, body: &'s str) {
        let word_len = body
            .bytes()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        let word = &body[..word_len];
        let args = body[word_len..].trim();
        let word_span = Span::from_range(line.start..line.start + 1 + word_len);

        match word {
            "s" | "S" | "start" | "Start" => {
                self.declare_conditions(line, args, ConditionKind::Inclusive);
            }
            "x" | "X" | "exclusive" | "Exclusive" => {
                self.declare_conditions(line, args, ConditionKind::Exclusive);
            }
            "array" => self.spec.lexeme_mode = LexemeMode::array(),
            "pointer" => self.spec.lexeme_mode = LexemeMode::Pointer,
            "option" | "options" => self.options(line, args),
            _ => {
                let mut letters = word.chars();
                let hint = match (letters.next(), letters.next()) {
                    (Some(letter), None) => HintKind::from_letter(letter),
                    _ => None,
                };
                let Some(kind) = hint else {
                    self.error(word_span, SpecErrorKind::UnknownDirective(word.to_owned()));
                    return;
                };
                match args.parse::<usize>() {
                    Ok(value) => self.spec.hints.set(kind, value),
                    Err(_) => self.error(
                        Self::line_span(line),
                        SpecErrorKind::InvalidDirectiveArgument {
                            directive: word.to_owned(),
                            detail: if args.is_empty() {
                                "expected a number".to_owned()
                            } else {
                                format!("`{args}` is not a number")
                            },
                        },
                    ),
                }
            }
        }
    }

    fn declare_conditions(&mut self, line: Line<'s>, args: &'s str, kind: ConditionKind) {
        if args.is_empty() {
            self.error(
                Self::line_span(line),
                SpecErrorKind::InvalidDirectiveArgument {
                    directive: if kind == ConditionKind::Inclusive { "s" } else { "x" }.to_owned(),
                    detail: "expected condition names".to_owned(),
                },
            );
            return;
        }
        for name in args.split_whitespace() {
            let span = Self::span_in(line, name);
            if !is_identifier(name) {
                self.error(span, SpecErrorKind::InvalidName(name.to_owned()));
                continue;
            }
            if let Some(&first) = self.declared.get(name) {
                self.error(
                    span,
                    SpecErrorKind::DuplicateCondition {
                        name: name.to_owned(),
                        first,
                    },
                );
                continue;
            }
            self.declared.insert(name.to_owned(), Some(span));
            self.spec.conditions.push(ConditionDecl {
                name: name.to_owned(),
                kind,
                span,
            });
        }
    }

    fn options(&mut self, line: Line<'s>, args: &'s str) {
        for word in args.split_whitespace() {
            match word.to_ascii_lowercase().as_str() {
                "caseless" | "case-insensitive" => self.spec.options.case_insensitive = true,
                "case-sensitive" => self.spec.options.case_insensitive = false,
                "yylineno" => self.spec.options.yylineno = true,
                "noyylineno" => self.spec.options.yylineno = false,
                "array" => self.spec.lexeme_mode = LexemeMode::array(),
                "pointer" => self.spec.lexeme_mode = LexemeMode::Pointer,
                lower => {
                    if let Some(value) = lower.strip_prefix("yylmax=") {
                        match value.parse::<usize>() {
                            Ok(n) if n > 0 => self.yylmax = Some(n),
                            _ => self.error(
                                Self::span_in(line, word),
                                SpecErrorKind::InvalidDirectiveArgument {
                                    directive: "option yylmax".to_owned(),
                                    detail: format!("`{value}` is not a positive number"),
                                },
                            ),
                        }
                    } else {
                        tracing::debug!(option = word, "ignoring option without compile-time effect");
                    }
                }
            }
        }
    }

    fn definition(&mut self, line: Line<'s>) {
        let text = line.text;
        let name_len = text
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(text.len());
        let name = &text[..name_len];
        let name_span = Self::span_in(line, name);
        if !is_identifier(name) {
            self.error(name_span, SpecErrorKind::InvalidName(name.to_owned()));
            return;
        }
        let pattern = text[name_len..].trim();
        let pattern_span = if pattern.is_empty() {
            Span::point(name_span.end)
        } else {
            Self::span_in(line, pattern)
        };
        self.spec.definitions.push(DefinitionDecl {
            name: name.to_owned(),
            pattern: pattern.to_owned(),
            name_span,
            pattern_span,
        });
    }

    // Rules

    fn read_rules(&mut self) {
        let mut groups: Vec<Group> = Vec::new();
        let mut pending: Vec<PendingRule> = Vec::new();

        while let Some(&line) = self.lines.get(self.idx) {
            let text = line.text;
            if text.starts_with("%%") {
                self.spec.trailer = self.src[line.next.min(self.src.len())..].to_owned();
                self.idx = self.lines.len();
                break;
            }
            if text.starts_with("%{") {
                if let Some(block) = self.read_code_block() {
                    self.spec.rule_code.push(block);
                }
                continue;
            }
            let trimmed = text.trim_start();
            if trimmed.is_empty() {
                self.idx += 1;
                continue;
            }
            if trimmed.starts_with("/*") {
                let block = self.read_comment();
                self.spec.rule_code.push(block);
                continue;
            }
            if groups.is_empty() && trimmed.len() != text.len() {
                self.spec.rule_code.push(CodeBlock {
                    text: text.to_owned(),
                    span: Self::line_span(line),
                });
                self.idx += 1;
                continue;
            }
            if trimmed.starts_with('}') {
                let span = Self::span_in(line, &trimmed[..1]);
                if groups.pop().is_none() {
                    self.error(span, SpecErrorKind::UnbalancedGroup { unclosed: false });
                }
                self.idx += 1;
                continue;
            }
            self.rule_line(line, trimmed, &mut groups, &mut pending);
        }

        for group in groups {
            self.error(group.open, SpecErrorKind::UnbalancedGroup { unclosed: true });
        }
        if let Some(last) = pending.last() {
            self.error(last.pattern_span, SpecErrorKind::DanglingContinuation);
        }
    }

    /// One rule (or block-group opener) starting at `text`, a suffix of
    /// `line`. Multi-line actions advance the cursor past their last line.
    fn rule_line(
        &mut self,
        line: Line<'s>,
        text: &'s str,
        groups: &mut Vec<Group>,
        pending: &mut Vec<PendingRule>,
    ) {
        self.idx += 1;
        let (own_scope, rest) = if text.starts_with('<') {
            match self.state_list(line, text) {
                Some(parsed) => parsed,
                None => return,
            }
        } else {
            (RuleScope::Unscoped, text)
        };

        if rest.starts_with('{') && rest[1..].trim().is_empty() {
            groups.push(Group {
                scope: own_scope,
                open: Self::span_in(line, text),
            });
            return;
        }

        let scope = groups
            .iter()
            .fold(RuleScope::Unscoped, |acc, group| acc.union(&group.scope))
            .union(&own_scope);
        let (pattern, after) = split_pattern(rest);
        let pattern_span = Self::span_in(line, pattern);
        if pattern.is_empty() {
            self.error(Self::span_in(line, text), SpecErrorKind::MissingAction);
            return;
        }

        let action = after.trim();
        if action.is_empty() {
            self.error(pattern_span, SpecErrorKind::MissingAction);
            return;
        }
        if action == "|" {
            pending.push(PendingRule {
                scope,
                pattern: pattern.to_owned(),
                pattern_span,
            });
            return;
        }

        let Some((action_text, action_span)) = self.action_body(line, action) else {
            pending.clear();
            return;
        };
        let action_id = ActionId::new(u32::try_from(self.spec.actions.len()).unwrap_or(u32::MAX));
        self.spec.actions.push(ActionDecl {
            id: action_id,
            text: action_text,
            span: action_span,
        });
        for rule in pending.drain(..) {
            self.push_rule(rule.scope, rule.pattern, rule.pattern_span, action_id);
        }
        self.push_rule(scope, pattern.to_owned(), pattern_span, action_id);
    }

    fn push_rule(&mut self, scope: RuleScope, pattern: String, pattern_span: Span, action: ActionId) {
        let id = RuleId::new(u32::try_from(self.spec.rules.len()).unwrap_or(u32::MAX));
        self.spec.rules.push(RuleDecl {
            id,
            scope,
            pattern,
            pattern_span,
            action,
        });
    }

    /// `<A,B>` or `<*>` at the start of `text`; returns the scope and the
    /// text after `>`.
    fn state_list(&mut self, line: Line<'s>, text: &'s str) -> Option<(RuleScope, &'s str)> {
        let Some(close) = text.find('>') else {
            self.error(Self::span_in(line, text), SpecErrorKind::MalformedStateList);
            return None;
        };
        let inner = &text[1..close];
        let rest = &text[close + 1..];
        if inner.trim() == "*" {
            return Some((RuleScope::AllConditions, rest));
        }

        let mut names: Vec<String> = Vec::new();
        let mut ok = true;
        for raw in inner.split(',') {
            let name = raw.trim();
            if name.is_empty() {
                self.error(Self::span_in(line, &text[..=close]), SpecErrorKind::MalformedStateList);
                ok = false;
                continue;
            }
            let span = Self::span_in(line, name);
            if !is_identifier(name) {
                self.error(span, SpecErrorKind::InvalidName(name.to_owned()));
                ok = false;
            } else if !self.declared.contains_key(name) {
                self.error(span, SpecErrorKind::UndeclaredCondition(name.to_owned()));
                ok = false;
            } else if !names.iter().any(|n| n == name) {
                names.push(name.to_owned());
            }
        }
        ok.then_some((RuleScope::Conditions(names), rest))
    }

    /// The action starting at `action` (a suffix of `line`): a braced
    /// block, a `%{ %}` block, or the rest of the line.
    fn action_body(&mut self, line: Line<'s>, action: &'s str) -> Option<(String, Span)> {
        let start = line.start + offset_in(line.text, action);
        let closing = if action.starts_with('{') {
            scan_braced(self.src, start, self.section_end())
        } else if action.starts_with("%{") {
            self.src[start..self.section_end()]
                .find("%}")
                .map(|i| start + i + 2)
        } else {
            return Some((action.to_owned(), Self::span_in(line, action)));
        };

        let Some(end) = closing else {
            self.error(Self::span_in(line, action), SpecErrorKind::UnterminatedAction);
            self.idx = self.section_line_end();
            return None;
        };
        while self.lines.get(self.idx).is_some_and(|l| l.start < end) {
            self.idx += 1;
        }
        Some((self.src[start..end].to_owned(), Span::from_range(start..end)))
    }

    /// Index of the line that ends the rules section (or `lines.len()`).
    fn section_line_end(&self) -> usize {
        self.lines[self.idx..]
            .iter()
            .position(|l| l.text.starts_with("%%"))
            .map_or(self.lines.len(), |p| self.idx + p)
    }

    /// Byte offset where the rules section ends.
    fn section_end(&self) -> usize {
        self.lines
            .get(self.section_line_end())
            .map_or(self.src.len(), |l| l.start)
    }
}
