//! The compilation pipeline: definitions, rule patterns, conditions,
//! automata.

use lexr_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, ErrorGuaranteed};
use lexr_pattern::PatternCompiler;
use lexr_spec::{SpecError, SpecErrorKind, Specification};

use crate::build::{build, unreachable_rules, RuleInput};
use crate::conditions::{ConditionRegistry, MAX_CONDITIONS};
use crate::options::CompileOptions;
use crate::stats::TableStats;
use crate::tables::ScannerTables;

/// Output of a successful compilation.
#[derive(Clone, Debug)]
pub struct Compiled {
    pub tables: ScannerTables,
    pub stats: TableStats,
}

/// Compile a parsed specification into scanner tables.
///
/// Definition and pattern errors are pushed to `queue`; all of them are
/// collected before giving up. Construction is skipped when `queue` holds
/// any error afterwards, including errors recorded before the call (such
/// as those from reading the file). Unreachable-rule warnings are pushed
/// when `options.report_unreachable` is set.
#[tracing::instrument(level = "debug", skip_all, fields(rules = spec.rules.len()))]
pub fn compile(
    spec: &Specification,
    options: &CompileOptions,
    queue: &mut DiagnosticQueue,
) -> Result<Compiled, ErrorGuaranteed> {
    let mut patterns = PatternCompiler::with_hints(spec.hints);
    for def in &spec.definitions {
        if let Err(e) = patterns.define(&def.name, &def.pattern, def.pattern_span) {
            queue.push(e.to_diagnostic());
        }
    }
    for e in patterns.resolve_definitions() {
        queue.push(e.to_diagnostic());
    }

    let mut registry = ConditionRegistry::new();
    for cond in &spec.conditions {
        if registry.declare(&cond.name, cond.kind).is_err() {
            queue.push(
                SpecError::new(cond.span, SpecErrorKind::TooManyConditions { limit: MAX_CONDITIONS })
                    .to_diagnostic(),
            );
            break;
        }
    }

    let mut rules = Vec::with_capacity(spec.rules.len());
    for decl in &spec.rules {
        match patterns.compile_rule(&decl.pattern, decl.pattern_span.start) {
            Ok(pattern) => rules.push(RuleInput {
                id: decl.id,
                action: decl.action,
                pattern,
                text: decl.pattern.clone(),
                span: decl.pattern_span,
            }),
            Err(e) => queue.push(e.to_diagnostic()),
        }
        if let Err(name) = registry.add_rule(decl.id, &decl.scope) {
            queue.push(
                SpecError::new(decl.pattern_span, SpecErrorKind::UndeclaredCondition(name))
                    .to_diagnostic(),
            );
        }
    }

    if let Some(guar) = queue.error_guaranteed() {
        tracing::debug!(errors = queue.error_count(), "compilation stopped before construction");
        return Err(guar);
    }

    let arena = patterns.finish();
    let fold_case = options.case_insensitive || spec.options.case_insensitive;
    let built = build(&arena, &rules, &registry, fold_case, spec.hints);

    if options.report_unreachable {
        for (rule, winner) in unreachable_rules(&built.automata, rules.len()) {
            queue.push(unreachable_warning(&rules, rule, winner));
        }
    }

    Ok(Compiled {
        tables: ScannerTables {
            classes: built.classes,
            conditions: registry,
            automata: built.automata,
            rules: built.rules,
            lexeme_mode: spec.lexeme_mode,
            count_lines: spec.options.yylineno,
        },
        stats: built.stats,
    })
}

fn unreachable_warning(
    rules: &[RuleInput],
    rule: lexr_ir::RuleId,
    winner: Option<lexr_ir::RuleId>,
) -> Diagnostic {
    let Some(input) = rules.get(rule.index()) else {
        return Diagnostic::warning(ErrorCode::W3001)
            .with_message(format!("rule {rule} can never be matched"));
    };
    let mut diag = Diagnostic::warning(ErrorCode::W3001)
        .with_message(format!("rule `{}` can never be matched", input.text))
        .with_label(input.span, "never selected");
    if let Some(earlier) = winner.and_then(|w| rules.get(w.index())) {
        diag = diag
            .with_secondary_label(earlier.span, "this rule matches the same text first")
            .with_note("on equal match lengths the rule listed first wins");
    }
    diag.with_suggestion("move the rule above the rule that shadows it, or remove it")
}
