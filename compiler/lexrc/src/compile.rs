//! Whole-pipeline compilation of one specification text.

use std::sync::Arc;

use lexr_automaton::{CompileOptions, ScannerTables, TableStats};
use lexr_diagnostic::{Diagnostic, DiagnosticQueue};
use lexr_spec::{SpecError, Specification};

/// A successfully compiled specification.
#[derive(Debug)]
pub struct Compilation {
    pub spec: Specification,
    pub tables: Arc<ScannerTables>,
    pub stats: TableStats,
    /// Non-fatal diagnostics, sorted by position.
    pub warnings: Vec<Diagnostic>,
}

/// Compile `source` into scanner tables.
///
/// On failure returns every diagnostic collected, errors and warnings,
/// sorted by position. Reading problems and pattern problems are reported
/// together; automaton construction only runs when both are clean.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn compile_source(source: &str, options: &CompileOptions) -> Result<Compilation, Vec<Diagnostic>> {
    let out = lexr_spec::parse(source);
    let mut queue = DiagnosticQueue::new();
    queue.extend(out.errors.iter().map(SpecError::to_diagnostic));

    let compiled = lexr_automaton::compile(&out.spec, options, &mut queue);
    let diagnostics = queue.flush();
    match compiled {
        Ok(compiled) => {
            tracing::debug!(
                rules = out.spec.rules.len(),
                states = compiled.stats.dfa_states,
                warnings = diagnostics.len(),
                "compiled"
            );
            Ok(Compilation {
                spec: out.spec,
                tables: Arc::new(compiled.tables),
                stats: compiled.stats,
                warnings: diagnostics,
            })
        }
        Err(_) => Err(diagnostics),
    }
}
