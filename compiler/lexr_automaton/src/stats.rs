//! Table sizes, reported against the `%p %n %a %e %k %o` hints.

use std::fmt;

use lexr_ir::{CapacityHints, HintKind};

/// Sizes of the internal tables of one compilation.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct TableStats {
    pub parse_nodes: usize,
    /// NFA states summed over every condition.
    pub nfa_states: usize,
    pub nfa_transitions: usize,
    /// DFA states before minimization, summed over every condition.
    pub dfa_states_raw: usize,
    pub dfa_states: usize,
    pub classes: usize,
    pub table_entries: usize,
    pub hints: CapacityHints,
}

impl TableStats {
    /// The size the hint of `kind` bounds.
    pub fn used(&self, kind: HintKind) -> usize {
        match kind {
            HintKind::Positions => self.nfa_states,
            HintKind::States => self.dfa_states,
            HintKind::Transitions => self.nfa_transitions,
            HintKind::ParseNodes => self.parse_nodes,
            HintKind::PackedClasses => self.classes,
            HintKind::OutputSize => self.table_entries,
        }
    }

    /// Hints that were given and turned out too small.
    pub fn exceeded(&self) -> impl Iterator<Item = HintKind> + '_ {
        HintKind::ALL
            .into_iter()
            .filter(|&kind| self.hints.exceeded(kind, self.used(kind)))
    }

    pub(crate) fn log_overflow(&self) {
        for kind in self.exceeded() {
            tracing::debug!(
                hint = self.hints.get(kind),
                used = self.used(kind),
                "{kind} hint exceeded; table grew"
            );
        }
    }
}

/// One `used / hint` line per table, as printed by `lexr tables -v`.
impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in HintKind::ALL {
            let used = self.used(kind);
            let name = kind.to_string();
            match self.hints.get(kind) {
                Some(hint) if used > hint => {
                    writeln!(f, "{name:<24} {used:>8} / {hint} (exceeded)")?;
                }
                Some(hint) => writeln!(f, "{name:<24} {used:>8} / {hint}")?,
                None => writeln!(f, "{name:<24} {used:>8}")?,
            }
        }
        write!(
            f,
            "{:<24} {:>8}",
            "dfa states (unminimized)", self.dfa_states_raw
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exceeded_lists_only_undersized_hints() {
        let mut hints = CapacityHints::default();
        hints.set(HintKind::States, 2);
        hints.set(HintKind::Positions, 1000);
        let stats = TableStats {
            nfa_states: 40,
            dfa_states: 9,
            hints,
            ..TableStats::default()
        };
        assert_eq!(stats.exceeded().collect::<Vec<_>>(), vec![HintKind::States]);
        let text = stats.to_string();
        assert!(text.contains("%n (states)"), "{text}");
        assert!(text.contains("9 / 2 (exceeded)"), "{text}");
        assert!(text.contains("40 / 1000"), "{text}");
    }
}
