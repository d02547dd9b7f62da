//! Start-condition registry.
//!
//! Maps condition names to [`CondId`]s and records, per condition, the
//! rules active in it. `INITIAL` is always `CondId(0)` and inclusive.

use lexr_ir::{CondId, ConditionKind, RuleId};
use lexr_spec::RuleScope;
use rustc_hash::FxHashMap;

/// Number of conditions a registry can hold, `INITIAL` included.
pub const MAX_CONDITIONS: usize = u16::MAX as usize + 1;

/// Returned by [`ConditionRegistry::declare`] once the registry is full.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct TooManyConditions;

/// A declared start condition and the rules active in it.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct StartCondition {
    pub name: String,
    pub kind: ConditionKind,
    /// Active rules in ascending id order.
    pub rules: Vec<RuleId>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionRegistry {
    conditions: Vec<StartCondition>,
    by_name: FxHashMap<String, CondId>,
}

impl Default for ConditionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionRegistry {
    /// Registry holding only `INITIAL`.
    pub fn new() -> Self {
        let mut by_name = FxHashMap::default();
        by_name.insert(lexr_spec::INITIAL.to_owned(), CondId::INITIAL);
        ConditionRegistry {
            conditions: vec![StartCondition {
                name: lexr_spec::INITIAL.to_owned(),
                kind: ConditionKind::Inclusive,
                rules: Vec::new(),
            }],
            by_name,
        }
    }

    /// Declare a condition, returning its id.
    ///
    /// Redeclaring a name returns the existing id and keeps the first kind;
    /// the reader reports the duplicate. Fails once [`MAX_CONDITIONS`] are
    /// declared.
    pub fn declare(&mut self, name: &str, kind: ConditionKind) -> Result<CondId, TooManyConditions> {
        if let Some(&id) = self.by_name.get(name) {
            return Ok(id);
        }
        let index = u16::try_from(self.conditions.len()).map_err(|_| TooManyConditions)?;
        let id = CondId::new(index);
        self.conditions.push(StartCondition {
            name: name.to_owned(),
            kind,
            rules: Vec::new(),
        });
        self.by_name.insert(name.to_owned(), id);
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<CondId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: CondId) -> Option<&StartCondition> {
        self.conditions.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CondId, &StartCondition)> {
        (0..=u16::MAX)
            .zip(&self.conditions)
            .map(|(i, c)| (CondId::new(i), c))
    }

    /// Activate `rule` in every condition its scope selects.
    ///
    /// Rules must be added in ascending id order. On an unknown name the
    /// rule is still added to the conditions that do exist and the first
    /// unknown name is returned.
    pub fn add_rule(&mut self, rule: RuleId, scope: &RuleScope) -> Result<(), String> {
        match scope {
            RuleScope::Unscoped => {
                for cond in &mut self.conditions {
                    if cond.kind == ConditionKind::Inclusive {
                        cond.rules.push(rule);
                    }
                }
                Ok(())
            }
            RuleScope::AllConditions => {
                for cond in &mut self.conditions {
                    cond.rules.push(rule);
                }
                Ok(())
            }
            RuleScope::Conditions(names) => {
                let mut unknown = None;
                for name in names {
                    match self.by_name.get(name.as_str()) {
                        Some(id) => self.conditions[id.index()].rules.push(rule),
                        None => {
                            unknown.get_or_insert_with(|| name.clone());
                        }
                    }
                }
                unknown.map_or(Ok(()), Err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(list: &[&str]) -> RuleScope {
        RuleScope::Conditions(list.iter().map(|s| (*s).to_owned()).collect())
    }

    #[test]
    fn initial_is_first_and_inclusive() {
        let registry = ConditionRegistry::new();
        assert_eq!(registry.lookup("INITIAL"), Some(CondId::INITIAL));
        let initial = registry.get(CondId::INITIAL).map(|c| c.kind);
        assert_eq!(initial, Some(ConditionKind::Inclusive));
    }

    #[test]
    fn inclusive_and_exclusive_rule_sets() {
        let mut registry = ConditionRegistry::new();
        let s = registry.declare("S", ConditionKind::Inclusive).unwrap();
        let x = registry.declare("X", ConditionKind::Exclusive).unwrap();

        registry.add_rule(RuleId::new(0), &RuleScope::Unscoped).unwrap();
        registry.add_rule(RuleId::new(1), &names(&["S"])).unwrap();
        registry.add_rule(RuleId::new(2), &names(&["X"])).unwrap();
        registry.add_rule(RuleId::new(3), &RuleScope::AllConditions).unwrap();

        let rules = |id: CondId| registry.get(id).unwrap().rules.clone();
        assert_eq!(rules(CondId::INITIAL), vec![RuleId::new(0), RuleId::new(3)]);
        assert_eq!(
            rules(s),
            vec![RuleId::new(0), RuleId::new(1), RuleId::new(3)]
        );
        assert_eq!(rules(x), vec![RuleId::new(2), RuleId::new(3)]);
    }

    #[test]
    fn unknown_condition_is_reported() {
        let mut registry = ConditionRegistry::new();
        let err = registry.add_rule(RuleId::new(0), &names(&["INITIAL", "NOPE"]));
        assert_eq!(err, Err("NOPE".to_owned()));
        assert_eq!(
            registry.get(CondId::INITIAL).unwrap().rules,
            vec![RuleId::new(0)]
        );
    }

    #[test]
    fn redeclaring_keeps_first_id() {
        let mut registry = ConditionRegistry::new();
        let a = registry.declare("A", ConditionKind::Exclusive).unwrap();
        assert_eq!(registry.declare("A", ConditionKind::Inclusive), Ok(a));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(a).unwrap().kind, ConditionKind::Exclusive);
    }

    #[test]
    fn declaring_past_the_limit_fails() {
        let mut registry = ConditionRegistry::new();
        for i in 1..MAX_CONDITIONS {
            registry.declare(&format!("C{i}"), ConditionKind::Exclusive).unwrap();
        }
        assert_eq!(registry.len(), MAX_CONDITIONS);
        assert_eq!(
            registry.declare("ONE_MORE", ConditionKind::Exclusive),
            Err(TooManyConditions)
        );
        assert_eq!(registry.lookup("ONE_MORE"), None);
        assert_eq!(registry.declare("C1", ConditionKind::Exclusive), Ok(CondId::new(1)));
        let (last, cond) = registry.iter().last().unwrap();
        assert_eq!(last, CondId::new(u16::MAX));
        assert_eq!(registry.lookup(&cond.name), Some(last));
    }
}
