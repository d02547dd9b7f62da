//! Identifiers shared between the compiler stages and the runtime.

use std::fmt;

/// Rule identifier.
///
/// Equal to the rule's position in the rules section. The id *is* the
/// priority: when two rules match the same length, the lower id wins.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleId(u32);

impl RuleId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        RuleId(index)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of an action body.
///
/// Rules joined by the `|` continuation marker share one action, so several
/// [`RuleId`]s may map to the same `ActionId`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(u32);

impl ActionId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ActionId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Start condition identifier.
///
/// Conditions are numbered in declaration order after `INITIAL`, which is
/// always present and always `CondId(0)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CondId(u16);

impl CondId {
    /// The implicit initial condition.
    pub const INITIAL: CondId = CondId(0);

    #[inline]
    pub const fn new(index: u16) -> Self {
        CondId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a start condition treats rules without a condition prefix.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionKind {
    /// `%s`: conditionless rules are also active.
    Inclusive,
    /// `%x`: only rules explicitly tagged with the condition are active.
    Exclusive,
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionKind::Inclusive => write!(f, "inclusive"),
            ConditionKind::Exclusive => write!(f, "exclusive"),
        }
    }
}
