//! Duplicate and shadowed rule detection.
//!
//! Registration order is priority, so two rules with the same pattern are
//! only meaningful when the later one can still fire somewhere the earlier
//! one cannot. The registry uses this module to:
//!
//! - **reject duplicates**: the same origin registering the same pattern
//!   (compared on the canonical source, so whitespace, comments and leading
//!   flag groups do not matter);
//! - **report shadowing**: a later rule whose pattern equals an earlier
//!   rule's, whose gate is covered by the earlier gate and whose trait
//!   requirements are at least as strict. Such a rule is kept (the provider
//!   asked for it) but can never win.

use crate::Rule;

/// Identity of a rule for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RuleKey {
    pub(crate) origin: String,
    pub(crate) canonical: String,
}

impl RuleKey {
    pub(crate) fn of(rule: &Rule) -> Self {
        RuleKey { origin: rule.origin.clone(), canonical: rule.pattern.canonical().to_string() }
    }
}

/// First earlier rule that makes `candidate` unreachable, if any.
pub(crate) fn shadowing<'r>(earlier: &'r [Rule], candidate: &Rule) -> Option<&'r Rule> {
    earlier.iter().find(|rule| {
        rule.pattern.canonical() == candidate.pattern.canonical()
            && rule.gate.covers(&candidate.gate)
            && candidate.pattern.requires().contains(rule.pattern.requires())
    })
}
