//! Rule registry: building, validating and ordering rules.
//!
//! The registry is the *static* side of the router. It is built once from an
//! explicit, ordered list of providers and is read-only afterwards (manual
//! registration goes through `Router::route`, which copies the registry on
//! write when it is shared).
//!
//! ## Build contract
//!
//! For every provider, in list order:
//!
//! 1. Validate the declaration: a non-empty origin, a non-empty `next_state`
//!    label when one is declared, non-empty gate labels. A violation is a
//!    `ProviderLoadError` and the provider contributes nothing.
//! 2. Ask for its patterns. An `Err` here is also a `ProviderLoadError`.
//! 3. Compile each pattern. A pattern that is empty or malformed is recorded
//!    as skipped; the remaining patterns are still registered.
//! 4. Admit each rule (see `dedup.rs`): same-origin duplicates are dropped,
//!    shadowed rules are kept and reported.
//!
//! None of these failures abort the build. The outcome is summarized in a
//! `LoadReport`.
//!
//! ## Invariants
//!
//! - Rule order is registration order and never changes afterwards; it is
//!   the only priority the router knows.
//! - Every registered rule has a non-empty, compilable pattern.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use super::dedup::{self, RuleKey};
use crate::{
    Context, Handler, InvalidPatternError, Pattern, ProviderLoadError, ProvidesRules, RouteError, Rule, Transition,
};

/// Reference to a registered rule, for reports and outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleRef {
    pub origin: String,
    pub name: String,
}

impl std::fmt::Display for RuleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.origin, self.name)
    }
}

/// A pattern that was not registered because it did not compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPattern {
    pub rule: RuleRef,
    pub error: InvalidPatternError,
}

/// A registered rule that can never win against an earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadowed {
    pub rule: RuleRef,
    pub by: RuleRef,
}

/// What happened while the registry was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Providers that loaded (possibly contributing zero rules).
    pub providers_loaded: usize,
    pub failed_providers: Vec<ProviderLoadError>,
    pub invalid_patterns: Vec<SkippedPattern>,
    pub duplicates: Vec<RuleRef>,
    pub shadowed: Vec<Shadowed>,
}

/// The handler consulted when no rule matches.
#[derive(Clone, Default)]
pub(crate) enum Fallback {
    /// Reply with `Options::fallback_message`, or with the diagnostic
    /// `Options::empty_registry_message` while the registry has no rules.
    #[default]
    Builtin,
    Custom(Handler),
    /// No fallback at all; the router answers with `Options::no_handler_message`.
    Disabled,
}

/// Ordered rules plus the single active fallback.
#[derive(Clone, Default)]
pub(crate) struct Registry {
    rules: Vec<Rule>,
    seen: HashSet<RuleKey>,
    fallback: Fallback,
    report: LoadReport,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("rules", &self.rules)
            .field("fallback", &match self.fallback {
                Fallback::Builtin => "builtin",
                Fallback::Custom(_) => "<function>",
                Fallback::Disabled => "disabled",
            })
            .field("report", &self.report)
            .finish()
    }
}

impl Registry {
    /// Build a registry from `providers`, in order.
    pub(crate) fn build(providers: &[Arc<dyn ProvidesRules>]) -> Self {
        let mut registry = Registry::default();

        for provider in providers {
            match registry.load_provider(provider) {
                Ok(added) => {
                    registry.report.providers_loaded += 1;
                    tracing::debug!(origin = provider.origin(), added, "provider loaded");
                }
                Err(err) => {
                    warn!(error = %err, "skipping rule provider");
                    registry.report.failed_providers.push(err);
                }
            }
        }

        info!(
            rules = registry.rules.len(),
            providers = registry.report.providers_loaded,
            failed = registry.report.failed_providers.len(),
            invalid_patterns = registry.report.invalid_patterns.len(),
            "rule registry built"
        );

        registry
    }

    fn load_provider(&mut self, provider: &Arc<dyn ProvidesRules>) -> Result<usize, ProviderLoadError> {
        let origin = provider.origin().trim().to_string();
        if origin.is_empty() {
            return Err(ProviderLoadError::InvalidOrigin);
        }

        let next = provider.next_state();
        let gate = provider.allowed_states();
        let blank_next = matches!(&next, Transition::To(label) if label.trim().is_empty());
        if blank_next || gate.labels().any(|label| label.trim().is_empty()) {
            return Err(ProviderLoadError::InvalidState { origin });
        }

        let patterns = provider.patterns()?;

        let shared = Arc::clone(provider);
        let handler: Handler = Arc::new(move |ctx: &mut Context, text: &str| shared.handle(ctx, text));

        let mut added = 0;
        for named in patterns {
            let pattern = match Pattern::compile(&named.source) {
                Ok(pattern) => pattern.requiring(named.requires),
                Err(error) => {
                    let rule = RuleRef { origin: origin.clone(), name: named.name };
                    warn!(rule = %rule, error = %error, "skipping invalid pattern");
                    self.report.invalid_patterns.push(SkippedPattern { rule, error });
                    continue;
                }
            };

            let rule = Rule {
                name: named.name,
                origin: origin.clone(),
                pattern,
                handler: Arc::clone(&handler),
                next: next.clone(),
                gate: gate.clone(),
            };
            if self.admit(rule).is_ok() {
                added += 1;
            }
        }

        Ok(added)
    }

    /// Append `rule` unless its origin already registered the same pattern.
    pub(crate) fn admit(&mut self, rule: Rule) -> Result<(), RouteError> {
        let key = RuleKey::of(&rule);
        if self.seen.contains(&key) {
            let reference = rule.reference();
            warn!(rule = %reference, "skipping duplicate rule");
            self.report.duplicates.push(reference);
            return Err(RouteError::Duplicate { origin: rule.origin, pattern: rule.pattern.source().trim().to_string() });
        }

        if let Some(earlier) = dedup::shadowing(&self.rules, &rule) {
            let shadowed = Shadowed { rule: rule.reference(), by: earlier.reference() };
            warn!(rule = %shadowed.rule, by = %shadowed.by, "rule is shadowed by an earlier rule and can never fire");
            self.report.shadowed.push(shadowed);
        }

        self.seen.insert(key);
        self.rules.push(rule);
        Ok(())
    }

    pub(crate) fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn fallback(&self) -> &Fallback {
        &self.fallback
    }

    /// Replace the active fallback; the previous one is discarded.
    pub(crate) fn set_fallback(&mut self, fallback: Fallback) {
        self.fallback = fallback;
    }

    pub(crate) fn report(&self) -> &LoadReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Gate, HandlerResult, InputTraits, NamedPattern};

    struct Fixed {
        origin: &'static str,
        sources: Vec<&'static str>,
        next: Transition,
        gate: Gate,
        broken: bool,
    }

    impl Fixed {
        fn new(origin: &'static str, sources: Vec<&'static str>) -> Self {
            Fixed { origin, sources, next: Transition::Keep, gate: Gate::Any, broken: false }
        }
    }

    impl ProvidesRules for Fixed {
        fn origin(&self) -> &str {
            self.origin
        }

        fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
            if self.broken {
                return Err(ProviderLoadError::Init { origin: self.origin.to_string(), reason: "no data".into() });
            }
            Ok(self
                .sources
                .iter()
                .enumerate()
                .map(|(i, src)| NamedPattern {
                    name: format!("P{i}"),
                    source: src.to_string(),
                    requires: InputTraits::empty(),
                })
                .collect())
        }

        fn handle(&self, _ctx: &mut Context, _text: &str) -> HandlerResult {
            Ok(self.origin.to_string())
        }

        fn next_state(&self) -> Transition {
            self.next.clone()
        }

        fn allowed_states(&self) -> Gate {
            self.gate.clone()
        }
    }

    fn providers(list: Vec<Fixed>) -> Vec<Arc<dyn ProvidesRules>> {
        list.into_iter().map(|p| Arc::new(p) as Arc<dyn ProvidesRules>).collect()
    }

    #[test]
    fn keeps_provider_and_pattern_order() {
        let registry = Registry::build(&providers(vec![
            Fixed::new("first", vec!["uno", "dos"]),
            Fixed::new("second", vec!["tres"]),
        ]));

        let order: Vec<String> = registry.rules().iter().map(|r| r.reference().to_string()).collect();
        assert_eq!(order, vec!["first::P0", "first::P1", "second::P0"]);
        assert_eq!(registry.report().providers_loaded, 2);
    }

    #[test]
    fn bad_pattern_skips_only_itself() {
        let registry = Registry::build(&providers(vec![Fixed::new("mixed", vec!["ok", r"(broken", "  ", "fine"])]));

        assert_eq!(registry.rules().len(), 2);
        let skipped: Vec<&str> = registry.report().invalid_patterns.iter().map(|s| s.rule.name.as_str()).collect();
        assert_eq!(skipped, vec!["P1", "P2"]);
        assert_eq!(registry.report().invalid_patterns[1].error, InvalidPatternError::Empty);
    }

    #[test]
    fn failing_provider_does_not_abort_discovery() {
        let mut broken = Fixed::new("broken", vec!["nada"]);
        broken.broken = true;
        let mut blank_state = Fixed::new("blank", vec!["algo"]);
        blank_state.next = Transition::To(" ".into());
        let mut blank_gate = Fixed::new("gate", vec!["algo"]);
        blank_gate.gate = Gate::only(["AUTH", ""]);

        let registry = Registry::build(&providers(vec![
            broken,
            Fixed::new("", vec!["x"]),
            blank_state,
            blank_gate,
            Fixed::new("good", vec!["bien"]),
        ]));

        assert_eq!(registry.rules().len(), 1);
        assert_eq!(registry.rules()[0].origin, "good");
        assert_eq!(registry.report().failed_providers.len(), 4);
        assert!(registry.report().failed_providers.contains(&ProviderLoadError::InvalidOrigin));
        assert!(
            registry
                .report()
                .failed_providers
                .contains(&ProviderLoadError::InvalidState { origin: "blank".into() })
        );
    }

    #[test]
    fn duplicates_are_dropped_and_shadowing_reported() {
        let registry = Registry::build(&providers(vec![
            Fixed::new("menu", vec![r"\b menu \b", r"\b(menu)\b", r"\bmenu\b"]),
            Fixed::new("otro", vec![r"\bmenu\b"]),
        ]));

        // `\b(menu)\b` differs canonically from `\bmenu\b`, so only the third is a duplicate.
        assert_eq!(registry.report().duplicates, vec![RuleRef { origin: "menu".into(), name: "P2".into() }]);
        assert_eq!(registry.rules().len(), 3);
        assert_eq!(registry.report().shadowed.len(), 1);
        assert_eq!(registry.report().shadowed[0].rule.origin, "otro");
    }

    #[test]
    fn provider_handler_is_shared_by_its_rules() {
        let registry = Registry::build(&providers(vec![Fixed::new("saludo", vec!["hola", "buenas"])]));
        let mut ctx = Context::default();

        for rule in registry.rules() {
            assert_eq!((rule.handler.as_ref())(&mut ctx, "hola"), Ok("saludo".to_string()));
        }
    }
}
