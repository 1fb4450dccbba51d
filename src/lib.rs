extern crate self as saes_router;

use std::collections::BTreeSet;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod normalize;
pub mod rules;
mod session;

pub use api::{Options, Router, Status, StepReport};
pub use engine::{InputTraits, LoadReport, Outcome, RuleRef, ScanMetrics, Shadowed, SkippedPattern};
pub use error::{HandlerError, InvalidPatternError, ProviderLoadError, RouteError};
pub use normalize::normalize;
pub use session::{Context, END, START, SlotValue};

// --- Rule contract ----------------------------------------------------------

/// What a handler returns: the reply text, or a failure the router contains.
pub type HandlerResult = Result<String, HandlerError>;

/// A rule handler. Receives the session context and the *raw* user text.
pub type Handler = Arc<dyn Fn(&mut Context, &str) -> HandlerResult + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut Context, &str) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// State change applied after a handler returns successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Transition {
    /// Leave `Context::state` as the handler left it.
    #[default]
    Keep,
    /// Move to the given state label.
    To(String),
}

impl Transition {
    /// Build a transition from a label; an empty label means [`Transition::Keep`].
    pub fn to(label: impl Into<String>) -> Self {
        let label = label.into();
        if label.trim().is_empty() { Transition::Keep } else { Transition::To(label) }
    }
}

impl From<&str> for Transition {
    fn from(label: &str) -> Self {
        Transition::to(label)
    }
}

/// Set of states in which a rule may fire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Gate {
    /// Unrestricted.
    #[default]
    Any,
    /// Only while `Context::state` is one of these labels.
    Only(BTreeSet<String>),
}

impl Gate {
    /// Restrict to `states`. An empty list yields [`Gate::Any`].
    pub fn only<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = states.into_iter().map(Into::into).collect();
        if set.is_empty() { Gate::Any } else { Gate::Only(set) }
    }

    /// Whether a rule behind this gate may fire in `state`.
    pub fn admits(&self, state: &str) -> bool {
        match self {
            Gate::Any => true,
            Gate::Only(states) => states.contains(state),
        }
    }

    /// True when every state admitted by `other` is admitted by `self`.
    pub fn covers(&self, other: &Gate) -> bool {
        match (self, other) {
            (Gate::Any, _) => true,
            (Gate::Only(_), Gate::Any) => false,
            (Gate::Only(mine), Gate::Only(theirs)) => theirs.is_subset(mine),
        }
    }

    pub(crate) fn labels(&self) -> impl Iterator<Item = &str> {
        let states: Option<&BTreeSet<String>> = match self {
            Gate::Any => None,
            Gate::Only(states) => Some(states),
        };
        states.into_iter().flatten().map(String::as_str)
    }
}

/// A pattern source contributed by a provider, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPattern {
    pub name: String,
    pub source: String,
    /// Input traits the normalized text must have before the regex is tried.
    pub requires: InputTraits,
}

/// A unit of independently authored rules (one SAES "module").
///
/// The router turns every pattern of a provider into one rule that shares the
/// provider's handler, transition and gate. Providers are registered in a
/// fixed order; that order is the matching priority.
pub trait ProvidesRules: Send + Sync {
    /// Identifies the provider in diagnostics and reports.
    fn origin(&self) -> &str;

    /// Pattern sources of this provider. An `Err` skips the whole provider.
    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError>;

    /// Produce the reply for a matched turn. May mutate `ctx`.
    fn handle(&self, ctx: &mut Context, text: &str) -> HandlerResult;

    fn next_state(&self) -> Transition {
        Transition::Keep
    }

    fn allowed_states(&self) -> Gate {
        Gate::Any
    }
}

// --- Patterns ---------------------------------------------------------------

/// A compiled, case-insensitive matching expression.
///
/// The authoring syntax is verbose-mode regex: whitespace and `#` comments in
/// the source are ignored, so patterns can be spread over several lines.
/// Matching is a search over the normalized text; anchors must be explicit.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    canonical: String,
    regex: Regex,
    requires: InputTraits,
}

impl Pattern {
    /// Compile `source`, rejecting sources that are empty once whitespace,
    /// comments and leading flag groups are stripped.
    pub fn compile(source: &str) -> Result<Self, InvalidPatternError> {
        let canonical = canonical_source(source);
        if canonical.is_empty() {
            return Err(InvalidPatternError::Empty);
        }

        let regex = RegexBuilder::new(source).case_insensitive(true).ignore_whitespace(true).build().map_err(
            |err| InvalidPatternError::Syntax { pattern: source.trim().to_string(), message: err.to_string() },
        )?;

        Ok(Pattern { source: source.to_string(), canonical, regex, requires: InputTraits::empty() })
    }

    /// Attach an input-trait precondition.
    pub fn requiring(mut self, traits: InputTraits) -> Self {
        self.requires = traits;
        self
    }

    pub fn is_match(&self, normalized: &str) -> bool {
        self.regex.is_match(normalized)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn requires(&self) -> InputTraits {
        self.requires
    }

    /// Source with whitespace, comments and leading flag groups removed.
    pub(crate) fn canonical(&self) -> &str {
        &self.canonical
    }
}

fn canonical_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '#' => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
            }
            c if c.is_whitespace() => {}
            c => out.push(c),
        }
    }

    let flags = regex!(r"^ (?: \( \? [a-zA-Z-]+ \) )+");
    flags.replace(&out, "").into_owned()
}

// --- Registered rules -------------------------------------------------------

/// A registered rule: immutable once it is in the registry.
#[derive(Clone)]
pub(crate) struct Rule {
    /// Name of the pattern inside its provider (e.g. `"LOGIN"`).
    pub name: String,
    /// Provider that contributed the rule.
    pub origin: String,
    pub pattern: Pattern,
    pub handler: Handler,
    pub next: Transition,
    pub gate: Gate,
}

impl Rule {
    pub(crate) fn reference(&self) -> RuleRef {
        RuleRef { origin: self.origin.clone(), name: self.name.clone() }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("pattern", &self.pattern.source)
            .field("handler", &"<function>")
            .field("next", &self.next)
            .field("gate", &self.gate)
            .finish()
    }
}
