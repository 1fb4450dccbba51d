//! The state-gated automaton: one turn of routing.
//!
//! ```text
//! raw ── normalize ── InputTraits::scan
//!                          │
//!          for rule in registry (registration order):
//!            gate excludes ctx.state?      -> skip (gated)
//!            input lacks required traits?  -> skip (trait_skipped)
//!            pattern matches normalized?   -> first match wins
//!                          │
//!             guard::invoke(handler, ctx, raw)
//!               Ok(reply)  -> apply transition, reply
//!               Err(_)     -> ctx restored, failure_message
//!                          │
//!          nothing matched -> fallback (builtin / custom / disabled)
//! ```
//!
//! ## Design notes
//!
//! - Handlers receive the *raw* text; only matching sees the normalized text.
//! - A transition is applied only after the handler succeeded, and it
//!   overrides whatever state the handler set. `Transition::Keep` leaves the
//!   handler's own state changes in place.
//! - A failing fallback is contained the same way as a failing handler.

use std::time::Instant;

use tracing::{debug, error, trace};

use super::guard;
use super::metrics::{Outcome, ScanMetrics, StepRun};
use super::registry::{Fallback, Registry};
use super::trigger::InputTraits;
use crate::{Context, Options, Rule, Transition, normalize};

/// Route one turn of `raw` text against `registry`, mutating `ctx`.
pub(crate) fn step(registry: &Registry, ctx: &mut Context, options: &Options, raw: &str) -> StepRun {
    let started = Instant::now();
    let normalized = normalize(raw);
    let traits = InputTraits::scan(&normalized);
    let mut scan = ScanMetrics::default();

    let matched = select(registry.rules(), ctx.state(), &normalized, traits, &mut scan);

    let (reply, outcome) = match matched {
        Some(rule) => fire(rule, ctx, options, raw),
        None => fall_back(registry, ctx, options, raw),
    };

    debug!(
        state = ctx.state(),
        considered = scan.considered,
        gated = scan.gated,
        trait_skipped = scan.trait_skipped,
        outcome = ?outcome,
        "turn routed"
    );

    StepRun { reply, normalized, outcome, scan, elapsed: started.elapsed() }
}

/// First rule that is eligible in `state` and matches `normalized`.
fn select<'r>(
    rules: &'r [Rule],
    state: &str,
    normalized: &str,
    traits: InputTraits,
    scan: &mut ScanMetrics,
) -> Option<&'r Rule> {
    for rule in rules {
        scan.considered += 1;

        if !rule.gate.admits(state) {
            scan.gated += 1;
            continue;
        }

        if !traits.contains(rule.pattern.requires()) {
            scan.trait_skipped += 1;
            continue;
        }

        scan.evaluated += 1;
        let hit = rule.pattern.is_match(normalized);
        trace!(rule = %rule.reference(), hit, "pattern evaluated");
        if hit {
            return Some(rule);
        }
    }

    None
}

fn fire(rule: &Rule, ctx: &mut Context, options: &Options, raw: &str) -> (String, Outcome) {
    let reference = rule.reference();

    match guard::invoke(&rule.handler, ctx, raw) {
        Ok(reply) => {
            if let Transition::To(next) = &rule.next {
                debug!(rule = %reference, from = ctx.state(), to = next.as_str(), "transition");
                ctx.set_state(next.as_str());
            }
            (reply, Outcome::Matched(reference))
        }
        Err(err) => {
            error!(rule = %reference, error = %err, "handler failed; context restored");
            (options.failure_message.clone(), Outcome::Failed { rule: Some(reference), error: err.to_string() })
        }
    }
}

fn fall_back(registry: &Registry, ctx: &mut Context, options: &Options, raw: &str) -> (String, Outcome) {
    match registry.fallback() {
        Fallback::Builtin if registry.is_empty() => (options.empty_registry_message.clone(), Outcome::Fallback),
        Fallback::Builtin => (options.fallback_message.clone(), Outcome::Fallback),
        Fallback::Custom(handler) => match guard::invoke(handler, ctx, raw) {
            Ok(reply) => (reply, Outcome::Fallback),
            Err(err) => {
                error!(error = %err, "fallback failed; context restored");
                (options.failure_message.clone(), Outcome::Failed { rule: None, error: err.to_string() })
            }
        },
        Fallback::Disabled => (options.no_handler_message.clone(), Outcome::NoHandler),
    }
}
