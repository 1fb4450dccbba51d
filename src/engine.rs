//! Routing engine.
//!
//! The engine is split into focused submodules under `src/engine/`; this file
//! only wires them together and re-exports the public pieces.
//!
//! ## How the parts work together
//!
//! ```text
//! providers (ordered) ──┐
//!                       │  Registry::build             (registry.rs)
//!                       │    - validate provider declarations
//!                       │    - compile patterns, skip invalid ones
//!                       │    - drop duplicates, report shadowing (dedup.rs)
//!                       └──────────────┬──────────────
//!                                      │
//! raw text ── normalize ── InputTraits::scan (trigger.rs)
//!                                      │
//!                                      v
//!                         automaton::step (automaton.rs)
//!                           - gate by Context::state
//!                           - first matching rule wins
//!                           - guarded handler call (guard.rs)
//!                           - transition / fallback
//!                                      │
//!                                      v
//!                         StepRun { reply, outcome, metrics } (metrics.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `registry.rs`: the ordered rule list, the active fallback and the
//!   `LoadReport` describing what discovery skipped.
//! - `dedup.rs`: duplicate keys and shadowed-rule detection.
//! - `trigger.rs`: coarse input traits used as a pre-filter.
//! - `automaton.rs`: one routing turn.
//! - `guard.rs`: runs handlers so that failures and panics leave the context
//!   untouched.
//! - `metrics.rs`: per-turn outcome and counters.
//!
//! ## Debugging
//!
//! Every routing decision is emitted as a `tracing` event (`debug` per turn,
//! `trace` per evaluated pattern). The `saes` binary shows them with
//! `SAES_LOG=saes_router=trace`.

#[path = "engine/automaton.rs"]
mod automaton;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/guard.rs"]
mod guard;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/registry.rs"]
mod registry;
#[path = "engine/trigger.rs"]
mod trigger;

pub(crate) use automaton::step;
pub use metrics::{Outcome, ScanMetrics};
pub(crate) use registry::{Fallback, Registry};
pub use registry::{LoadReport, RuleRef, Shadowed, SkippedPattern};
pub use trigger::InputTraits;
