//! Per-turn routing metrics.
//!
//! Every `step` collects a handful of counters while scanning the registry.
//! They are cheap (plain integers plus one `Instant`) so they are always
//! collected; `Router::step` drops them and `Router::step_verbose` surfaces
//! them in a `StepReport`.

use std::time::Duration;

use super::RuleRef;

/// How a turn was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A rule matched and its handler produced the reply.
    Matched(RuleRef),
    /// No rule matched; the fallback produced the reply.
    Fallback,
    /// The matched rule's handler (or the fallback, when `rule` is `None`)
    /// failed; the context was restored and a generic reply was returned.
    Failed { rule: Option<RuleRef>, error: String },
    /// No rule matched and no fallback is configured.
    NoHandler,
}

/// Counters for a single registry scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanMetrics {
    /// Rules visited (in registration order) before the scan stopped.
    pub considered: usize,
    /// Rules skipped because their gate excluded the current state.
    pub gated: usize,
    /// Rules skipped because the input lacked a required trait.
    pub trait_skipped: usize,
    /// Rules whose pattern was actually evaluated.
    pub evaluated: usize,
}

/// Result of one automaton step.
#[derive(Debug, Clone)]
pub struct StepRun {
    pub reply: String,
    pub normalized: String,
    pub outcome: Outcome,
    pub scan: ScanMetrics,
    pub elapsed: Duration,
}
