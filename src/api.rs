use crate::engine::{self, Fallback, Outcome, Registry, ScanMetrics};
use crate::{
    Context, Gate, Handler, LoadReport, Pattern, ProvidesRules, RouteError, Rule, SlotValue, Transition, rules,
};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;

static DEFAULT_REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::build(&rules::default_providers())));

/// Replies the router produces on its own, without a rule handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Reply of the built-in fallback when no rule matched.
    pub fallback_message: String,
    /// Reply after a handler (or a custom fallback) failed.
    pub failure_message: String,
    /// Diagnostic reply of the built-in fallback while no rule is registered.
    pub empty_registry_message: String,
    /// Reply when no rule matched and the fallback was disabled.
    pub no_handler_message: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fallback_message: "No entendí tu solicitud. Prueba con comandos como 'iniciar sesión', 'info académica', \
                               'trámites', 'inscripción', 'materias' o 'cerrar sesión'."
                .to_string(),
            failure_message: "Lo siento, hubo un error procesando tu mensaje. Intenta nuevamente.".to_string(),
            empty_registry_message: "El asistente no tiene reglas cargadas; no puedo atender solicitudes por ahora."
                .to_string(),
            no_handler_message: "No hay manejador para tu solicitud.".to_string(),
        }
    }
}

/// Routing details of one turn, returned by [`Router::step_verbose`].
#[derive(Debug, Clone)]
pub struct StepReport {
    pub reply: String,
    /// The text the rules were matched against.
    pub normalized: String,
    pub outcome: Outcome,
    pub state_before: String,
    pub state_after: String,
    pub scan: ScanMetrics,
    pub elapsed: Duration,
    /// 1-based turn number within the session.
    pub turn: u64,
}

/// Snapshot of a session for host status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub state: String,
    pub user: Option<String>,
    pub authenticated: bool,
    pub turns: u64,
    pub started_at: NaiveDateTime,
}

/// A conversation: the shared rule registry plus one session [`Context`].
///
/// The registry is read-only once built and shared between sessions created
/// with [`Router::new_session`]. Manual registration through [`Router::route`]
/// or [`Router::fallback`] copies it first when it is shared, so it only
/// affects this router.
///
/// # Example
/// ```
/// use saes_router::Router;
///
/// let mut router = Router::new();
/// router.step("Quiero iniciar sesion");
/// assert_eq!(router.current_state(), "AUTH");
/// ```
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<Registry>,
    context: Context,
    options: Arc<Options>,
    turns: u64,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Router over the built-in SAES providers with default [`Options`].
    ///
    /// The built-in registry is built once per process.
    pub fn new() -> Self {
        Self::from_registry(Arc::clone(&DEFAULT_REGISTRY), Options::default())
    }

    /// Router over `providers`, registered in the given order.
    ///
    /// Providers that fail to load and patterns that fail to compile are
    /// skipped; see [`Router::load_report`].
    pub fn with_providers(providers: &[Arc<dyn ProvidesRules>], options: Options) -> Self {
        Self::from_registry(Arc::new(Registry::build(providers)), options)
    }

    /// Router with no rules and no fallback: every turn gets
    /// [`Options::no_handler_message`] until something is registered.
    pub fn empty(options: Options) -> Self {
        let mut registry = Registry::default();
        registry.set_fallback(Fallback::Disabled);
        Self::from_registry(Arc::new(registry), options)
    }

    fn from_registry(registry: Arc<Registry>, options: Options) -> Self {
        Self::from_shared(registry, Arc::new(options))
    }

    fn from_shared(registry: Arc<Registry>, options: Arc<Options>) -> Self {
        Self { registry, context: Context::default(), options, turns: 0 }
    }

    /// A fresh conversation over the same registry, fallback and options.
    pub fn new_session(&self) -> Self {
        Self::from_shared(Arc::clone(&self.registry), Arc::clone(&self.options))
    }

    /// Process one user turn and return the reply. Never fails.
    pub fn step(&mut self, text: &str) -> String {
        self.turns += 1;
        engine::step(&self.registry, &mut self.context, &self.options, text).reply
    }

    /// Like [`Router::step`], with the routing details of the turn.
    pub fn step_verbose(&mut self, text: &str) -> StepReport {
        self.turns += 1;
        let state_before = self.context.state().to_string();
        let run = engine::step(&self.registry, &mut self.context, &self.options, text);

        StepReport {
            reply: run.reply,
            normalized: run.normalized,
            outcome: run.outcome,
            state_before,
            state_after: self.context.state().to_string(),
            scan: run.scan,
            elapsed: run.elapsed,
            turn: self.turns,
        }
    }

    /// Discard the session and start over in `START`. Rules are untouched.
    pub fn reset(&mut self) {
        self.context = Context::default();
        self.turns = 0;
    }

    pub fn current_state(&self) -> &str {
        self.context.state()
    }

    pub fn get_slot(&self, key: &str) -> Option<SlotValue> {
        self.context.slot(key)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn status(&self) -> Status {
        Status {
            state: self.context.state().to_string(),
            user: self.context.user_id().map(str::to_string),
            authenticated: self.context.is_authenticated(),
            turns: self.turns,
            started_at: self.context.started_at(),
        }
    }

    /// Append an unrestricted rule. It has the lowest priority so far.
    pub fn route(
        &mut self,
        pattern: &str,
        handler: Handler,
        next: impl Into<Transition>,
        origin: &str,
    ) -> Result<(), RouteError> {
        self.route_gated(pattern, handler, next, origin, Gate::Any)
    }

    /// Append a rule that may only fire in the states admitted by `gate`.
    pub fn route_gated(
        &mut self,
        pattern: &str,
        handler: Handler,
        next: impl Into<Transition>,
        origin: &str,
        gate: Gate,
    ) -> Result<(), RouteError> {
        let origin = origin.trim();
        if origin.is_empty() {
            return Err(RouteError::InvalidOrigin);
        }

        let next = next.into();
        let blank_next = matches!(&next, Transition::To(label) if label.trim().is_empty());
        if blank_next || gate.labels().any(|label| label.trim().is_empty()) {
            return Err(RouteError::InvalidState);
        }

        let pattern = Pattern::compile(pattern)?;
        let registry = Arc::make_mut(&mut self.registry);
        let rule = Rule {
            name: format!("ROUTE_{}", registry.rules().len()),
            origin: origin.to_string(),
            pattern,
            handler,
            next,
            gate,
        };

        registry.admit(rule)
    }

    /// Replace the fallback; the previous one is discarded.
    pub fn fallback(&mut self, handler: Handler) {
        Arc::make_mut(&mut self.registry).set_fallback(Fallback::Custom(handler));
    }

    pub fn load_report(&self) -> &LoadReport {
        self.registry.report()
    }

    pub fn rule_count(&self) -> usize {
        self.registry.rules().len()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}
