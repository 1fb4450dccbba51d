use crate::{Context, Gate, HandlerError};

pub const AUTH: &str = "AUTH";
pub const AUTH_OK: &str = "AUTH_OK";
pub const INFO_PERSONAL: &str = "INFO_PERSONAL";
pub const INFO_ACADEMICA: &str = "INFO_ACADEMICA";
pub const CALIFICACIONES: &str = "CALIFICACIONES";
pub const INSCRIPCION: &str = "INSCRIPCION";
pub const MATERIAS: &str = "MATERIAS";
pub const TRAMITES: &str = "TRAMITES";

/// States a signed-in student can be in.
pub const SIGNED_IN_STATES: [&str; 7] =
    [AUTH_OK, CALIFICACIONES, INFO_ACADEMICA, INFO_PERSONAL, MATERIAS, INSCRIPCION, TRAMITES];

/// Gate of the providers that need a signed-in student.
pub fn signed_in() -> Gate {
    Gate::only(SIGNED_IN_STATES)
}

/// Gate of the providers available before signing in (and after signing out).
pub fn signed_out() -> Gate {
    Gate::only([crate::START, AUTH, crate::END])
}

/// The authenticated user id, or `MissingSlot("auth_ok")`.
///
/// Gating keeps unauthenticated sessions out of the signed-in states, so this
/// only fails when a state was forced by a manually registered rule.
pub fn signed_in_user(ctx: &Context) -> Result<&str, HandlerError> {
    if !ctx.is_authenticated() {
        return Err(HandlerError::MissingSlot("auth_ok"));
    }
    ctx.user_id().ok_or(HandlerError::MissingSlot("user"))
}

/// Capture group `idx` of the first match of `re` in `text`, trimmed.
pub fn capture<'t>(re: &regex::Regex, text: &'t str, idx: usize) -> Option<&'t str> {
    re.captures(text).and_then(|caps| caps.get(idx)).map(|m| m.as_str().trim()).filter(|s| !s.is_empty())
}
