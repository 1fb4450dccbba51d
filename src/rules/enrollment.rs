//! Enrollment and its group-selection sub-flow.
//!
//! ```text
//! "inscripcion"                -> instructions
//! "seleccionar grupo 3CM1"     -> pending_group = 3CM1, asks to confirm
//! "confirmar"                  -> enrolled_group = pending_group
//! "cancelar"                   -> pending_group dropped
//! ```
//!
//! Confirming or cancelling without a pending selection is answered, not
//! treated as a failure.

use super::helpers::{INSCRIPCION, capture, signed_in, signed_in_user};
use crate::{Context, Gate, HandlerResult, NamedPattern, ProviderLoadError, ProvidesRules, Transition};

const ENROLL_RE: &str = r"\b( inscripcion | inscribirme | inscribir | seleccion \s+ de \s+ (?: turno | grupo ) )\b";

const SELECT_RE: &str = r"\b (?: seleccionar | elegir | escoger ) \s+ (?: el \s+ )? grupo \s+ ( [a-z0-9]{2,8} )\b";

const CONFIRM_RE: &str = r"^ (?: confirmar | confirmo | si \s+ confirmo ) (?: \s+ inscripcion )? $";

const CANCEL_RE: &str = r"^ (?: cancelar | cancela ) (?: \s+ inscripcion )? $";

pub const PENDING_GROUP_SLOT: &str = "pending_group";
pub const ENROLLED_GROUP_SLOT: &str = "enrolled_group";

pub struct Inscripcion;

impl ProvidesRules for Inscripcion {
    fn origin(&self) -> &str {
        "inscripcion"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns![
            "SELECT_GROUP" => SELECT_RE,
            "CONFIRM" => CONFIRM_RE,
            "CANCEL" => CANCEL_RE,
            "ENROLL" => ENROLL_RE,
        ])
    }

    fn handle(&self, ctx: &mut Context, text: &str) -> HandlerResult {
        signed_in_user(ctx)?;
        let t = crate::normalize(text);

        if let Some(group) = capture(regex!(SELECT_RE), &t, 1) {
            let group = group.to_uppercase();
            let reply = format!("Seleccionaste el grupo {group}. Escribe 'confirmar' para inscribirte o 'cancelar'.");
            ctx.set_slot(PENDING_GROUP_SLOT, group);
            return Ok(reply);
        }

        if regex!(CONFIRM_RE).is_match(&t) {
            let Some(group) = ctx.take_slot(PENDING_GROUP_SLOT) else {
                return Ok("No tienes un grupo seleccionado. Usa 'seleccionar grupo <CLAVE>'.".to_string());
            };
            let reply = format!("Inscripción confirmada en el grupo {group}.");
            ctx.set_slot(ENROLLED_GROUP_SLOT, group);
            return Ok(reply);
        }

        if regex!(CANCEL_RE).is_match(&t) {
            return Ok(match ctx.take_slot(PENDING_GROUP_SLOT) {
                Some(group) => format!("Selección del grupo {group} cancelada."),
                None => "No había ninguna selección pendiente.".to_string(),
            });
        }

        let enrolled =
            ctx.slot(ENROLLED_GROUP_SLOT).map(|g| format!(" Ya estás inscrito en el grupo {g}.")).unwrap_or_default();
        Ok(format!(
            "Inscripción: di 'materias' para ver la oferta, o 'seleccionar grupo <CLAVE>' para elegir uno.{enrolled}"
        ))
    }

    fn next_state(&self) -> Transition {
        Transition::to(INSCRIPCION)
    }

    fn allowed_states(&self) -> Gate {
        signed_in()
    }
}
