//! Signed-in consultations. Data lookups are simulated.

use super::helpers::{CALIFICACIONES, INFO_ACADEMICA, INFO_PERSONAL, MATERIAS, signed_in, signed_in_user};
use crate::{Context, Gate, HandlerResult, NamedPattern, ProviderLoadError, ProvidesRules, Transition};

const PERSONAL_RE: &str = r"\b( info \s+ personal | datos \s+ personales | informacion \s+ personal | medica )\b";

pub struct InfoPersonal;

impl ProvidesRules for InfoPersonal {
    fn origin(&self) -> &str {
        "info_personal"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns!["PERSONAL" => PERSONAL_RE])
    }

    fn handle(&self, ctx: &mut Context, _text: &str) -> HandlerResult {
        let user = signed_in_user(ctx)?;
        Ok(format!(
            "Info personal de {user}: nombre completo en sistema, NSS y correo institucional registrados. \
             ¿Deseas 'info academica', 'materias', 'tramites' o 'inscripcion'?"
        ))
    }

    fn next_state(&self) -> Transition {
        Transition::to(INFO_PERSONAL)
    }

    fn allowed_states(&self) -> Gate {
        signed_in()
    }
}

const ACADEMIC_RE: &str = r"\b( info (?: \s+ academica )? | kardex | historial \s+ academico )\b";

pub struct InfoAcademica;

impl ProvidesRules for InfoAcademica {
    fn origin(&self) -> &str {
        "info_academica"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns!["ACADEMIC" => ACADEMIC_RE])
    }

    fn handle(&self, ctx: &mut Context, _text: &str) -> HandlerResult {
        signed_in_user(ctx)?;
        Ok("Info académica: Carrera ISC, Semestre 6, Promedio 9.1. Puedes pedir 'ver calificaciones', 'materias', \
            'tramites' o 'inscripcion'."
            .to_string())
    }

    fn next_state(&self) -> Transition {
        Transition::to(INFO_ACADEMICA)
    }

    fn allowed_states(&self) -> Gate {
        signed_in()
    }
}

const GRADES_RE: &str = r"\b( calificacion(?:es)? | boleta | notas )\b";

pub struct Calificaciones;

impl ProvidesRules for Calificaciones {
    fn origin(&self) -> &str {
        "calificaciones"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns!["GRADES" => GRADES_RE])
    }

    fn handle(&self, ctx: &mut Context, _text: &str) -> HandlerResult {
        let user = signed_in_user(ctx)?;
        Ok(format!(
            "Tus calificaciones, {user}: Álgebra 9, Cálculo 8, Programación 10. \
             ¿Quieres 'info academica', 'materias', 'tramites' o 'inscripcion'?"
        ))
    }

    fn next_state(&self) -> Transition {
        Transition::to(CALIFICACIONES)
    }

    fn allowed_states(&self) -> Gate {
        signed_in()
    }
}

const SUBJECTS_RE: &str = r"\b( materias? | lista \s+ de \s+ materias | grupos | cupos? | oferta )\b";

pub struct Materias;

impl ProvidesRules for Materias {
    fn origin(&self) -> &str {
        "materias"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns!["SUBJECTS" => SUBJECTS_RE])
    }

    fn handle(&self, ctx: &mut Context, _text: &str) -> HandlerResult {
        signed_in_user(ctx)?;
        Ok("Materias disponibles: Cálculo (3CM1, 3CM2), Programación (3CM1), Redes (3CM3). \
            Di 'seleccionar grupo <CLAVE>' para inscribirte o 'ver calificaciones'."
            .to_string())
    }

    fn next_state(&self) -> Transition {
        Transition::to(MATERIAS)
    }

    fn allowed_states(&self) -> Gate {
        signed_in()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HandlerError;
    use crate::rules::helpers::AUTH_OK;

    fn signed_in_ctx() -> Context {
        let mut ctx = Context::default();
        ctx.set_user("2023631234");
        ctx.authenticate();
        ctx.set_state(AUTH_OK);
        ctx
    }

    #[test]
    fn consultations_need_authentication() {
        let mut ctx = Context::default();
        ctx.set_user("2023631234");

        assert_eq!(Calificaciones.handle(&mut ctx, "boleta"), Err(HandlerError::MissingSlot("auth_ok")));
        assert_eq!(Materias.handle(&mut ctx, "materias"), Err(HandlerError::MissingSlot("auth_ok")));
    }

    #[test]
    fn grades_mention_the_user() {
        let mut ctx = signed_in_ctx();
        let reply = Calificaciones.handle(&mut ctx, "ver calificaciones").unwrap();
        assert!(reply.contains("2023631234"));
    }
}
