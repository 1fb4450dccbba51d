//! School procedures: the dictamen request sub-flow, ETS and general info.
//!
//! ```text
//! "dictamen"                 -> subjects that need a dictamen (numbered)
//! "dictamen 2" | "dictamen <nombre>"
//!                            -> dictamen_selected = subject, asks for the letter
//! "carta: <texto>"           -> letter registered, dictamen_folio set,
//!                               dictamen_selected dropped
//! ```
//!
//! `dictamen` is registered ahead of the general providers so a free-text
//! letter is not picked up by words like "ayuda" inside it. Failed-subject
//! phrases ("materias no aprobadas") belong to `tramites`, which is
//! registered ahead of `materias`.

use super::helpers::{TRAMITES, capture, signed_in, signed_in_user};
use crate::{Context, Gate, HandlerResult, NamedPattern, ProviderLoadError, ProvidesRules, Transition, normalize};

/// Last procedure the student asked about: `dictamen`, `ets` or `general`.
pub const PROCEDURE_SLOT: &str = "tramite";
/// Subject chosen for a dictamen request, until its letter arrives.
pub const DICTAMEN_SELECTED_SLOT: &str = "dictamen_selected";
/// Folio of the last submitted dictamen letter.
pub const DICTAMEN_FOLIO_SLOT: &str = "dictamen_folio";

/// Failed subjects old enough to need a dictamen: (name, semester taken, grade).
const DICTAMEN_SUBJECTS: [(&str, &str, u8); 2] =
    [("Cálculo Vectorial", "2022-1", 4), ("Sistemas Operativos", "2022-2", 5)];

const DICTAMEN_RE: &str = r"
\b(
    dictamen | carta \s+ de \s+ (?: dictamen | motivos ) | solicitar \s+ dictamen |
    motivos \s+ para \s+ dictamen | autorizacion \s+ (?: para \s+ )? ets
)\b
";

const SELECT_RE: &str = r"^ \s* dictamen \s+ ( .+ ) $";

const LETTER_RE: &str = r"^ \s* carta \s* : \s* ( .+ ) $";

pub struct Dictamen;

impl ProvidesRules for Dictamen {
    fn origin(&self) -> &str {
        "dictamen"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns![
            "LETTER" => LETTER_RE,
            "SELECT" => SELECT_RE,
            "DICTAMEN" => DICTAMEN_RE,
        ])
    }

    fn handle(&self, ctx: &mut Context, text: &str) -> HandlerResult {
        signed_in_user(ctx)?;
        ctx.set_slot(PROCEDURE_SLOT, "dictamen");

        if let Some(caps) = regex!(LETTER_RE).captures(text) {
            let letter = caps.get(1).map_or("", |m| m.as_str().trim());
            return Ok(submit_letter(ctx, letter));
        }

        if let Some(choice) = capture(regex!(SELECT_RE), text, 1) {
            let Some((name, _, _)) = find_subject(choice) else {
                return Ok(format!("No identifiqué esa opción.\n{}", subject_menu()));
            };
            ctx.set_slot(DICTAMEN_SELECTED_SLOT, name);
            return Ok(format!(
                "Seleccionado dictamen para: {name}.\nAhora envía tu carta de motivos iniciando con \
                 'carta: <explica por qué solicitas el dictamen>'."
            ));
        }

        Ok(format!(
            "Dictamen: la Comisión de Situación Escolar revisa una carta de motivos por materia.\n{}",
            subject_menu()
        ))
    }

    fn next_state(&self) -> Transition {
        Transition::to(TRAMITES)
    }

    fn allowed_states(&self) -> Gate {
        signed_in()
    }
}

fn submit_letter(ctx: &mut Context, letter: &str) -> String {
    let Some(subject) = ctx.slot(DICTAMEN_SELECTED_SLOT) else {
        return "Primero selecciona la materia de dictamen: 'dictamen 1' o 'dictamen <nombre de la materia>'."
            .to_string();
    };
    if letter.is_empty() {
        return "Tu carta está vacía. Intenta de nuevo con: 'carta: <tu texto>'.".to_string();
    }

    let number = subject.as_text().map_or(0, position);
    let folio = format!("DIC-{}-{number:02}", ctx.started_at().format("%Y%m%d%H%M"));
    ctx.take_slot(DICTAMEN_SELECTED_SLOT);
    ctx.set_slot(DICTAMEN_FOLIO_SLOT, folio.as_str());

    format!(
        "Listo, registré tu carta de dictamen para '{subject}'. Folio: {folio}. Servicios escolares revisará tu \
         solicitud."
    )
}

/// 1-based menu position of a subject name, 0 when unknown.
fn position(subject: &str) -> usize {
    DICTAMEN_SUBJECTS.iter().position(|(name, _, _)| *name == subject).map_or(0, |i| i + 1)
}

/// Resolve "2" or a subject name (accents and case ignored).
fn find_subject(choice: &str) -> Option<(&'static str, &'static str, u8)> {
    if let Ok(n) = choice.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| DICTAMEN_SUBJECTS.get(i)).copied();
    }
    let wanted = normalize(choice);
    DICTAMEN_SUBJECTS.iter().find(|(name, _, _)| normalize(name) == wanted).copied()
}

fn subject_menu() -> String {
    let mut out = String::from("Materias que requieren dictamen:");
    for (i, (name, semester, grade)) in DICTAMEN_SUBJECTS.iter().enumerate() {
        out.push_str(&format!("\n{}. {name} (cursada {semester}, calificación {grade})", i + 1));
    }
    out.push_str("\nResponde 'dictamen <número>' o 'dictamen <nombre de la materia>' y luego 'carta: <tu texto>'.");
    out
}

const PROCEDURES_RE: &str = r"\b( tramites? | servicios \s+ escolares | constancias? )\b";

const ETS_RE: &str = r"
\b(
    ets | reprobadas? | reprobados? | extras? | extraordinarios? | sin \s+ pasar |
    materias? \s+ no \s+ aprobadas? |
    examen(?:es)? \s+ (?: especial(?:es)? | (?: a \s+ | de \s+ )? (?: titulo | suficiencia ) )
)\b
";

const FAILED_RE: &str = r"
\b(
    que \s+ materias? \s+ (?: reprobe | no \s+ pase ) | cuales? \s+ reprobe | mis \s+ reprobadas?
)\b
";

/// Procedures: general info and ETS (extraordinary exams).
pub struct Tramites;

impl ProvidesRules for Tramites {
    fn origin(&self) -> &str {
        "tramites"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns![
            "ETS" => ETS_RE,
            "FAILED" => FAILED_RE,
            "PROCEDURES" => PROCEDURES_RE,
        ])
    }

    fn handle(&self, ctx: &mut Context, text: &str) -> HandlerResult {
        signed_in_user(ctx)?;
        let t = normalize(text);

        if regex!(ETS_RE).is_match(&t) || regex!(FAILED_RE).is_match(&t) {
            ctx.set_slot(PROCEDURE_SLOT, "ets");
            return Ok("ETS: puedes presentar examen a título de suficiencia de las materias reprobadas. \
                       Materias con ETS disponible: Cálculo (turno matutino). Si reprobaste hace más de tres \
                       semestres necesitas 'dictamen'."
                .to_string());
        }

        ctx.set_slot(PROCEDURE_SLOT, "general");
        Ok("Trámites disponibles: constancia de estudios, dictamen y ETS. Escribe 'dictamen' o 'ets' para más \
            detalles."
            .to_string())
    }

    fn next_state(&self) -> Transition {
        Transition::to(TRAMITES)
    }

    fn allowed_states(&self) -> Gate {
        signed_in()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::helpers::AUTH_OK;
    use crate::{HandlerError, SlotValue};

    fn signed_in_ctx() -> Context {
        let mut ctx = Context::default();
        ctx.set_user("2023631234");
        ctx.authenticate();
        ctx.set_state(AUTH_OK);
        ctx
    }

    #[test]
    fn procedures_need_authentication() {
        let mut ctx = Context::default();
        ctx.set_user("2023631234");

        assert_eq!(Tramites.handle(&mut ctx, "tramites"), Err(HandlerError::MissingSlot("auth_ok")));
        assert_eq!(Dictamen.handle(&mut ctx, "dictamen"), Err(HandlerError::MissingSlot("auth_ok")));
    }

    #[test]
    fn tramites_picks_sub_intent() {
        let mut ctx = signed_in_ctx();

        let cases = [
            ("tengo materias reprobadas", "ets"),
            ("¿Qué materias reprobé?", "ets"),
            ("materias no aprobadas", "ets"),
            ("examen a título de suficiencia", "ets"),
            ("trámites", "general"),
        ];
        for (raw, expected) in cases {
            Tramites.handle(&mut ctx, raw).unwrap();
            assert_eq!(ctx.slot(PROCEDURE_SLOT), Some(SlotValue::from(expected)), "{raw}");
        }
    }

    #[test]
    fn subjects_resolve_by_number_or_name() {
        assert_eq!(find_subject("2").map(|s| s.0), Some("Sistemas Operativos"));
        assert_eq!(find_subject("calculo vectorial").map(|s| s.0), Some("Cálculo Vectorial"));
        assert_eq!(find_subject("0"), None);
        assert_eq!(find_subject("3"), None);
        assert_eq!(find_subject("redes"), None);
    }

    #[test]
    fn dictamen_select_then_letter() {
        let mut ctx = signed_in_ctx();

        let menu = Dictamen.handle(&mut ctx, "quiero solicitar dictamen").unwrap();
        assert!(menu.contains("1. Cálculo Vectorial"));
        assert!(menu.contains("2. Sistemas Operativos"));
        assert_eq!(ctx.slot(PROCEDURE_SLOT), Some(SlotValue::from("dictamen")));

        Dictamen.handle(&mut ctx, "dictamen 2").unwrap();
        assert_eq!(ctx.slot(DICTAMEN_SELECTED_SLOT), Some(SlotValue::from("Sistemas Operativos")));

        let done = Dictamen.handle(&mut ctx, "Carta: Solicito dictamen por motivos de salud.").unwrap();
        assert!(done.contains("'Sistemas Operativos'"));
        assert_eq!(ctx.slot(DICTAMEN_SELECTED_SLOT), None);
        assert_eq!(ctx.slot(DICTAMEN_FOLIO_SLOT), Some(SlotValue::from("DIC-202501130800-02")));
    }

    #[test]
    fn empty_letter_keeps_the_selection() {
        let mut ctx = signed_in_ctx();
        ctx.set_slot(DICTAMEN_SELECTED_SLOT, "Cálculo Vectorial");

        let reply = Dictamen.handle(&mut ctx, "carta:  ").unwrap();

        assert!(reply.starts_with("Tu carta está vacía"));
        assert_eq!(ctx.slot(DICTAMEN_SELECTED_SLOT), Some(SlotValue::from("Cálculo Vectorial")));
    }

    #[test]
    fn letter_needs_a_selection_first() {
        let mut ctx = signed_in_ctx();

        let reply = Dictamen.handle(&mut ctx, "carta: necesito recursar").unwrap();
        assert!(reply.starts_with("Primero selecciona la materia"));
        assert_eq!(ctx.slot(DICTAMEN_FOLIO_SLOT), None);

        let unknown = Dictamen.handle(&mut ctx, "dictamen redes").unwrap();
        assert!(unknown.starts_with("No identifiqué esa opción."));
        assert_eq!(ctx.slot(DICTAMEN_SELECTED_SLOT), None);
    }
}
