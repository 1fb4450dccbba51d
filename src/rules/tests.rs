use proptest::prelude::*;

use crate::rules::{
    AUTH, AUTH_OK, CALIFICACIONES, DICTAMEN_FOLIO_SLOT, DICTAMEN_SELECTED_SLOT, ENROLLED_GROUP_SLOT, INFO_ACADEMICA,
    INFO_PERSONAL, INSCRIPCION, MATERIAS, PENDING_GROUP_SLOT, PROCEDURE_SLOT, TRAMITES,
};
use crate::{END, Options, Outcome, Router, START, SlotValue};

fn signed_in() -> Router {
    let mut router = Router::new();
    for turn in ["Quiero iniciar sesion", "mi usuario es 2023631234", "Pa$$2025"] {
        router.step(turn);
    }
    assert_eq!(router.current_state(), AUTH_OK);
    router
}

fn matched_origin(router: &mut Router, text: &str) -> Option<String> {
    match router.step_verbose(text).outcome {
        Outcome::Matched(rule) => Some(rule.origin),
        _ => None,
    }
}

#[test]
fn default_registry_loads_cleanly() {
    let router = Router::new();
    let report = router.load_report();

    assert_eq!(report.providers_loaded, 14);
    assert!(report.failed_providers.is_empty(), "{:?}", report.failed_providers);
    assert!(report.invalid_patterns.is_empty(), "{:?}", report.invalid_patterns);
    assert!(report.duplicates.is_empty());
    assert!(report.shadowed.is_empty());
    assert_eq!(router.rule_count(), 26);
}

#[test]
fn login_flow_end_to_end() {
    let mut router = Router::new();

    router.step("Quiero iniciar sesion");
    assert_eq!(router.current_state(), AUTH);

    router.step("mi usuario es 2023631234");
    assert_eq!(router.get_slot("user"), Some(SlotValue::from("2023631234")));
    assert_eq!(router.current_state(), AUTH);

    router.step("Pa$$2025");
    assert_eq!(router.get_slot("auth_ok"), Some(SlotValue::Flag(true)));
    assert_eq!(router.current_state(), AUTH_OK);

    let status = router.status();
    assert_eq!(status.user.as_deref(), Some("2023631234"));
    assert!(status.authenticated);
    assert_eq!(status.turns, 3);
}

#[test]
fn password_sentence_also_signs_in() {
    let mut router = Router::new();

    for turn in ["login", "mi usuario es ana.perez", "mi contraseña es Secreta99"] {
        router.step(turn);
    }

    assert_eq!(router.current_state(), AUTH_OK);
    assert_eq!(router.get_slot("user"), Some(SlotValue::from("ana.perez")));
}

#[test]
fn bare_password_that_looks_like_a_greeting_signs_in() {
    for password in ["Saes.2025", "hola-2025", "login#99"] {
        let mut router = Router::new();
        router.step("iniciar sesion");
        router.step("mi usuario es 2023631234");

        let report = router.step_verbose(password);

        assert_eq!(report.state_after, AUTH_OK, "{password}");
        assert_eq!(router.get_slot("auth_ok"), Some(SlotValue::Flag(true)), "{password}");
    }
}

#[test]
fn user_and_password_in_one_turn() {
    let mut router = Router::new();
    router.step("iniciar sesion");

    router.step("mi usuario es 2023631234 y mi contraseña es x99z");

    assert_eq!(router.get_slot("user"), Some(SlotValue::from("2023631234")));
    assert_eq!(router.current_state(), AUTH_OK);
}

#[test]
fn password_before_user_is_refused() {
    let mut router = Router::new();
    router.step("iniciar sesión");

    let reply = router.step("clave2025");

    assert!(reply.starts_with("Primero dime tu usuario"));
    assert_eq!(router.current_state(), AUTH);
    assert_eq!(router.get_slot("auth_ok"), None);
}

#[test]
fn logout_from_any_state_ends_and_clears() {
    let mut router = signed_in();
    router.step("seleccionar grupo 3CM1");
    assert_eq!(router.current_state(), INSCRIPCION);

    router.step("cerrar sesion");

    assert_eq!(router.current_state(), END);
    assert!(router.context().is_blank());
    assert_eq!(router.get_slot("user"), None);
    assert_eq!(router.get_slot(PENDING_GROUP_SLOT), None);

    // The conversation can start over from END.
    router.step("iniciar sesion");
    assert_eq!(router.current_state(), AUTH);
}

#[test]
fn gibberish_falls_back_in_every_state() {
    let fallback = Options::default().fallback_message;
    let mut router = Router::new();

    let drive: Vec<(&str, &str)> = vec![
        ("", START),
        ("iniciar sesion", AUTH),
        ("mi usuario es 2023631234", AUTH),
        ("1234abcd", AUTH_OK),
        ("info personal", INFO_PERSONAL),
        ("kardex", INFO_ACADEMICA),
        ("boleta", CALIFICACIONES),
        ("inscripcion", INSCRIPCION),
        ("materias", MATERIAS),
        ("tramites", TRAMITES),
        ("cerrar sesion", END),
    ];

    for (turn, expected) in drive {
        if !turn.is_empty() {
            router.step(turn);
        }
        assert_eq!(router.current_state(), expected, "after {turn:?}");

        let report = router.step_verbose("asdkjasd");
        assert_eq!(report.reply, fallback, "in {expected}");
        assert_eq!(report.outcome, Outcome::Fallback);
        assert_eq!(router.current_state(), expected);
    }
}

#[test]
fn signed_in_intents_are_gated_before_login() {
    let fallback = Options::default().fallback_message;

    for text in ["materias", "ver calificaciones", "info personal", "kardex", "tramites", "seleccionar grupo 3CM1"] {
        let mut router = Router::new();
        let report = router.step_verbose(text);

        assert_eq!(report.reply, fallback, "{text}");
        assert!(report.scan.gated > 0);
        assert_eq!(router.current_state(), START);
    }
}

#[test]
fn intents_route_to_their_provider() {
    let cases: Vec<(&str, &str, &str)> = vec![
        // (input, origin, state after)
        ("info personal", "info_personal", INFO_PERSONAL),
        ("info", "info_academica", INFO_ACADEMICA),
        ("Historial académico", "info_academica", INFO_ACADEMICA),
        ("ver calificaciones", "calificaciones", CALIFICACIONES),
        ("inscribirme", "inscripcion", INSCRIPCION),
        ("lista de materias", "materias", MATERIAS),
        ("cupos", "materias", MATERIAS),
        ("trámites", "tramites", TRAMITES),
        ("ETS", "tramites", TRAMITES),
        ("materias no aprobadas", "tramites", TRAMITES),
        ("dictamen", "dictamen", TRAMITES),
        ("opciones", "opciones", AUTH_OK),
        ("¿qué eres?", "info_previa", AUTH_OK),
        ("muchas gracias", "agradecimientos", AUTH_OK),
        ("bienvenida", "inicio_info", AUTH_OK),
    ];

    for (input, origin, state) in cases {
        let mut router = signed_in();
        assert_eq!(matched_origin(&mut router, input).as_deref(), Some(origin), "{input}");
        assert_eq!(router.current_state(), state, "{input}");
    }
}

#[test]
fn unrestricted_intents_keep_the_state() {
    let mut router = signed_in();
    router.step("materias");

    for text in ["gracias", "menu"] {
        router.step(text);
        assert_eq!(router.current_state(), MATERIAS, "{text}");
    }

    let mut fresh = Router::new();
    let reply = fresh.step("ayuda");
    assert!(reply.starts_with("Opciones básicas"));
    assert_eq!(fresh.current_state(), START);
}

#[test]
fn info_previa_answers_before_login() {
    let mut router = Router::new();

    let reply = router.step("¿Cómo puedo iniciar sesión?");

    assert!(reply.starts_with("Para iniciar sesión"));
    assert_eq!(router.current_state(), START);
}

#[test]
fn enrollment_sub_flow() {
    let mut router = signed_in();

    router.step("materias");
    router.step("seleccionar grupo 3cm1");
    assert_eq!(router.current_state(), INSCRIPCION);
    assert_eq!(router.get_slot(PENDING_GROUP_SLOT), Some(SlotValue::from("3CM1")));

    let reply = router.step("Confirmar");
    assert_eq!(reply, "Inscripción confirmada en el grupo 3CM1.");
    assert_eq!(router.get_slot(PENDING_GROUP_SLOT), None);
    assert_eq!(router.get_slot(ENROLLED_GROUP_SLOT), Some(SlotValue::from("3CM1")));
}

#[test]
fn tramites_remembers_the_procedure() {
    let mut router = signed_in();

    router.step("quiero solicitar dictamen");
    assert_eq!(router.get_slot(PROCEDURE_SLOT), Some(SlotValue::from("dictamen")));

    router.step("exámenes extraordinarios");
    assert_eq!(router.get_slot(PROCEDURE_SLOT), Some(SlotValue::from("ets")));
    assert_eq!(router.current_state(), TRAMITES);
}

#[test]
fn failed_subjects_ask_about_ets() {
    for text in ["tengo materias reprobadas", "que materias reprobe", "materias no aprobadas", "mis reprobadas"] {
        let mut router = signed_in();

        assert_eq!(matched_origin(&mut router, text).as_deref(), Some("tramites"), "{text}");
        assert_eq!(router.get_slot(PROCEDURE_SLOT), Some(SlotValue::from("ets")), "{text}");
        assert_eq!(router.current_state(), TRAMITES);
    }

    let mut router = signed_in();
    assert_eq!(matched_origin(&mut router, "materias").as_deref(), Some("materias"));
}

#[test]
fn dictamen_sub_flow() {
    let mut router = signed_in();

    let menu = router.step("quiero solicitar dictamen");
    assert!(menu.contains("2. Sistemas Operativos"));
    assert_eq!(router.current_state(), TRAMITES);

    let early = router.step("carta: necesito ayuda para recursar");
    assert!(early.starts_with("Primero selecciona la materia"));

    router.step("dictamen calculo vectorial");
    assert_eq!(router.get_slot(DICTAMEN_SELECTED_SLOT), Some(SlotValue::from("Cálculo Vectorial")));

    // "ayuda" inside the letter must not reach the help menu.
    let report = router.step_verbose("carta: necesito ayuda para recursar Cálculo Vectorial");
    assert_eq!(report.outcome, Outcome::Matched(crate::RuleRef { origin: "dictamen".into(), name: "LETTER".into() }));
    assert_eq!(router.get_slot(DICTAMEN_SELECTED_SLOT), None);
    assert_eq!(router.get_slot(DICTAMEN_FOLIO_SLOT), Some(SlotValue::from("DIC-202501130800-01")));
}

#[test]
fn reset_keeps_the_rules() {
    let mut router = signed_in();
    let rules = router.rule_count();

    router.reset();

    assert_eq!(router.current_state(), START);
    assert!(router.context().is_blank());
    assert_eq!(router.rule_count(), rules);

    router.step("iniciar sesion");
    assert_eq!(router.current_state(), AUTH);
}

#[test]
fn sessions_are_independent() {
    let mut ana = signed_in();
    let mut luis = ana.new_session();

    assert_eq!(luis.current_state(), START);
    luis.step("iniciar sesion");

    assert_eq!(ana.current_state(), AUTH_OK);
    assert_eq!(luis.current_state(), AUTH);
    assert!(ana.step("boleta").contains("2023631234"));
}

proptest! {
    #[test]
    fn every_turn_gets_a_reply(turns in proptest::collection::vec(".{0,40}", 1..6)) {
        let mut router = Router::new();
        for turn in &turns {
            let reply = router.step(turn);
            prop_assert!(!reply.is_empty());
            prop_assert!(!router.current_state().is_empty());
        }
    }
}
