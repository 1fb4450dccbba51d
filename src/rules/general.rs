//! Conversation-level intents: what the assistant is, the menu, thanks.

use super::helpers::{AUTH, AUTH_OK};
use crate::{Context, Gate, HandlerResult, NamedPattern, ProviderLoadError, ProvidesRules};

const WHO_RE: &str = r"
\b(
    (?: q | que ) \s* e?res \?? |
    quien \s* eres \?? |
    que \s* (?: haces | sois )
)\b
";

const CAPABILITIES_RE: &str = r"
\b(
    que \s* (?: pueds | puedes | puedses ) \s* (?: hace?r | aser )? |
    para \s* que \s* (?: sirves | sives | sirve ) |
    cuales? \s* son \s* tus \s* (?: funciones | habilidades | opciones )
)\b
";

const HOW_TO_LOGIN_RE: &str = r"
\b(
    (?: como | kmo | komo | cuando | kuando | kndo | que | ke ) \s+
    (?: puedo | podria | debo | necesito | quiero )? \s*
    (?: iniciar | inciar | inicio | inicar | iniiar | entrar | ingresar | acceder | aceder |
        log(?:in)? | loguear(?:me|se)? | meterme | abrir | acceso )
    (?: \s+ (?: a \s+ )? (?: mi \s+ )? (?: cuenta | usuario | sesion | session | secion | seson | sistema ) )?
)\b
";

const PASSWORD_HELP_RE: &str = r"
\b(
    (?: problemas? | error | olvide | cambio | cambiar | restaurar | recuperar | resetear ) \s+
    (?: con \s+ )? (?: mi \s+ | la \s+ )?
    (?: clave | password | pass | contrasena | contrasea | cotrasena )
)\b
";

/// About the assistant and how to use it, before or right after signing in.
pub struct InfoPrevia;

impl ProvidesRules for InfoPrevia {
    fn origin(&self) -> &str {
        "info_previa"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns![
            "WHO" => WHO_RE,
            "CAPABILITIES" => CAPABILITIES_RE,
            "HOW_TO_LOGIN" => HOW_TO_LOGIN_RE,
            "PASSWORD_HELP" => PASSWORD_HELP_RE,
        ])
    }

    fn handle(&self, _ctx: &mut Context, text: &str) -> HandlerResult {
        let t = crate::normalize(text);

        let reply = if regex!(WHO_RE).is_match(&t) {
            "Soy un asistente del SAES que entiende comandos comunes, incluso con errores de ortografía. Te ayudo \
             con: inicio y cierre de sesión, info académica, materias, trámites, inscripción y consultas rápidas.\n\n\
             Prueba: '¿qué puedes hacer?', 'iniciar sesión', 'problemas con mi contraseña'."
        } else if regex!(CAPABILITIES_RE).is_match(&t) {
            "Puedo ayudarte a:\n\
             • Iniciar sesión y cerrar sesión.\n\
             • Ver info académica, materias, grupos y cupos.\n\
             • Consultar calificaciones.\n\
             • Orientarte en trámites e inscripción.\n\n\
             Comandos de ejemplo: 'iniciar sesion', 'ver materias', 'info academica', 'tramites' o 'inscripcion'."
        } else if regex!(HOW_TO_LOGIN_RE).is_match(&t) {
            "Para iniciar sesión:\n\
             1) Di: 'iniciar sesion' (o 'entrar', 'login').\n\
             2) Cuando te pida el usuario, responde: 'mi usuario es 2023630011'.\n\
             3) Luego la contraseña: 'mi contrasena es 1234', o escríbela sola.\n\n\
             Ya dentro podrás pedir 'materias', 'info academica', 'tramites' o 'inscripcion'."
        } else if regex!(PASSWORD_HELP_RE).is_match(&t) {
            "Si olvidaste o tienes problemas con tu contraseña:\n\
             • Te pediremos tu boleta y un correo para verificación.\n\
             • Si no funciona, acude a servicios escolares para restablecerla.\n\n\
             Mientras tanto, puedes volver a intentar: 'iniciar sesion'."
        } else {
            "¿Qué necesitas saber? Puedo explicarte qué soy, qué puedo hacer, cómo iniciar sesión o cómo \
             recuperar tu contraseña."
        };

        Ok(reply.to_string())
    }

    fn allowed_states(&self) -> Gate {
        Gate::only([crate::START, AUTH, AUTH_OK, crate::END])
    }
}

const WELCOME_RE: &str = r"\b( inicio \s* info | informacion \s+ inicial | bienvenida )\b";

pub struct InicioInfo;

impl ProvidesRules for InicioInfo {
    fn origin(&self) -> &str {
        "inicio_info"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns!["WELCOME" => WELCOME_RE])
    }

    fn handle(&self, ctx: &mut Context, _text: &str) -> HandlerResult {
        if ctx.is_authenticated() {
            return Ok("Ya estás adentro. Pide: 'ver calificaciones', 'info academica', 'info personal', 'materias', \
                       'tramites', 'inscripcion' u 'opciones'."
                .to_string());
        }
        Ok("Bienvenido al asistente del SAES. Para comenzar, di: 'iniciar sesion'.".to_string())
    }

    fn allowed_states(&self) -> Gate {
        Gate::only([crate::START, AUTH, AUTH_OK, crate::END])
    }
}

const MENU_RE: &str = r"\b( opciones | menu | ayuda | que \s+ puedo \s+ hacer )\b";

/// The menu; what is offered depends on whether the student signed in.
pub struct Opciones;

impl ProvidesRules for Opciones {
    fn origin(&self) -> &str {
        "opciones"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns!["MENU" => MENU_RE])
    }

    fn handle(&self, ctx: &mut Context, _text: &str) -> HandlerResult {
        if !ctx.is_authenticated() {
            return Ok("Opciones básicas: 'iniciar sesion'. Luego podrás pedir 'ver calificaciones', \
                       'info academica', 'info personal', 'materias', 'tramites' o 'inscripcion'."
                .to_string());
        }
        Ok("Opciones: 'ver calificaciones', 'info academica', 'info personal', 'materias', 'tramites', \
            'inscripcion', 'cerrar sesion'."
            .to_string())
    }
}

const THANKS_RE: &str = r"
\b(
    gracias | te \s+ lo \s+ agradezco | muy \s+ amable | tenkiu | thank \s* you | thanks
)\b
";

pub struct Agradecimientos;

impl ProvidesRules for Agradecimientos {
    fn origin(&self) -> &str {
        "agradecimientos"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns!["THANKS" => THANKS_RE])
    }

    fn handle(&self, _ctx: &mut Context, _text: &str) -> HandlerResult {
        Ok("¡De nada! Si necesitas algo más, escribe 'opciones'.".to_string())
    }
}
