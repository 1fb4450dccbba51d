//! Signing in and out.
//!
//! The login flow is multi-turn and owned by the handlers, not by declared
//! transitions:
//!
//! ```text
//! START/END --"iniciar sesion"--> AUTH (asks for the user)
//! AUTH --"mi usuario es X"--> AUTH (user captured, asks for the password)
//! AUTH --"<token>" | "mi contrasena es <token>"--> AUTH_OK
//! any --"cerrar sesion"--> END (context cleared)
//! ```

use super::helpers::{AUTH, AUTH_OK, capture, signed_out};
use crate::{Context, Gate, HandlerResult, InputTraits, NamedPattern, ProviderLoadError, ProvidesRules, Transition};

const LOGOUT_RE: &str = r"\b( cerrar \s+ sesion | logout | log \s* out | salir | terminar )\b";

const LOGIN_RE: &str = r"
\b(
    iniciar \s* sesion | entrar | acceder | ingresar | conectar(?:me|se)? |
    meterme | abrir | login | log \s* in | loguear(?:me|se)? | logear(?:me|se)? |
    sign \s* in | usuario \s* y \s* contrasena | clave \s* de \s* acceso | password | saes | hola
)\b
";

const USER_RE: &str = r"\b mi \s+ usuario \s+ es \s+ ( [a-z0-9._-]+ (?: \s+ [a-z0-9._-]+ )* )";

/// Connector that ends a multi-word user id ("... es 2023631234 y mi contrasena ...").
const USER_END_RE: &str = r"\s+ (?: y | e | mi | con ) (?: \s | $)";

const PASS_SENTENCE_RE: &str = r"\b mi \s+ contrase(?:n|ñ)a \s+ es \s+ ( [a-z0-9@\#$%^\&*().,;:!_\-]{4,} )";

/// A whole line that is a single password-like token.
const PASS_TOKEN_RE: &str = r"^ [a-z0-9@\#$%^\&*().,;:!_\-]{4,} $";

/// A bare password must be one token and carry a digit.
const PASSWORD_TRAITS: InputTraits = InputTraits::HAS_DIGITS.union(InputTraits::SINGLE_TOKEN);

/// `cerrar sesion`: available everywhere, closes the conversation.
pub struct Logout;

impl ProvidesRules for Logout {
    fn origin(&self) -> &str {
        "cerrar_sesion"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns!["LOGOUT" => LOGOUT_RE])
    }

    fn handle(&self, ctx: &mut Context, _text: &str) -> HandlerResult {
        ctx.clear();
        Ok("Sesión cerrada. Escribe 'iniciar sesion' para entrar de nuevo.".to_string())
    }

    fn next_state(&self) -> Transition {
        Transition::to(crate::END)
    }
}

/// Login trigger plus the user and password sentences.
pub struct Login;

impl ProvidesRules for Login {
    fn origin(&self) -> &str {
        "iniciar_sesion"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns![
            "LOGIN" => LOGIN_RE,
            "USER" => USER_RE,
            "PASS_SENTENCE" => PASS_SENTENCE_RE,
        ])
    }

    fn handle(&self, ctx: &mut Context, text: &str) -> HandlerResult {
        let has_password = capture(regex!(PASS_SENTENCE_RE), text, 1).is_some();

        // A new user id is accepted until the password arrives.
        if let Some(captured) = capture(regex!(USER_RE), text, 1) {
            let user = user_id(captured);
            ctx.set_user(user);
            if has_password {
                return Ok(sign_in(ctx));
            }
            ctx.set_state(AUTH);
            return Ok(format!("Usuario '{user}' guardado. Ahora dime tu contraseña."));
        }

        if ctx.user_id().is_none() {
            ctx.set_state(AUTH);
            return Ok("Ok, dime tu usuario (ej: 'mi usuario es 2023630011').".to_string());
        }

        // Tokens like "Saes.2025" also match the login trigger, so the bare
        // password is recognized here as well.
        if has_password || is_password_token(&crate::normalize(text)) {
            return Ok(sign_in(ctx));
        }

        ctx.set_state(AUTH);
        Ok("Ahora dime tu contraseña (puedes escribir solo la contraseña o 'mi contrasena es <tu_clave>').".to_string())
    }

    fn allowed_states(&self) -> Gate {
        signed_out()
    }
}

/// A bare password token while waiting for it.
pub struct Password;

impl ProvidesRules for Password {
    fn origin(&self) -> &str {
        "contrasena"
    }

    fn patterns(&self) -> Result<Vec<NamedPattern>, ProviderLoadError> {
        Ok(patterns!["PASS" => PASS_TOKEN_RE; requires PASSWORD_TRAITS])
    }

    fn handle(&self, ctx: &mut Context, _text: &str) -> HandlerResult {
        if ctx.user_id().is_none() {
            return Ok("Primero dime tu usuario: 'mi usuario es <usuario>'.".to_string());
        }

        // The token itself is never stored.
        Ok(sign_in(ctx))
    }

    fn allowed_states(&self) -> Gate {
        Gate::only([AUTH])
    }
}

fn user_id(captured: &str) -> &str {
    match regex!(USER_END_RE).find(captured) {
        Some(end) => &captured[..end.start()],
        None => captured,
    }
}

fn is_password_token(normalized: &str) -> bool {
    InputTraits::scan(normalized).contains(PASSWORD_TRAITS) && regex!(PASS_TOKEN_RE).is_match(normalized)
}

fn sign_in(ctx: &mut Context) -> String {
    ctx.authenticate();
    ctx.set_state(AUTH_OK);
    welcome(ctx)
}

fn welcome(ctx: &Context) -> String {
    let user = ctx.user_id().unwrap_or("alumno");
    format!(
        "Contraseña recibida. Bienvenido, {user}. ¿Qué deseas? Puedes decir 'ver calificaciones', 'info academica', \
         'materias', 'tramites' o 'inscripcion'."
    )
}
