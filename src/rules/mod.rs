//! Built-in SAES rule providers.
//!
//! The order of [`default_providers`] is the matching priority: narrow intents
//! come before broad ones (`info_personal` before `info_academica`, whose
//! pattern accepts a bare "info"; `tramites` before `materias`, so "materias
//! no aprobadas" asks about ETS). `dictamen` follows `cerrar_sesion` because
//! its letter turn is free text.

use std::sync::Arc;

use crate::ProvidesRules;

mod academic;
mod access;
mod enrollment;
mod general;
pub(crate) mod helpers;
mod procedures;

pub use academic::{Calificaciones, InfoAcademica, InfoPersonal, Materias};
pub use access::{Login, Logout, Password};
pub use enrollment::{ENROLLED_GROUP_SLOT, Inscripcion, PENDING_GROUP_SLOT};
pub use general::{Agradecimientos, InfoPrevia, InicioInfo, Opciones};
pub use helpers::{
    AUTH, AUTH_OK, CALIFICACIONES, INFO_ACADEMICA, INFO_PERSONAL, INSCRIPCION, MATERIAS, SIGNED_IN_STATES, TRAMITES,
};
pub use procedures::{DICTAMEN_FOLIO_SLOT, DICTAMEN_SELECTED_SLOT, Dictamen, PROCEDURE_SLOT, Tramites};

/// The SAES providers, in registration order.
pub fn default_providers() -> Vec<Arc<dyn ProvidesRules>> {
    vec![
        Arc::new(Logout),
        Arc::new(Dictamen),
        Arc::new(InfoPrevia),
        Arc::new(Login),
        Arc::new(Password),
        Arc::new(InicioInfo),
        Arc::new(Opciones),
        Arc::new(InfoPersonal),
        Arc::new(InfoAcademica),
        Arc::new(Calificaciones),
        Arc::new(Inscripcion),
        Arc::new(Tramites),
        Arc::new(Materias),
        Arc::new(Agradecimientos),
    ]
}

#[cfg(test)]
mod tests;
