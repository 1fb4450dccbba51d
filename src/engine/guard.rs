//! Handler invocation with failure containment.
//!
//! A handler may fail by returning `Err` or by panicking. Either way the
//! context must end up exactly as it was before the call, so the guard takes
//! a snapshot first and restores it on failure. The router only applies the
//! rule's transition after the guard reports success.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::{Context, Handler, HandlerError, HandlerResult};

/// Run `handler` on `ctx`, restoring `ctx` if it fails.
pub(crate) fn invoke(handler: &Handler, ctx: &mut Context, raw: &str) -> HandlerResult {
    let snapshot = ctx.clone();

    let result = match panic::catch_unwind(AssertUnwindSafe(|| (handler.as_ref())(ctx, raw))) {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::Panicked(panic_message(payload.as_ref()))),
    };

    if result.is_err() {
        *ctx = snapshot;
    }

    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
