//! Error taxonomy of the router core.
//!
//! None of these escape `Router::step`: invalid patterns and failing
//! providers are skipped while the registry is built, and handler failures
//! are turned into a generic reply at the router boundary. Only manual
//! registration (`Router::route`) hands an error back to the caller.

use thiserror::Error;

/// A contributed pattern could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("pattern `{pattern}` does not compile: {message}")]
    Syntax { pattern: String, message: String },
}

/// A rule provider could not be loaded; it contributes no rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderLoadError {
    #[error("provider has an empty origin")]
    InvalidOrigin,

    #[error("provider `{origin}` declares an empty state label")]
    InvalidState { origin: String },

    #[error("provider `{origin}` failed to initialize: {reason}")]
    Init { origin: String, reason: String },
}

/// A handler could not produce a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("handler failed: {0}")]
    Failed(String),

    #[error("required slot `{0}` is missing")]
    MissingSlot(&'static str),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

/// Manual registration through `Router::route` was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error(transparent)]
    InvalidPattern(#[from] InvalidPatternError),

    #[error("origin must not be empty")]
    InvalidOrigin,

    #[error("state labels must not be empty")]
    InvalidState,

    #[error("origin `{origin}` already registered pattern `{pattern}`")]
    Duplicate { origin: String, pattern: String },
}
