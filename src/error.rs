//! Host-side error types.

use rquickjs::{Ctx, Value};

use crate::bridge::exception::coerce_string;
use crate::bridge::registry::RegistryError;
use crate::model::kind::ExceptionKind;

/// A script exception that escaped to the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{cause}")]
pub struct ScriptError {
    /// Parsed from the exception's `name` when it is one of the five bridge kinds.
    pub kind: Option<ExceptionKind>,
    /// String form of the thrown value, e.g. `TypeError: x is not a number`.
    pub cause: String,
    pub stack: Option<String>,
}

impl ScriptError {
    pub fn from_thrown(value: &Value<'_>) -> Self {
        let cause = coerce_string(value);

        let Some(object) = value.as_object() else {
            return Self {
                kind: None,
                cause,
                stack: None,
            };
        };

        let kind = object
            .get::<_, Option<String>>("name")
            .ok()
            .flatten()
            .and_then(|name| name.parse().ok());
        let stack = object
            .get::<_, Option<String>>("stack")
            .ok()
            .flatten()
            .filter(|stack| !stack.is_empty());

        Self { kind, cause, stack }
    }

    /// Take the exception currently pending on `ctx`.
    pub fn take_pending(ctx: &Ctx<'_>) -> Self {
        Self::from_thrown(&ctx.catch())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("interpreter error: {0}")]
    Js(#[from] rquickjs::Error),
}

impl BridgeError {
    /// Like `From<rquickjs::Error>`, but resolves a pending exception into a
    /// [`ScriptError`] while the context is still at hand.
    pub fn from_js(ctx: &Ctx<'_>, err: rquickjs::Error) -> Self {
        if err.is_exception() {
            BridgeError::Script(ScriptError::take_pending(ctx))
        } else {
            BridgeError::Js(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
