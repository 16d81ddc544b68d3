use rquickjs::convert::Coerced;
use rquickjs::function::Constructor;
use rquickjs::{Ctx, Exception, Value};

use crate::model::kind::ExceptionKind;

/// A host function's failure report: one exception kind plus an
/// already-formatted message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct HostError {
    pub kind: ExceptionKind,
    pub message: String,
}

pub type HostResult<T> = std::result::Result<T, HostError>;

impl HostError {
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::Syntax, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::Type, message)
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::Reference, message)
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::Range, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::Internal, message)
    }

    /// Raise this error on `ctx` and return the pending-exception marker.
    pub fn into_pending(self, ctx: &Ctx<'_>) -> rquickjs::Error {
        make_error(self.kind, ctx, &self.message)
    }
}

/// Conversion failures surface as `TypeError`; everything else is the host's fault.
impl From<rquickjs::Error> for HostError {
    fn from(err: rquickjs::Error) -> Self {
        match err {
            rquickjs::Error::FromJs { .. }
            | rquickjs::Error::IntoJs { .. }
            | rquickjs::Error::MissingArgs { .. }
            | rquickjs::Error::TooManyArgs { .. } => HostError::type_error(err.to_string()),
            _ => HostError::internal(err.to_string()),
        }
    }
}

/// Longest message, in bytes, the interpreter's throw primitives carry intact.
const PRIMITIVE_MESSAGE_LIMIT: usize = 255;

/// Set a pending exception of `kind` carrying `message` verbatim.
///
/// The message is never treated as a format string. The interpreter's throw
/// primitives take a bounded C string, so a message that is too long or has
/// an interior NUL goes through the script-level constructor of the same kind
/// instead.
pub fn make_error(kind: ExceptionKind, ctx: &Ctx<'_>, message: &str) -> rquickjs::Error {
    if message.len() <= PRIMITIVE_MESSAGE_LIMIT && !message.contains('\0') {
        return throw_primitive(kind, ctx, message);
    }

    match construct_and_throw(kind, ctx, message) {
        Ok(marker) => marker,
        Err(_) => throw_primitive(kind, ctx, &message.replace('\0', "\u{FFFD}")),
    }
}

pub fn throw_syntax_error(ctx: &Ctx<'_>, message: &str) -> rquickjs::Error {
    make_error(ExceptionKind::Syntax, ctx, message)
}

pub fn throw_type_error(ctx: &Ctx<'_>, message: &str) -> rquickjs::Error {
    make_error(ExceptionKind::Type, ctx, message)
}

pub fn throw_reference_error(ctx: &Ctx<'_>, message: &str) -> rquickjs::Error {
    make_error(ExceptionKind::Reference, ctx, message)
}

pub fn throw_range_error(ctx: &Ctx<'_>, message: &str) -> rquickjs::Error {
    make_error(ExceptionKind::Range, ctx, message)
}

pub fn throw_internal_error(ctx: &Ctx<'_>, message: &str) -> rquickjs::Error {
    make_error(ExceptionKind::Internal, ctx, message)
}

fn throw_primitive(kind: ExceptionKind, ctx: &Ctx<'_>, message: &str) -> rquickjs::Error {
    match kind {
        ExceptionKind::Syntax => Exception::throw_syntax(ctx, message),
        ExceptionKind::Type => Exception::throw_type(ctx, message),
        ExceptionKind::Reference => Exception::throw_reference(ctx, message),
        ExceptionKind::Range => Exception::throw_range(ctx, message),
        ExceptionKind::Internal => Exception::throw_internal(ctx, message),
    }
}

fn construct_and_throw<'js>(
    kind: ExceptionKind,
    ctx: &Ctx<'js>,
    message: &str,
) -> rquickjs::Result<rquickjs::Error> {
    let constructor: Constructor<'js> = ctx.globals().get(kind.name())?;
    let error: Value<'js> = constructor.construct((message,))?;
    Ok(ctx.throw(error))
}

/// String form of `value` as script code would print it.
pub(crate) fn coerce_string(value: &Value<'_>) -> String {
    match value.get::<Coerced<String>>() {
        Ok(coerced) => coerced.0,
        Err(err) => {
            // e.g. a Symbol, whose conversion throws
            if err.is_exception() {
                value.ctx().catch();
            }
            "<unprintable>".to_string()
        }
    }
}
