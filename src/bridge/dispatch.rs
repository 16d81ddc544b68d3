//! The single native entry point scripts reach when they call a host function.
//!
//! Every registered host function is exposed to scripts as a thin wrapper that
//! calls one shared proxy with its [`FunctionId`] prepended to the arguments.
//! The proxy resolves the id against the context's [`HostRegistry`], runs the
//! host logic, and turns a [`HostError`] into exactly one pending exception.

use std::rc::Rc;

use rquickjs::function::{Rest, This};
use rquickjs::{Ctx, Function, Object, Value};

use crate::bridge::exception::{HostError, coerce_string, throw_internal_error};
use crate::bridge::registry::{FunctionId, HostRegistry};
use crate::bridge::sentinel;
use crate::model::kind::ExceptionKind;

const WRAPPER_FACTORY: &str =
    "(proxy, id) => function () { return proxy.call(this, id, ...arguments); }";

/// Borrowed view of one in-flight host call. Valid only for that call.
pub struct Invocation<'a, 'js> {
    ctx: &'a Ctx<'js>,
    id: FunctionId,
    name: &'a str,
}

impl<'a, 'js> Invocation<'a, 'js> {
    pub fn ctx(&self) -> &Ctx<'js> {
        self.ctx
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    /// Name the host function was registered under.
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn null(&self) -> Value<'js> {
        sentinel::make_null(self.ctx)
    }

    pub fn undefined(&self) -> Value<'js> {
        sentinel::make_undefined(self.ctx)
    }

    pub fn uninitialized(&self) -> Value<'js> {
        sentinel::make_uninitialized(self.ctx)
    }

    /// Turn an interpreter error hit while calling back into script code into
    /// a host failure, taking over any exception already pending.
    pub fn catch(&self, err: rquickjs::Error) -> HostError {
        if !err.is_exception() {
            return HostError::from(err);
        }

        let thrown = self.ctx.catch();
        let Some(object) = thrown.as_object() else {
            return HostError::internal(coerce_string(&thrown));
        };

        let kind = object
            .get::<_, Option<String>>("name")
            .ok()
            .flatten()
            .and_then(|name| name.parse::<ExceptionKind>().ok())
            .unwrap_or(ExceptionKind::Internal);
        let message = object
            .get::<_, Option<String>>("message")
            .ok()
            .flatten()
            .unwrap_or_else(|| coerce_string(&thrown));

        HostError::new(kind, message)
    }
}

/// Script-visible names bound by [`install`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Installed {
    pub names: Vec<String>,
}

/// Freeze `registry` into the context: one proxy for all host functions and
/// one global wrapper per registered name.
pub fn install<'js>(ctx: &Ctx<'js>, registry: HostRegistry) -> rquickjs::Result<Installed> {
    install_on(ctx, &ctx.globals(), registry)
}

/// Like [`install`], binding the wrappers as properties of `target`.
pub fn install_on<'js>(
    ctx: &Ctx<'js>,
    target: &Object<'js>,
    registry: HostRegistry,
) -> rquickjs::Result<Installed> {
    let registry = Rc::new(registry);
    let proxy = proxy_function(ctx, Rc::clone(&registry))?;
    let factory: Function<'js> = ctx.eval(WRAPPER_FACTORY)?;

    let mut installed = Installed::default();
    for (id, entry) in registry.iter() {
        let wrapper: Function<'js> = factory.call((proxy.clone(), id.0))?;
        target.set(entry.name(), wrapper)?;
        installed.names.push(entry.name().to_string());
    }

    tracing::debug!(count = installed.names.len(), "installed host functions");
    Ok(installed)
}

fn proxy_function<'js>(ctx: &Ctx<'js>, registry: Rc<HostRegistry>) -> rquickjs::Result<Function<'js>> {
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, this: This<Value<'js>>, args: Rest<Value<'js>>| {
            invoke(&ctx, &registry, this.0, &args.0)
        },
    )
}

/// Resolve and run the host function selected by the leading id in `raw_args`.
///
/// Returns the host function's value, or the pending-exception marker when it
/// fails. Exactly one exception is raised per failed call.
pub fn invoke<'js>(
    ctx: &Ctx<'js>,
    registry: &HostRegistry,
    this: Value<'js>,
    raw_args: &[Value<'js>],
) -> rquickjs::Result<Value<'js>> {
    let Some((tag, args)) = raw_args.split_first() else {
        return Err(throw_internal_error(ctx, "native call is missing its host function id"));
    };

    let Some(id) = decode_id(tag) else {
        return Err(throw_internal_error(
            ctx,
            &format!("invalid host function id: {}", coerce_string(tag)),
        ));
    };

    let Some(entry) = registry.get(id) else {
        return Err(throw_internal_error(
            ctx,
            &format!("no host function registered under {id}"),
        ));
    };

    tracing::trace!(%id, name = entry.name(), argc = args.len(), "dispatching host call");

    let invocation = Invocation {
        ctx,
        id,
        name: entry.name(),
    };

    entry
        .call(&invocation, this, args)
        .map_err(|err| err.into_pending(ctx))
}

fn decode_id(tag: &Value<'_>) -> Option<FunctionId> {
    let raw = tag.as_number()?;
    if raw.fract() != 0.0 || raw < 0.0 || raw > f64::from(u32::MAX) {
        return None;
    }
    Some(FunctionId(raw as u32))
}
