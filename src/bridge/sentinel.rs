use rquickjs::{Ctx, Type, Value};

/// The three interpreter-owned constants a host function can hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    Null,
    Undefined,
    /// Declared but not yet assigned, e.g. a hoisted `let` binding.
    Uninitialized,
}

impl Sentinel {
    pub fn make<'js>(self, ctx: &Ctx<'js>) -> Value<'js> {
        match self {
            Sentinel::Null => make_null(ctx),
            Sentinel::Undefined => make_undefined(ctx),
            Sentinel::Uninitialized => make_uninitialized(ctx),
        }
    }

    /// Classify `value` as one of the sentinels, if it is one.
    pub fn of(value: &Value<'_>) -> Option<Self> {
        match value.type_of() {
            Type::Null => Some(Sentinel::Null),
            Type::Undefined => Some(Sentinel::Undefined),
            Type::Uninitialized => Some(Sentinel::Uninitialized),
            _ => None,
        }
    }
}

pub fn make_null<'js>(ctx: &Ctx<'js>) -> Value<'js> {
    Value::new_null(ctx.clone())
}

pub fn make_undefined<'js>(ctx: &Ctx<'js>) -> Value<'js> {
    Value::new_undefined(ctx.clone())
}

pub fn make_uninitialized<'js>(ctx: &Ctx<'js>) -> Value<'js> {
    Value::new_uninitialized(ctx.clone())
}
