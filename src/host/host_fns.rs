use std::io::Write;
use std::num::IntErrorKind;

use rquickjs::{IntoJs, Value};

use crate::bridge::dispatch::Invocation;
use crate::bridge::exception::{HostError, HostResult, coerce_string};
use crate::bridge::registry::{HostRegistry, RegistryError};
use crate::model::config::HostConfig;

/// Stock host functions shipped with the bridge.
#[derive(Debug, Default)]
pub struct HostFunctions;

impl HostFunctions {
    pub fn register_all(registry: &mut HostRegistry, config: &HostConfig) -> Result<(), RegistryError> {
        registry.register("print", print)?;
        registry.register("parseInteger", parse_integer)?;
        if config.expose_env {
            registry.register("env", env)?;
        }
        Ok(())
    }
}

/// `print(...values)`: one line on stdout, values separated by spaces.
fn print<'js>(inv: &Invocation<'_, 'js>, _this: Value<'js>, args: &[Value<'js>]) -> HostResult<Value<'js>> {
    let line = args.iter().map(coerce_string).collect::<Vec<_>>().join(" ");

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}").map_err(|err| HostError::internal(format!("print: {err}")))?;

    Ok(inv.undefined())
}

/// Largest magnitude a script number holds without rounding (2^53).
const MAX_SAFE_INTEGER: u64 = 1 << 53;

/// `parseInteger(text, radix = 10)`. Results beyond 2^53 raise a range error.
fn parse_integer<'js>(
    inv: &Invocation<'_, 'js>,
    _this: Value<'js>,
    args: &[Value<'js>],
) -> HostResult<Value<'js>> {
    let text = match args.first() {
        Some(value) if value.is_string() => value.get::<String>()?,
        Some(value) => {
            return Err(HostError::type_error(format!(
                "{} is not a string",
                coerce_string(value)
            )));
        }
        None => return Err(HostError::type_error("parseInteger expects a string")),
    };

    let radix = match args.get(1) {
        None => 10,
        Some(value) if value.is_undefined() => 10,
        Some(value) => {
            let raw = value
                .as_number()
                .ok_or_else(|| HostError::type_error(format!("{} is not a number", coerce_string(value))))?;
            if raw.fract() != 0.0 || !(2.0..=36.0).contains(&raw) {
                return Err(HostError::range(format!("radix must be an integer between 2 and 36, got {raw}")));
            }
            raw as u32
        }
    };

    let parsed = i64::from_str_radix(text.trim(), radix).map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            HostError::range(format!("{text} is out of range"))
        }
        _ => HostError::syntax(format!("{text:?} is not a base-{radix} integer")),
    })?;
    if parsed.unsigned_abs() > MAX_SAFE_INTEGER {
        return Err(HostError::range(format!("{text} is out of range")));
    }

    Ok(Value::new_number(inv.ctx().clone(), parsed as f64))
}

/// `env(name)`: a host environment variable.
fn env<'js>(inv: &Invocation<'_, 'js>, _this: Value<'js>, args: &[Value<'js>]) -> HostResult<Value<'js>> {
    let name = match args.first() {
        Some(value) if value.is_string() => value.get::<String>()?,
        Some(value) => {
            return Err(HostError::type_error(format!(
                "{} is not a string",
                coerce_string(value)
            )));
        }
        None => return Err(HostError::type_error("env expects a variable name")),
    };

    match std::env::var(&name) {
        Ok(value) => Ok(value.into_js(inv.ctx())?),
        Err(std::env::VarError::NotPresent) => {
            Err(HostError::reference(format!("{name} is not defined")))
        }
        Err(std::env::VarError::NotUnicode(_)) => {
            Err(HostError::type_error(format!("{name} is not valid unicode")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::host::runtime::Engine;
    use crate::model::config::RuntimeConfig;
    use crate::model::kind::ExceptionKind;

    fn engine() -> Engine {
        let engine = Engine::new(&RuntimeConfig::default()).unwrap();
        let mut registry = HostRegistry::new();
        HostFunctions::register_all(&mut registry, &HostConfig { expose_env: true }).unwrap();
        engine.install(registry).unwrap();
        engine
    }

    fn failure_kind(engine: &Engine, code: &str) -> Option<ExceptionKind> {
        match engine.eval(code) {
            Err(BridgeError::Script(err)) => err.kind,
            other => panic!("expected a script error from {code}, got {other:?}"),
        }
    }

    #[test]
    fn parse_integer_accepts_radix() {
        let engine = engine();
        assert_eq!(engine.eval("parseInteger('42')").unwrap(), "42");
        assert_eq!(engine.eval("parseInteger('-ff', 16)").unwrap(), "-255");
        assert_eq!(engine.eval("parseInteger(' 101 ', undefined)").unwrap(), "101");
    }

    #[test]
    fn parse_integer_reports_each_failure_kind() {
        let engine = engine();
        assert_eq!(failure_kind(&engine, "parseInteger(1)"), Some(ExceptionKind::Type));
        assert_eq!(failure_kind(&engine, "parseInteger()"), Some(ExceptionKind::Type));
        assert_eq!(failure_kind(&engine, "parseInteger('1', 37)"), Some(ExceptionKind::Range));
        assert_eq!(failure_kind(&engine, "parseInteger('1', 2.5)"), Some(ExceptionKind::Range));
        assert_eq!(failure_kind(&engine, "parseInteger('12z')"), Some(ExceptionKind::Syntax));
        assert_eq!(
            failure_kind(&engine, "parseInteger('99999999999999999999')"),
            Some(ExceptionKind::Range)
        );
    }

    #[test]
    fn parse_integer_rejects_values_beyond_exact_precision() {
        let engine = engine();
        assert_eq!(engine.eval("parseInteger('9007199254740992')").unwrap(), "9007199254740992");
        assert_eq!(engine.eval("parseInteger('-9007199254740992')").unwrap(), "-9007199254740992");
        assert_eq!(
            failure_kind(&engine, "parseInteger('9007199254740993')"),
            Some(ExceptionKind::Range)
        );
        assert_eq!(
            failure_kind(&engine, "parseInteger('-9007199254740993')"),
            Some(ExceptionKind::Range)
        );
        assert_eq!(
            failure_kind(&engine, "parseInteger('7fffffffffffffff', 16)"),
            Some(ExceptionKind::Range)
        );
    }

    #[test]
    fn env_reports_missing_variables_as_reference_errors() {
        let engine = engine();
        assert_eq!(
            failure_kind(&engine, "env('JSBRIDGE_SURELY_UNSET_VARIABLE')"),
            Some(ExceptionKind::Reference)
        );
        assert_eq!(failure_kind(&engine, "env(null)"), Some(ExceptionKind::Type));
        assert_eq!(engine.eval("typeof env('PATH')").unwrap(), "string");
    }

    #[test]
    fn print_returns_undefined() {
        let engine = engine();
        assert_eq!(engine.eval("print('hello', 1, null)").unwrap(), "undefined");
    }

    #[test]
    fn env_can_be_left_out() {
        let mut registry = HostRegistry::new();
        HostFunctions::register_all(&mut registry, &HostConfig { expose_env: false }).unwrap();
        assert_eq!(registry.id_of("env"), None);
        assert_eq!(registry.len(), 2);
    }
}
