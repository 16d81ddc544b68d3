use rquickjs::{Context, Ctx, Runtime, Value};

use crate::bridge::dispatch::{self, Installed};
use crate::bridge::exception::coerce_string;
use crate::bridge::registry::HostRegistry;
use crate::error::{BridgeError, Result, ScriptError};
use crate::model::config::RuntimeConfig;

/// One interpreter runtime with a single full context. Each thread that runs
/// scripts owns its own engine.
pub struct Engine {
    runtime: Runtime,
    context: Context,
}

impl Engine {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let runtime = Runtime::new()?;

        if config.memory_limit > 0 {
            runtime.set_memory_limit(config.memory_limit);
        }
        if config.max_stack_size > 0 {
            runtime.set_max_stack_size(config.max_stack_size);
        }
        if config.gc_threshold > 0 {
            runtime.set_gc_threshold(config.gc_threshold);
        }

        let context = Context::full(&runtime)?;

        tracing::debug!(
            memory_limit = config.memory_limit,
            max_stack_size = config.max_stack_size,
            gc_threshold = config.gc_threshold,
            "engine created"
        );

        Ok(Self { runtime, context })
    }

    /// Expose every function in `registry` as a global of this engine's context.
    pub fn install(&self, registry: HostRegistry) -> Result<Installed> {
        self.context.with(|ctx| {
            dispatch::install(&ctx, registry).map_err(|err| BridgeError::from_js(&ctx, err))
        })
    }

    pub fn with<F, R>(&self, f: F) -> R
    where
        F: for<'js> FnOnce(Ctx<'js>) -> R,
    {
        self.context.with(f)
    }

    /// Evaluate `code` and return its completion value as a string.
    pub fn eval(&self, code: &str) -> Result<String> {
        self.context.with(|ctx| {
            let value: Value = ctx
                .eval(code)
                .map_err(|err| BridgeError::from_js(&ctx, err))?;
            Ok(coerce_string(&value))
        })
    }

    /// Run queued promise jobs until none remain. Returns how many ran.
    pub fn execute_pending_jobs(&self) -> Result<usize> {
        let mut executed = 0;
        loop {
            match self.runtime.execute_pending_job() {
                Ok(true) => executed += 1,
                Ok(false) => return Ok(executed),
                Err(_) => {
                    let err = self.context.with(|ctx| ScriptError::take_pending(&ctx));
                    return Err(err.into());
                }
            }
        }
    }

    pub fn run_gc(&self) {
        self.runtime.run_gc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::exception::HostError;
    use crate::model::kind::ExceptionKind;

    #[test]
    fn eval_returns_string_form() {
        let engine = Engine::new(&RuntimeConfig::default()).unwrap();
        assert_eq!(engine.eval("`2 ** 8 = ${2 ** 8}`").unwrap(), "2 ** 8 = 256");
        assert_eq!(engine.eval("false && true").unwrap(), "false");
        assert_eq!(engine.eval("undefined").unwrap(), "undefined");
    }

    #[test]
    fn script_exceptions_surface_as_script_errors() {
        let engine = Engine::new(&RuntimeConfig::default()).unwrap();
        let err = engine.eval("throw new RangeError('nope')").unwrap_err();

        let script = match err {
            BridgeError::Script(script) => script,
            other => panic!("expected a script error, got {other:?}"),
        };
        assert_eq!(script.kind, Some(ExceptionKind::Range));
        assert_eq!(script.cause, "RangeError: nope");
    }

    #[test]
    fn installed_functions_are_callable() {
        let engine = Engine::new(&RuntimeConfig::default()).unwrap();
        let mut registry = HostRegistry::new();
        registry
            .register("fail", |_inv, _this, _args| Err(HostError::reference("gone is not defined")))
            .unwrap();

        let installed = engine.install(registry).unwrap();
        assert_eq!(installed.names, vec!["fail".to_string()]);

        let err = engine.eval("fail()").unwrap_err();
        let script = match err {
            BridgeError::Script(script) => script,
            other => panic!("expected a script error, got {other:?}"),
        };
        assert_eq!(script.kind, Some(ExceptionKind::Reference));
        assert_eq!(script.cause, "ReferenceError: gone is not defined");
    }

    #[test]
    fn pending_jobs_are_drained() {
        let engine = Engine::new(&RuntimeConfig::default()).unwrap();
        engine
            .eval("globalThis.done = false; Promise.resolve().then(() => { done = true; })")
            .unwrap();

        assert!(engine.execute_pending_jobs().unwrap() >= 1);
        assert_eq!(engine.eval("done").unwrap(), "true");
        assert_eq!(engine.execute_pending_jobs().unwrap(), 0);
    }

    #[test]
    fn memory_limit_is_enforced() {
        let config = RuntimeConfig {
            memory_limit: 4 * 1024 * 1024,
            ..RuntimeConfig::default()
        };
        let engine = Engine::new(&config).unwrap();

        assert!(engine.eval("new Array(1e7).fill('x').join('')").is_err());
        engine.run_gc();
    }
}
