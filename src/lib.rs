//! Bridge between a host application and an embedded QuickJS interpreter.
//!
//! Host functions are registered in a [`HostRegistry`] and installed into a
//! context, where scripts call them through a single native proxy. Host logic
//! reports failures as a [`HostError`]; the bridge turns each one into a
//! script-catchable exception of the matching kind.

pub mod bridge;
pub mod error;
pub mod host;
pub mod model;

pub use bridge::{
    FunctionId, HostError, HostRegistry, HostResult, Installed, Invocation, RegistryError, Sentinel,
};
pub use error::{BridgeError, Result, ScriptError};
pub use host::{Engine, HostFunctions};
pub use model::{BridgeConfig, ExceptionKind, RuntimeConfig};
