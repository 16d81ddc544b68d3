pub mod config;
pub mod kind;

pub use config::{BridgeConfig, RuntimeConfig};
pub use kind::ExceptionKind;
