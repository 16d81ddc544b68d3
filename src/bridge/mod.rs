pub mod dispatch;
pub mod exception;
pub mod registry;
pub mod sentinel;

pub use dispatch::{Installed, Invocation, install, install_on, invoke};
pub use exception::{HostError, HostResult, make_error};
pub use registry::{FunctionId, HostRegistry, RegistryError};
pub use sentinel::{Sentinel, make_null, make_undefined, make_uninitialized};
