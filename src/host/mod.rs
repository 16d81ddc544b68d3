pub mod host_fns;
pub mod runtime;

pub use host_fns::HostFunctions;
pub use runtime::Engine;
