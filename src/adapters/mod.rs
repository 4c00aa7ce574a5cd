// Adapters layer: concrete implementations of the domain ports (platform HTTP services, log stores).

pub mod log_store;
pub mod platform;

pub use log_store::{remote_log_path, HttpLogStore, LocalLogStore};
pub use platform::{ExecutionToken, HttpProvisioner, PlatformExecutionNames};
