pub mod launcher;
pub mod params;
pub mod runtime;
pub mod schema;
pub mod workdir;

pub use crate::domain::model::{ParamType, ParamValue, Parameter};
pub use crate::domain::ports::{ExecutionNameSource, LogStore, StorageProvisioner};
pub use crate::utils::error::Result;
