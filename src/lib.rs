pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;
pub use config::LaunchConfig;

pub use crate::core::launcher::{initialize, LogUpload, PipelineRuntime, RunReport, WorkflowLauncher};
pub use crate::core::params::ParameterSet;
pub use utils::error::{LaunchError, Result};
