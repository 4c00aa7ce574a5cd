use crate::config::toml_config::RuntimeConfig;
use crate::utils::error::{LaunchError, Result};
use crate::utils::monitor::ProcessMonitor;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// File name Nextflow writes its run log to, inside the launch directory.
pub const NEXTFLOW_LOG: &str = ".nextflow.log";

/// A fully resolved Nextflow invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct NextflowCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: PathBuf,
}

impl NextflowCommand {
    pub fn new(runtime: &RuntimeConfig, pvc_name: &str, flags: Vec<String>) -> Self {
        let shared = &runtime.shared_dir;
        let mut args = vec![
            "run".to_string(),
            shared.join("main.nf").display().to_string(),
            "-work-dir".to_string(),
            shared.display().to_string(),
            "-profile".to_string(),
            runtime.profile.clone(),
            "-c".to_string(),
            runtime.config_file.clone(),
        ];
        args.extend(flags);

        let env = vec![
            ("NXF_HOME".to_string(), runtime.nxf_home.clone()),
            ("NXF_OPTS".to_string(), runtime.nxf_opts.clone()),
            ("K8S_STORAGE_CLAIM_NAME".to_string(), pvc_name.to_string()),
            ("NXF_DISABLE_CHECK_LATEST".to_string(), "true".to_string()),
        ];

        Self {
            program: runtime.nextflow_bin.clone(),
            args,
            env,
            cwd: shared.clone(),
        }
    }

    /// Space-joined command line, as printed before launch.
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn log_path(&self) -> PathBuf {
        self.cwd.join(NEXTFLOW_LOG)
    }

    /// Runs the pipeline to completion with inherited stdio. A nonzero exit
    /// or death by signal is an error.
    pub async fn run(&self, monitor_interval: Option<Duration>) -> Result<()> {
        tracing::info!("Launching Nextflow Runtime");
        tracing::info!("{}", self.display_line());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&self.cwd)
            .spawn()
            .map_err(|source| LaunchError::SpawnError {
                program: self.program.display().to_string(),
                source,
            })?;

        let monitor = match (monitor_interval, child.id()) {
            (Some(interval), Some(pid)) => Some(ProcessMonitor::spawn(pid, interval)),
            _ => None,
        };

        let status = child.wait().await;

        if let Some(monitor) = monitor {
            monitor.finish();
        }

        let status = status?;
        if status.success() {
            tracing::info!("Nextflow finished successfully");
            Ok(())
        } else {
            tracing::error!("Nextflow failed: {}", status);
            Err(LaunchError::PipelineFailed {
                code: status.code(),
            })
        }
    }
}
