use crate::adapters::log_store::remote_log_path;
use crate::config::toml_config::{LaunchConfig, RuntimeConfig};
use crate::core::params::ParameterSet;
use crate::core::runtime::NextflowCommand;
use crate::core::workdir;
use crate::domain::ports::{ExecutionNameSource, LogStore, StorageProvisioner};
use crate::utils::error::{LaunchError, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;
use url::Url;

/// Provisions the shared volume and returns its claim name.
pub async fn initialize<P: StorageProvisioner + ?Sized>(
    provisioner: &P,
    storage_gib: u32,
) -> Result<String> {
    provisioner.provision(storage_gib).await
}

/// What happened to the pipeline log after the run.
#[derive(Debug, Clone, PartialEq)]
pub enum LogUpload {
    Uploaded(Url),
    NoLogFile,
    NoExecutionName,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub pvc_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub log: LogUpload,
}

/// The runtime task: stage the work dir, run Nextflow, upload its log.
pub struct PipelineRuntime<N: ExecutionNameSource, L: LogStore> {
    runtime: RuntimeConfig,
    log_dir: Url,
    names: N,
    logs: L,
    monitor_interval: Option<Duration>,
}

impl<N: ExecutionNameSource, L: LogStore> PipelineRuntime<N, L> {
    pub fn new(config: &LaunchConfig, names: N, logs: L) -> Result<Self> {
        Ok(Self {
            runtime: config.runtime.clone(),
            log_dir: config.log_dir_url()?,
            names,
            logs,
            monitor_interval: None,
        })
    }

    pub fn with_monitoring(mut self, interval: Duration) -> Self {
        self.monitor_interval = Some(interval);
        self
    }

    /// Resolves parameters into the command that would run. No side effects.
    pub fn plan(&self, pvc_name: &str, params: &ParameterSet) -> Result<NextflowCommand> {
        let flags = params.to_flags()?;
        Ok(NextflowCommand::new(&self.runtime, pvc_name, flags))
    }

    pub async fn run(&self, pvc_name: &str, params: &ParameterSet) -> Result<RunReport> {
        let command = self.plan(pvc_name, params)?;
        let started_at = Utc::now();

        let outcome = self.execute(&command).await;
        let upload = self.upload_log().await;
        let finished_at = Utc::now();

        match (outcome, upload) {
            (Err(run_err), upload) => {
                if let Err(upload_err) = upload {
                    tracing::warn!("Log upload also failed: {}", upload_err);
                }
                Err(run_err)
            }
            (Ok(()), Err(upload_err)) => Err(upload_err),
            (Ok(()), Ok(log)) => Ok(RunReport {
                pvc_name: pvc_name.to_string(),
                started_at,
                finished_at,
                log,
            }),
        }
    }

    async fn execute(&self, command: &NextflowCommand) -> Result<()> {
        let src = self.runtime.source_dir.clone();
        let dest = self.runtime.shared_dir.clone();
        let exclude = self.runtime.exclude.clone();

        tracing::info!("Staging {} into {}", src.display(), dest.display());
        tokio::task::spawn_blocking(move || workdir::copy_tree(&src, &dest, &exclude))
            .await
            .map_err(|e| LaunchError::IoError(std::io::Error::other(e)))??;

        command.run(self.monitor_interval).await
    }

    /// Best effort: a missing log or unknown execution name is not an error.
    pub async fn upload_log(&self) -> Result<LogUpload> {
        let local = self.runtime.shared_dir.join(crate::core::runtime::NEXTFLOW_LOG);
        if !local.is_file() {
            tracing::debug!("No {} to upload", local.display());
            return Ok(LogUpload::NoLogFile);
        }

        let Some(name) = self.names.execution_name().await else {
            tracing::warn!("Skipping logs upload, failed to get execution name");
            return Ok(LogUpload::NoExecutionName);
        };

        let remote = remote_log_path(&self.log_dir, &name)?;
        tracing::info!("Uploading .nextflow.log to {}", remote);
        self.logs.upload(&local, &remote).await?;
        Ok(LogUpload::Uploaded(remote))
    }
}

/// The whole workflow: provision, then run.
pub struct WorkflowLauncher<P: StorageProvisioner, N: ExecutionNameSource, L: LogStore> {
    provisioner: P,
    runtime: PipelineRuntime<N, L>,
    storage_gib: u32,
}

impl<P: StorageProvisioner, N: ExecutionNameSource, L: LogStore> WorkflowLauncher<P, N, L> {
    pub fn new(provisioner: P, runtime: PipelineRuntime<N, L>, storage_gib: u32) -> Self {
        Self {
            provisioner,
            runtime,
            storage_gib,
        }
    }

    pub async fn launch(&self, params: &ParameterSet) -> Result<RunReport> {
        // Fail on bad parameters before asking for storage.
        params.resolve()?;

        let pvc_name = initialize(&self.provisioner, self.storage_gib).await?;
        self.runtime.run(&pvc_name, params).await
    }
}
