use crate::core::params::ParameterSet;
use crate::core::workdir::DEFAULT_EXCLUDES;
use crate::utils::error::{LaunchError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_DISPATCHER_URL: &str = "http://nf-dispatcher-service.flyte.svc.cluster.local";
pub const DEFAULT_LOG_DIR: &str = "latch:///your_log_dir/nf_nf_core_pangenome";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub platform: PlatformConfig,
    pub runtime: RuntimeConfig,
    pub logs: LogsConfig,
    pub params: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub dispatcher_url: String,
    /// Endpoint used to look up the execution name for log uploads.
    pub api_url: Option<String>,
    pub token_env: String,
    pub storage_gib: u32,
    pub log_dir: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            dispatcher_url: DEFAULT_DISPATCHER_URL.to_string(),
            api_url: None,
            token_env: "FLYTE_INTERNAL_EXECUTION_ID".to_string(),
            storage_gib: 100,
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub nextflow_bin: PathBuf,
    pub source_dir: PathBuf,
    pub shared_dir: PathBuf,
    pub profile: String,
    pub config_file: String,
    pub nxf_home: String,
    pub nxf_opts: String,
    pub exclude: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            nextflow_bin: PathBuf::from("/root/nextflow"),
            source_dir: PathBuf::from("/root"),
            shared_dir: PathBuf::from("/nf-workdir"),
            profile: "docker".to_string(),
            config_file: "latch.config".to_string(),
            nxf_home: "/root/.nextflow".to_string(),
            nxf_opts: "-Xms2048M -Xmx8G -XX:ActiveProcessorCount=4".to_string(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogBackend {
    #[default]
    Local,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    pub backend: LogBackend,
    /// Local directory that `latch:///` paths are mapped onto.
    pub local_root: PathBuf,
    pub upload_url: Option<String>,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            backend: LogBackend::Local,
            local_root: PathBuf::from("/ldata"),
            upload_url: None,
        }
    }
}

impl LaunchConfig {
    /// Loads a config file, expanding `${VAR}` references first.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LaunchError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LaunchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the value of `VAR` (e.g. `${LATCH_LOG_DIR}`).
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LaunchError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Parameter values from the `[params]` table.
    pub fn parameter_set(&self) -> Result<ParameterSet> {
        let mut set = ParameterSet::new();
        for (name, value) in &self.params {
            set.set_json(name, value)?;
        }
        Ok(set)
    }

    pub fn log_dir_url(&self) -> Result<Url> {
        Url::parse(&self.platform.log_dir).map_err(|e| LaunchError::InvalidConfigValueError {
            field: "platform.log_dir".to_string(),
            value: self.platform.log_dir.clone(),
            reason: e.to_string(),
        })
    }
}

impl Validate for LaunchConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("platform.dispatcher_url", &self.platform.dispatcher_url)?;
        if let Some(api_url) = &self.platform.api_url {
            validation::validate_url("platform.api_url", api_url)?;
        }
        validation::validate_non_empty_string("platform.token_env", &self.platform.token_env)?;
        validation::validate_range("platform.storage_gib", self.platform.storage_gib, 1, 65536)?;
        self.log_dir_url()?;

        validation::validate_path("runtime.nextflow_bin", &self.runtime.nextflow_bin)?;
        validation::validate_path("runtime.source_dir", &self.runtime.source_dir)?;
        validation::validate_path("runtime.shared_dir", &self.runtime.shared_dir)?;
        validation::validate_non_empty_string("runtime.profile", &self.runtime.profile)?;

        if self.logs.backend == LogBackend::Http {
            let upload_url = validation::validate_required_field("logs.upload_url", &self.logs.upload_url)?;
            validation::validate_url("logs.upload_url", upload_url)?;
        }

        self.parameter_set()?;
        Ok(())
    }
}
