use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("failed to get execution token: {variable} is not set")]
    MissingExecutionToken { variable: String },

    #[error("Provisioning failed: {message}")]
    ProvisioningError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("Failed to copy work directory {path}: {source}")]
    WorkdirCopyError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {program}: {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Pipeline exited with {}", exit_description(.code))]
    PipelineFailed { code: Option<i32> },

    #[error("Log upload to {remote} failed: {message}")]
    LogUploadError { remote: String, message: String },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Configuration,
    Platform,
    Pipeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LaunchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LaunchError::HttpError(_) | LaunchError::LogUploadError { .. } => ErrorCategory::Network,
            LaunchError::IoError(_)
            | LaunchError::WorkdirCopyError { .. }
            | LaunchError::SerializationError(_) => ErrorCategory::Io,
            LaunchError::ConfigValidationError { .. }
            | LaunchError::MissingConfigError { .. }
            | LaunchError::InvalidConfigValueError { .. }
            | LaunchError::UnknownParameter { .. } => ErrorCategory::Configuration,
            LaunchError::MissingExecutionToken { .. } | LaunchError::ProvisioningError { .. } => {
                ErrorCategory::Platform
            }
            LaunchError::SpawnError { .. } | LaunchError::PipelineFailed { .. } => {
                ErrorCategory::Pipeline
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LaunchError::LogUploadError { .. } => ErrorSeverity::Low,
            LaunchError::HttpError(_) | LaunchError::ProvisioningError { .. } => {
                ErrorSeverity::Medium
            }
            LaunchError::MissingExecutionToken { .. } | LaunchError::SpawnError { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LaunchError::MissingExecutionToken { .. } => {
                "Run inside a platform task, or export FLYTE_INTERNAL_EXECUTION_ID for local testing"
            }
            LaunchError::ProvisioningError { .. } | LaunchError::HttpError(_) => {
                "Check that the dispatcher service is reachable and retry the execution"
            }
            LaunchError::ConfigValidationError { .. }
            | LaunchError::MissingConfigError { .. }
            | LaunchError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or --param values and run again"
            }
            LaunchError::UnknownParameter { .. } => {
                "Run `pangenome-launch schema` to list the accepted parameters"
            }
            LaunchError::WorkdirCopyError { .. } | LaunchError::IoError(_) => {
                "Check permissions and free space on the shared volume"
            }
            LaunchError::SerializationError(_) => "Check the JSON input for syntax errors",
            LaunchError::SpawnError { .. } => {
                "Check runtime.nextflow_bin points at an executable Nextflow launcher"
            }
            LaunchError::PipelineFailed { .. } => {
                "Inspect the uploaded nextflow.log for the failing process"
            }
            LaunchError::LogUploadError { .. } => {
                "The pipeline finished; copy .nextflow.log from the shared volume by hand"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Platform => format!("Platform request failed: {}", self),
            ErrorCategory::Pipeline => format!("Pangenome pipeline failed: {}", self),
            ErrorCategory::Network => format!("Network error: {}", self),
            ErrorCategory::Io => format!("File system error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, LaunchError>;
