use crate::domain::ports::{ExecutionNameSource, StorageProvisioner};
use crate::utils::error::{LaunchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const EXECUTION_NAME_OVERRIDE_ENV: &str = "LATCH_EXECUTION_NAME";

/// Execution token handed to every task by the workflow engine.
#[derive(Clone)]
pub struct ExecutionToken(String);

impl ExecutionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn from_env(variable: &str) -> Result<Self> {
        std::env::var(variable)
            .map(Self)
            .map_err(|_| LaunchError::MissingExecutionToken {
                variable: variable.to_string(),
            })
    }

    pub fn authorization(&self) -> String {
        format!("Latch-Execution-Token {}", self.0)
    }
}

impl std::fmt::Debug for ExecutionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ExecutionToken(***)")
    }
}

#[derive(Debug, Serialize)]
struct ProvisionRequest {
    storage_gib: u32,
}

#[derive(Debug, Deserialize)]
struct NameResponse {
    name: Option<String>,
}

/// Client for the dispatcher's `provision-storage` endpoint.
pub struct HttpProvisioner {
    client: Client,
    base_url: String,
    token: ExecutionToken,
}

impl HttpProvisioner {
    pub fn new(base_url: impl Into<String>, token: ExecutionToken) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/provision-storage", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl StorageProvisioner for HttpProvisioner {
    async fn provision(&self, storage_gib: u32) -> Result<String> {
        let endpoint = self.endpoint();
        tracing::info!("Provisioning shared storage volume ({} GiB)...", storage_gib);
        tracing::debug!("POST {}", endpoint);

        let response = self
            .client
            .post(&endpoint)
            .header(reqwest::header::AUTHORIZATION, self.token.authorization())
            .json(&ProvisionRequest { storage_gib })
            .send()
            .await?
            .error_for_status()?;

        let body: NameResponse = response.json().await?;
        let name = body
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| LaunchError::ProvisioningError {
                message: "response did not include a volume name".to_string(),
            })?;

        tracing::info!("Done. Provisioned volume {}", name);
        Ok(name)
    }
}

/// Resolves the execution name from `LATCH_EXECUTION_NAME`, falling back to
/// the platform API when one is configured.
pub struct PlatformExecutionNames {
    client: Client,
    api_url: Option<String>,
    token: Option<ExecutionToken>,
    override_env: String,
}

impl PlatformExecutionNames {
    pub fn new(api_url: Option<String>, token: Option<ExecutionToken>) -> Self {
        Self {
            client: Client::new(),
            api_url,
            token,
            override_env: EXECUTION_NAME_OVERRIDE_ENV.to_string(),
        }
    }

    /// Reads the override from `variable` instead of `LATCH_EXECUTION_NAME`.
    pub fn with_override_env(mut self, variable: impl Into<String>) -> Self {
        self.override_env = variable.into();
        self
    }

    async fn lookup(&self, api_url: &str, token: &ExecutionToken) -> Result<Option<String>> {
        let endpoint = format!("{}/execution-name", api_url.trim_end_matches('/'));
        let body: NameResponse = self
            .client
            .post(&endpoint)
            .header(reqwest::header::AUTHORIZATION, token.authorization())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.name.filter(|n| !n.is_empty()))
    }
}

#[async_trait]
impl ExecutionNameSource for PlatformExecutionNames {
    async fn execution_name(&self) -> Option<String> {
        if let Ok(name) = std::env::var(&self.override_env) {
            if !name.trim().is_empty() {
                return Some(name);
            }
        }

        let (api_url, token) = match (&self.api_url, &self.token) {
            (Some(api_url), Some(token)) => (api_url, token),
            _ => return None,
        };

        match self.lookup(api_url, token).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("Execution name lookup failed: {}", e);
                None
            }
        }
    }
}
