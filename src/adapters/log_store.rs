use crate::adapters::platform::ExecutionToken;
use crate::domain::ports::LogStore;
use crate::utils::error::{LaunchError, Result};
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

/// Remote location of a run's log: `<log_dir>/<execution name>/nextflow.log`.
/// The URL form percent-encodes the name; stores decode it back.
pub fn remote_log_path(log_dir: &Url, execution_name: &str) -> Result<Url> {
    let mut remote = log_dir.clone();
    {
        let mut segments = remote
            .path_segments_mut()
            .map_err(|_| LaunchError::InvalidConfigValueError {
                field: "platform.log_dir".to_string(),
                value: log_dir.to_string(),
                reason: "URL cannot hold a path".to_string(),
            })?;
        segments.pop_if_empty();
        for part in execution_name.split('/').filter(|p| !p.is_empty()) {
            segments.push(part);
        }
        segments.push("nextflow.log");
    }
    Ok(remote)
}

/// Path component of a remote URL without the leading slash.
fn relative_key(remote: &Url) -> String {
    remote.path().trim_start_matches('/').to_string()
}

/// Maps `latch:///a/b` onto `<root>/a/b`, for object storage mounted on disk.
#[derive(Debug, Clone)]
pub struct LocalLogStore {
    root: PathBuf,
}

impl LocalLogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Local file for `remote`, with each path segment decoded back to the
    /// name it was built from.
    pub fn local_path(&self, remote: &Url) -> PathBuf {
        let mut path = self.root.clone();
        for segment in remote.path_segments().into_iter().flatten() {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            for part in decoded.split('/') {
                if !part.is_empty() && part != "." && part != ".." {
                    path.push(part);
                }
            }
        }
        path
    }
}

#[async_trait]
impl LogStore for LocalLogStore {
    async fn upload(&self, local: &Path, remote: &Url) -> Result<()> {
        let dest = self.local_path(remote);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local, &dest).await?;
        tracing::debug!("Copied {} to {}", local.display(), dest.display());
        Ok(())
    }
}

/// Uploads with `PUT <upload_url>/<remote path>`.
pub struct HttpLogStore {
    client: Client,
    upload_url: String,
    token: Option<ExecutionToken>,
}

impl HttpLogStore {
    pub fn new(upload_url: impl Into<String>, token: Option<ExecutionToken>) -> Self {
        Self {
            client: Client::new(),
            upload_url: upload_url.into(),
            token,
        }
    }
}

#[async_trait]
impl LogStore for HttpLogStore {
    async fn upload(&self, local: &Path, remote: &Url) -> Result<()> {
        let endpoint = format!(
            "{}/{}",
            self.upload_url.trim_end_matches('/'),
            relative_key(remote)
        );
        let body = tokio::fs::read(local).await?;

        let mut request = self
            .client
            .put(&endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body);
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, token.authorization());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(LaunchError::LogUploadError {
                remote: remote.to_string(),
                message: format!("server answered {}", response.status()),
            });
        }
        Ok(())
    }
}
