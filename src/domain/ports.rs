use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use url::Url;

/// Platform service that allocates the shared volume a run works in.
#[async_trait]
pub trait StorageProvisioner: Send + Sync {
    /// Returns the name of the provisioned volume claim.
    async fn provision(&self, storage_gib: u32) -> Result<String>;
}

/// Best-effort lookup of the human-readable execution name.
#[async_trait]
pub trait ExecutionNameSource: Send + Sync {
    async fn execution_name(&self) -> Option<String>;
}

/// Destination for the pipeline log once the run is over.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn upload(&self, local: &Path, remote: &Url) -> Result<()>;
}

#[async_trait]
impl<T: LogStore + ?Sized> LogStore for Box<T> {
    async fn upload(&self, local: &Path, remote: &Url) -> Result<()> {
        (**self).upload(local, remote).await
    }
}
