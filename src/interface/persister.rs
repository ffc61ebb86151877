use std::path::PathBuf;

use crate::{FetchTask, StdResult};

/// A trait for persisting downloaded manifests to a storage medium.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ManifestPersister: Sync + Send {
    /// Persists the manifest content and returns where it was written.
    async fn persist(&self, task: &FetchTask, content: &[u8]) -> StdResult<PathBuf>;
}
