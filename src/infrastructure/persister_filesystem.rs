use std::path::{Component, Path, PathBuf};

use anyhow::{Context, anyhow};
use log::debug;
use tokio::fs;

use crate::{FetchTask, ManifestPersister, StdResult};

/// Writes manifests under `<base_dir>/<repository full name>/<relative path>`.
pub struct FilesystemPersister {
    base_dir: PathBuf,
}

impl FilesystemPersister {
    /// Creates a new `FilesystemPersister`, creating the base directory if needed.
    pub async fn try_new(base_dir: &Path) -> StdResult<Self> {
        fs::create_dir_all(base_dir)
            .await
            .with_context(|| format!("Failed to create directory {}", base_dir.display()))?;

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Computes where the manifest of a task is written.
    pub fn destination(&self, task: &FetchTask) -> StdResult<PathBuf> {
        let full_name = Path::new(task.repository().full_name().as_str());
        let relative_path = Path::new(task.relative_path());
        for path in [full_name, relative_path] {
            let is_relative_and_contained = path.components().next().is_some()
                && path
                    .components()
                    .all(|component| matches!(component, Component::Normal(_)));
            if !is_relative_and_contained {
                return Err(anyhow!(
                    "Refusing to write outside of {}: {task}",
                    self.base_dir.display()
                ));
            }
        }

        Ok(self.base_dir.join(full_name).join(relative_path))
    }
}

#[async_trait::async_trait]
impl ManifestPersister for FilesystemPersister {
    async fn persist(&self, task: &FetchTask, content: &[u8]) -> StdResult<PathBuf> {
        let destination = self.destination(task)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&destination, content)
            .await
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        debug!("Wrote {} bytes to {}", content.len(), destination.display());

        Ok(destination)
    }
}
