use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use purge_tunnel_core::prelude::{WorkloadDriver, WorkloadShape};
use tokio::process::Command;

/// Writes and deletes the workload inside a mounted CephFS directory.
#[derive(Debug, Clone)]
pub struct MountWorkload {
    mount: PathBuf,
}

impl MountWorkload {
    pub fn new(mount: impl Into<PathBuf>) -> Self {
        Self {
            mount: mount.into(),
        }
    }

    pub fn mount(&self) -> &Path {
        &self.mount
    }
}

impl WorkloadDriver for MountWorkload {
    async fn create_workload(&self, shape: &WorkloadShape) -> anyhow::Result<()> {
        let dir = self.mount.join(&shape.dir_name);
        tokio::fs::create_dir(&dir)
            .await
            .with_context(|| format!("Failed to create workload directory {}", dir.display()))?;

        let mut written = 0;
        for (name, size) in shape.files() {
            let path = dir.join(name);
            let len = usize::try_from(size)
                .with_context(|| format!("File size {size} does not fit in memory"))?;
            tokio::fs::write(&path, vec![b'x'; len])
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written += 1;
        }

        log::info!("Created {written} files under {}", dir.display());
        Ok(())
    }

    async fn remove_workload(&self, shape: &WorkloadShape) -> anyhow::Result<()> {
        let status = Command::new("rm")
            .arg("-rf")
            .arg(&shape.dir_name)
            .current_dir(&self.mount)
            .status()
            .await
            .context("Failed to run 'rm'")?;

        if !status.success() {
            bail!(
                "'rm -rf {}' in {} failed with {status}",
                shape.dir_name,
                self.mount.display()
            );
        }

        log::debug!("Removed {} from {}", shape.dir_name, self.mount.display());
        Ok(())
    }
}
