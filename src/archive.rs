//! Archiving the mirror clone into a single uncompressed tar file.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{error, info};

use crate::contract::{Archiver, StageError};

/// [`Archiver`] backed by the system `tar` binary: `tar -cf <archive> <dir>`,
/// no compression, no filtering.
pub struct TarArchiver;

#[async_trait]
impl Archiver for TarArchiver {
    async fn archive(&self, source_dir: &Path, archive_path: &Path) -> Result<(), StageError> {
        let output = Command::new("tar")
            .arg("-cf")
            .arg(archive_path)
            .arg(source_dir)
            .output()
            .await
            .map_err(|e| StageError::Archive {
                path: source_dir.to_path_buf(),
                reason: format!("failed to launch tar: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                source = %source_dir.display(),
                archive = %archive_path.display(),
                status = ?output.status,
                "tar failed"
            );
            return Err(StageError::Archive {
                path: source_dir.to_path_buf(),
                reason: format!("tar exited with {}: {}", output.status, stderr.trim()),
            });
        }

        info!(archive = %archive_path.display(), "archive created");
        Ok(())
    }
}
