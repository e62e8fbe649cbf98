//! GPG encryption of the archive for a fixed recipient set.
//!
//! The recipients' public keys must already be present in the local GPG
//! keyring; key provisioning is outside this program. Output is binary
//! ciphertext (no ASCII armor) that every recipient can independently
//! decrypt.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{error, info};

use crate::contract::{Encryptor, StageError};

/// Suffix appended to the archive path for the ciphertext file.
const ENCRYPTED_SUFFIX: &str = ".gpg";

/// [`Encryptor`] backed by the system `gpg` binary.
pub struct GpgEncryptor;

/// Ciphertext path for a given archive path: the archive path with `.gpg`
/// appended.
pub fn encrypted_path(archive_path: &Path) -> PathBuf {
    let mut os = archive_path.as_os_str().to_owned();
    os.push(ENCRYPTED_SUFFIX);
    PathBuf::from(os)
}

#[async_trait]
impl Encryptor for GpgEncryptor {
    async fn encrypt(
        &self,
        archive_path: &Path,
        recipients: &[String],
    ) -> Result<PathBuf, StageError> {
        if recipients.is_empty() {
            return Err(StageError::Encrypt {
                path: archive_path.to_path_buf(),
                reason: "no recipients configured".to_string(),
            });
        }

        let output_path = encrypted_path(archive_path);

        let mut cmd = Command::new("gpg");
        cmd.arg("--batch").arg("--yes").arg("--encrypt");
        for recipient in recipients {
            cmd.arg("--recipient").arg(recipient);
        }
        cmd.arg("--output").arg(&output_path).arg(archive_path);

        let output = cmd.output().await.map_err(|e| StageError::Encrypt {
            path: archive_path.to_path_buf(),
            reason: format!("failed to launch gpg: {e}"),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                archive = %archive_path.display(),
                status = ?output.status,
                "gpg --encrypt failed"
            );
            return Err(StageError::Encrypt {
                path: archive_path.to_path_buf(),
                reason: format!("gpg exited with {}: {}", output.status, stderr.trim()),
            });
        }

        info!(
            ciphertext = %output_path.display(),
            recipients_count = recipients.len(),
            "archive encrypted"
        );
        Ok(output_path)
    }
}
