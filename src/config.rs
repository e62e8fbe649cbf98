use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Run-wide backup configuration, constructed once at startup and immutable
/// for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Local staging directory, destroyed and recreated around every repository.
    pub workdir: PathBuf,
    /// Target S3 bucket. Must already exist.
    pub bucket: String,
    /// GPG recipient identities; every one of them can decrypt the uploaded artifacts.
    pub recipients: Vec<String>,
}

impl BackupConfig {
    pub fn trace_loaded(&self) {
        info!(
            workdir = %self.workdir.display(),
            bucket = %self.bucket,
            recipients_count = self.recipients.len(),
            "Loaded BackupConfig"
        );
        debug!(?self, "BackupConfig loaded (full debug)");
    }
}
