//! Stage contracts for the backup pipeline.
//!
//! Every side-effecting stage (clone, archive, encrypt, store) is behind an
//! async trait so the orchestrator can be exercised against deterministic
//! mocks. The traits are annotated for `mockall`; with the default
//! `test-export-mocks` feature the generated mocks are available to
//! integration tests as well.
//!
//! Errors are classified per stage in [`StageError`] rather than propagated as
//! uncaught faults: the orchestrator halts the run on the first classified
//! failure, and the CLI logs it with its stage identity before exiting
//! non-zero.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Classified failure of one pipeline stage, carrying the stage identity and
/// enough context to log a useful message.
#[derive(Debug)]
pub enum StageError {
    /// Malformed or missing run configuration (recipients, bucket name).
    Config(String),
    /// Storage client or bucket precondition failure at startup, or any
    /// non-upload storage fault.
    Storage(String),
    /// Workspace reset failed.
    Workspace(std::io::Error),
    /// Repository reference could not be rewritten into a clone address.
    Resolve { reference: String, reason: String },
    /// `git clone --mirror` failed.
    Clone { address: String, reason: String },
    /// Archiving the mirror failed.
    Archive { path: PathBuf, reason: String },
    /// GPG encryption failed.
    Encrypt { path: PathBuf, reason: String },
    /// Upload to object storage failed. Always fatal, never retried.
    Upload { key: String, reason: String },
}

impl StageError {
    /// Short stage identifier for structured log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Config(_) => "config",
            StageError::Storage(_) => "storage",
            StageError::Workspace(_) => "workspace",
            StageError::Resolve { .. } => "resolve",
            StageError::Clone { .. } => "clone",
            StageError::Archive { .. } => "archive",
            StageError::Encrypt { .. } => "encrypt",
            StageError::Upload { .. } => "upload",
        }
    }
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageError::Config(reason) => write!(f, "configuration error: {reason}"),
            StageError::Storage(reason) => write!(f, "storage error: {reason}"),
            StageError::Workspace(e) => write!(f, "workspace reset failed: {e}"),
            StageError::Resolve { reference, reason } => {
                write!(f, "cannot resolve repository reference '{reference}': {reason}")
            }
            StageError::Clone { address, reason } => {
                write!(f, "mirror clone of '{address}' failed: {reason}")
            }
            StageError::Archive { path, reason } => {
                write!(f, "archiving '{}' failed: {reason}", path.display())
            }
            StageError::Encrypt { path, reason } => {
                write!(f, "encrypting '{}' failed: {reason}", path.display())
            }
            StageError::Upload { key, reason } => {
                write!(f, "upload of object '{key}' failed: {reason}")
            }
        }
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StageError::Workspace(e) => Some(e),
            _ => None,
        }
    }
}

/// Produces a complete bare mirror clone of a remote repository.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Cloner: Send + Sync {
    /// Clone the repository at `address` (SSH fetch address) into
    /// `destination`, with full history and all refs, without a working
    /// checkout.
    async fn mirror_clone(&self, address: &str, destination: &Path) -> Result<(), StageError>;
}

/// Packages a directory into a single uncompressed archive file.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Archive `source_dir` in full into `archive_path`, structure and
    /// contents preserved verbatim, no compression.
    async fn archive(&self, source_dir: &Path, archive_path: &Path) -> Result<(), StageError>;
}

/// Produces binary public-key ciphertext of an archive for a recipient set.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Encryptor: Send + Sync {
    /// Encrypt the file at `archive_path` so that every identity in
    /// `recipients` can independently decrypt it. Returns the path of the
    /// ciphertext file.
    async fn encrypt(
        &self,
        archive_path: &Path,
        recipients: &[String],
    ) -> Result<PathBuf, StageError>;
}

/// Object storage for encrypted artifacts.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether the configured bucket exists. Checked once at startup; a
    /// missing bucket means zero repositories are processed.
    async fn bucket_exists(&self) -> Result<bool, StageError>;

    /// Transfer the local file's bytes to `key` in the configured bucket,
    /// creating or overwriting the object.
    async fn put_object(&self, local_path: &Path, key: &str) -> Result<(), StageError>;
}
