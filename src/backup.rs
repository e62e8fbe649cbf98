//! The backup pipeline: per-repository stage sequence and fail-fast policy.
//!
//! For each repository reference, in order:
//! reset workspace → resolve → mirror clone → archive → encrypt → upload →
//! reset workspace. The workspace reset on both sides guarantees no artifact
//! of one repository leaks into the next. The first classified stage failure
//! aborts the whole run; there are no retries and no skip-and-continue.
//!
//! Startup preconditions are checked before any repository is touched: the
//! target bucket must exist, otherwise zero repositories are processed.

use std::io::Read;

use tracing::{error, info};

use crate::clone;
use crate::config::BackupConfig;
use crate::contract::{Archiver, Cloner, Encryptor, ObjectStore, StageError};
use crate::workspace;

/// Per-run summary of what was uploaded, in processing order.
#[derive(Debug)]
pub struct BackupReport {
    pub objects: Vec<UploadedObject>,
}

#[derive(Debug)]
pub struct UploadedObject {
    /// The repository reference as read from the input list.
    pub reference: String,
    /// Object key the encrypted artifact was uploaded under.
    pub key: String,
}

/// Remote object key for a repository's artifact on a given run date:
/// `<YYYY-MM-DD>/<basename>.tar.gpg`. Two runs on the same date produce the
/// same key and the later upload overwrites the earlier.
pub fn object_key(run_date: &str, basename: &str) -> String {
    format!("{run_date}/{basename}.tar.gpg")
}

/// Non-empty lines of the repository list, consumed fully before processing
/// begins.
pub fn read_references(input: &mut impl Read) -> Result<Vec<String>, StageError> {
    let mut buf = String::new();
    input
        .read_to_string(&mut buf)
        .map_err(|e| StageError::Config(format!("failed to read repository list: {e}")))?;
    Ok(buf
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Run the full backup pipeline over the repository list in `input`.
///
/// The bucket precondition is verified before the list is read: a missing
/// bucket means zero references are consumed and zero uploads occur.
pub async fn backup<C, A, E, S>(
    config: &BackupConfig,
    run_date: &str,
    input: &mut impl Read,
    cloner: &C,
    archiver: &A,
    encryptor: &E,
    store: &S,
) -> Result<BackupReport, StageError>
where
    C: Cloner,
    A: Archiver,
    E: Encryptor,
    S: ObjectStore,
{
    info!(run_date, bucket = %config.bucket, "starting backup run");

    if !store.bucket_exists().await? {
        error!(bucket = %config.bucket, "target bucket does not exist");
        return Err(StageError::Storage(format!(
            "bucket '{}' does not exist",
            config.bucket
        )));
    }

    let references = read_references(input)?;
    info!(repositories = references.len(), "repository list read");

    let mut objects = Vec::new();

    for reference in &references {
        info!(repo = %reference, "processing repository");

        workspace::reset(&config.workdir).map_err(StageError::Workspace)?;

        let repo = clone::resolve(reference)?;
        let clone_dest = config.workdir.join(&repo.basename);
        cloner.mirror_clone(&repo.address, &clone_dest).await?;

        let archive_path = config.workdir.join(format!("{}.tar", repo.basename));
        archiver.archive(&clone_dest, &archive_path).await?;

        let encrypted = encryptor.encrypt(&archive_path, &config.recipients).await?;

        let key = object_key(run_date, &repo.basename);
        store.put_object(&encrypted, &key).await?;

        workspace::reset(&config.workdir).map_err(StageError::Workspace)?;

        info!(repo = %reference, key = %key, "repository backed up");
        objects.push(UploadedObject {
            reference: reference.clone(),
            key,
        });
    }

    info!(uploaded = objects.len(), "backup run complete");
    Ok(BackupReport { objects })
}
