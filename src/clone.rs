//! Repository locator resolution and mirror cloning.
//!
//! A repository reference is a line like `github.com/acme/widget`: the first
//! path element is the host, the remainder is the repository path. It is
//! rewritten into an SSH fetch address (`git@github.com:acme/widget.git`) and
//! cloned with `git clone --mirror` so all refs and full history come along,
//! suitable for later re-hosting.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{error, info};

use crate::contract::{Cloner, StageError};

/// SSH user for the fetch address, as hosted git providers expect.
const SSH_USER: &str = "git";

/// Repository suffix appended before resolving.
const REPO_SUFFIX: &str = ".git";

/// A repository reference resolved into something fetchable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRepo {
    /// SSH fetch address, e.g. `git@github.com:acme/widget.git`.
    pub address: String,
    /// Final path segment with the repository suffix, e.g. `widget.git`.
    /// Names the clone destination, the archive, and the uploaded object.
    pub basename: String,
}

/// Rewrite `reference` (`<host>/<owner>/<name>`, possibly deeper) into an SSH
/// fetch address. The reference must contain at least three `/`-delimited
/// segments.
pub fn resolve(reference: &str) -> Result<ResolvedRepo, StageError> {
    let malformed = |reason: &str| StageError::Resolve {
        reference: reference.to_string(),
        reason: reason.to_string(),
    };

    let (host, path) = reference
        .split_once('/')
        .ok_or_else(|| malformed("expected <host>/<owner>/<name>"))?;
    if host.is_empty() {
        return Err(malformed("empty host segment"));
    }
    if path.split('/').count() < 2 || path.split('/').any(str::is_empty) {
        return Err(malformed("expected <host>/<owner>/<name>"));
    }

    let basename = path.rsplit('/').next().unwrap_or(path);

    Ok(ResolvedRepo {
        address: format!("{SSH_USER}@{host}:{path}{REPO_SUFFIX}"),
        basename: format!("{basename}{REPO_SUFFIX}"),
    })
}

/// [`Cloner`] backed by the system `git` binary. Authentication uses the
/// ambient SSH identity; this code never handles credentials.
pub struct GitCloner;

#[async_trait]
impl Cloner for GitCloner {
    async fn mirror_clone(&self, address: &str, destination: &Path) -> Result<(), StageError> {
        let output = Command::new("git")
            .arg("clone")
            .arg("--mirror")
            .arg(address)
            .arg(destination)
            .output()
            .await
            .map_err(|e| StageError::Clone {
                address: address.to_string(),
                reason: format!("failed to launch git: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                address,
                destination = %destination.display(),
                status = ?output.status,
                "git clone --mirror failed"
            );
            return Err(StageError::Clone {
                address: address.to_string(),
                reason: format!("git exited with {}: {}", output.status, stderr.trim()),
            });
        }

        info!(address, destination = %destination.display(), "mirror clone complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rewrites_reference_into_ssh_address() {
        let repo = resolve("github.com/acme/widget").unwrap();
        assert_eq!(repo.address, "git@github.com:acme/widget.git");
        assert_eq!(repo.basename, "widget.git");
    }

    #[test]
    fn resolve_keeps_deeper_paths_intact() {
        let repo = resolve("gitlab.com/group/subgroup/tool").unwrap();
        assert_eq!(repo.address, "git@gitlab.com:group/subgroup/tool.git");
        assert_eq!(repo.basename, "tool.git");
    }

    #[test]
    fn resolve_rejects_too_few_segments() {
        assert!(resolve("github.com/acme").is_err());
        assert!(resolve("github.com").is_err());
        assert!(resolve("").is_err());
    }

    #[test]
    fn resolve_rejects_empty_segments() {
        assert!(resolve("/acme/widget").is_err());
        assert!(resolve("github.com//widget").is_err());
        assert!(resolve("github.com/acme/").is_err());
    }

    #[test]
    fn resolve_error_is_classified_with_the_offending_reference() {
        let err = resolve("just-a-name").unwrap_err();
        assert_eq!(err.stage(), "resolve");
        assert!(err.to_string().contains("just-a-name"));
    }
}
