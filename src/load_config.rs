//! Environment adapter: builds the run-wide [`BackupConfig`] from process
//! environment variables.
//!
//! This is the only place untrusted configuration is parsed into typed
//! structs. All errors carry `anyhow` context so the CLI can surface clear
//! diagnostics. Required variables:
//!
//! - `GPG_RECIPIENTS` — JSON array of GPG recipient identities
//! - `GIT_KEEPER_BUCKET` — target S3 bucket name
//!
//! AWS credentials and the SSH identity for private repositories are ambient
//! and never read here.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::BackupConfig;

/// Default staging directory, relative to the working directory of the run.
pub const DEFAULT_WORKDIR: &str = "workdir";

/// Build a [`BackupConfig`] from the environment, with an optional workdir
/// override from the CLI.
pub fn load_config(workdir: Option<PathBuf>) -> Result<BackupConfig> {
    let bucket = env::var("GIT_KEEPER_BUCKET")
        .context("GIT_KEEPER_BUCKET must be set to the target S3 bucket name")?;

    let recipients_json = env::var("GPG_RECIPIENTS")
        .context("GPG_RECIPIENTS must be set to a JSON array of GPG recipient identities")?;
    let recipients: Vec<String> = serde_json::from_str(&recipients_json)
        .context("GPG_RECIPIENTS is not a valid JSON array of strings")?;
    if recipients.is_empty() {
        anyhow::bail!("GPG_RECIPIENTS must list at least one recipient");
    }

    let workdir = workdir.unwrap_or_else(|| PathBuf::from(DEFAULT_WORKDIR));

    info!(bucket = %bucket, "configuration loaded from environment");

    Ok(BackupConfig {
        workdir,
        bucket,
        recipients,
    })
}
