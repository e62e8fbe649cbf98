//! CLI glue for git-keeper: argument parsing and the async entrypoint used
//! by both `main` and integration tests.
//!
//! All pipeline logic lives in [`crate::backup`]; this module only wires
//! configuration, stdin, and the concrete stage implementations together.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::archive::TarArchiver;
use crate::backup::backup;
use crate::clone::GitCloner;
use crate::encrypt::GpgEncryptor;
use crate::load_config::load_config;
use crate::upload::S3Store;

/// CLI for git-keeper: encrypted git repository backups to S3.
#[derive(Parser)]
#[clap(
    name = "git-keeper",
    version,
    about = "Mirror git repositories, encrypt them for a GPG recipient set, and upload to S3"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Back up every repository listed on stdin (one reference per line)
    Backup {
        /// Staging directory (default: ./workdir)
        #[clap(long)]
        workdir: Option<PathBuf>,
    },
}

/// Async CLI entrypoint, extracted for integration tests and `main()`.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Backup { workdir } => {
            let config = load_config(workdir)?;
            config.trace_loaded();

            let store = S3Store::new_from_env(config.bucket.clone()).await;
            let run_date = chrono::Local::now().format("%Y-%m-%d").to_string();
            let mut stdin = std::io::stdin().lock();

            match backup(
                &config,
                &run_date,
                &mut stdin,
                &GitCloner,
                &TarArchiver,
                &GpgEncryptor,
                &store,
            )
            .await
            {
                Ok(report) => {
                    info!(uploaded = report.objects.len(), "backup run succeeded");
                    Ok(())
                }
                Err(e) => {
                    error!(stage = e.stage(), error = %e, "backup run failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
