use clap::Parser;
use git_keeper::cli::{run, Cli};

#[tokio::main]
async fn main() {
    // Load environment
    dotenv::dotenv().ok();

    // Initialize tracing for the CLI.
    tracing_subscriber::fmt::init();
    tracing::info!("git-keeper startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => tracing::info!("git-keeper completed successfully"),
        Err(e) => {
            tracing::error!(error = %e, "git-keeper exited with error");
            std::process::exit(1);
        }
    }
}
