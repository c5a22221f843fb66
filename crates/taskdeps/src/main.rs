//! taskdeps CLI binary.

use anyhow::Result;
use taskdeps::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the taskdeps CLI.
///
/// Uses tokio's current_thread runtime; every command is a short sequence of
/// file reads, graph queries and at most one save.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=taskdeps=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskdeps=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting taskdeps CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("taskdeps CLI completed successfully");
    Ok(())
}
