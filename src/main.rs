mod cli;
mod config;
mod mirror;
mod storage;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use azure_storage_blobs::prelude::BlobServiceClient;
use clap::Parser;

use crate::cli::Args;
use crate::config::{Prompter, StdinPrompter};
use crate::mirror::MirrorOutcome;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let started = std::time::Instant::now();
    let mut prompter = StdinPrompter;

    // Pre-flight: only credential input and parsing fail the process
    // before mirroring; from listing onward every error falls through
    // to the summary.
    let connection_string =
        config::resolve_connection_string(args.connection_string, &mut prompter)?;
    let service = storage::service_client(&connection_string)?;

    let mut outcome = MirrorOutcome::default();
    if let Err(e) = select_and_mirror(
        &service,
        args.container,
        args.output,
        &mut prompter,
        &mut outcome,
    )
    .await
    {
        tracing::error!("mirror run aborted: {e:#}");
    }

    print!("{}", render_summary(&outcome, started.elapsed()));

    Ok(())
}

/// List containers, resolve the remaining configuration and run the
/// mirror. Everything in here is a remote-access or filesystem error
/// when it fails, so the caller reports it and still prints the summary.
async fn select_and_mirror(
    service: &BlobServiceClient,
    container_flag: Option<String>,
    output_flag: Option<PathBuf>,
    prompter: &mut dyn Prompter,
    outcome: &mut MirrorOutcome,
) -> Result<()> {
    let containers = storage::list_containers(service).await?;
    println!("Available containers:");
    println!();
    for name in &containers {
        println!("{name}");
    }
    println!();

    let container = config::resolve_container(container_flag, prompter)?;
    let base_path = config::resolve_base_path(output_flag, prompter)?;

    tracing::info!(
        "mirroring container '{container}' under {}",
        base_path.display()
    );

    mirror::run(&service.container_client(&container), &base_path, outcome).await
}

fn render_summary(outcome: &MirrorOutcome, elapsed: Duration) -> String {
    let reconciliation = if outcome.reconciled() {
        "All blobs were processed"
    } else {
        "Not all blobs seem to have been processed, try run tool again"
    };

    format!(
        "\n=== Summary ===\n  \
         Total:      {}\n  \
         Downloaded: {}\n  \
         Skipped:    {}\n\n\
         {reconciliation}\n\
         Tool took {:.1}s to finish\n",
        outcome.total,
        outcome.downloaded,
        outcome.skipped,
        elapsed.as_secs_f64()
    )
}
