use std::path::PathBuf;

use clap::Parser;

/// Azure blob container mirror
///
/// Values not given as flags are prompted for on stdin.
#[derive(Parser)]
#[command(version, about)]
pub struct Args {
    /// Azure storage connection string
    #[arg(short = 's', long, env = "AZURE_STORAGE_CONNECTION_STRING")]
    pub connection_string: Option<String>,

    /// Blob container to mirror
    #[arg(short, long)]
    pub container: Option<String>,

    /// Local directory the container is mirrored under
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
