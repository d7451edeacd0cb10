use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use azure_storage_blobs::prelude::ContainerClient;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::storage;

/// Counters for one mirror run. Mutated in place so a mid-run abort
/// still reports partial counts in the summary.
#[derive(Debug, Default)]
pub struct MirrorOutcome {
    pub total: u64,
    pub skipped: u64,
    pub downloaded: u64,
}

impl MirrorOutcome {
    pub fn reconciled(&self) -> bool {
        self.downloaded + self.skipped == self.total
    }
}

/// What to do with a single blob.
#[derive(Debug, PartialEq, Eq)]
pub enum BlobAction {
    Download(PathBuf),
    SkipExisting(PathBuf),
    RejectUnsafe,
}

/// A segment is safe only if the platform path parser sees it as one
/// plain name. Backslashes are rejected outright so Windows-style
/// traversal in a blob name stays unsafe on every platform.
fn is_safe_segment(segment: &str) -> bool {
    if segment.contains('\\') {
        return false;
    }

    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Derive the local destination for a blob name under the base path.
///
/// Blob names use `/` as separator and may encode nested directories.
/// Empty and `.` segments are dropped; `..` segments and anything the
/// local platform would not treat as a plain file name yield `None`.
pub fn local_blob_path(base: &Path, blob_name: &str) -> Option<PathBuf> {
    let mut dest = base.to_path_buf();
    let mut pushed = 0usize;

    for segment in blob_name.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            _ if !is_safe_segment(segment) => return None,
            _ => {
                dest.push(segment);
                pushed += 1;
            }
        }
    }

    if pushed == 0 {
        return None;
    }

    Some(dest)
}

/// Decide what to do with a blob: skip names that would escape the base
/// directory, skip destinations that already exist as regular files,
/// download everything else.
pub fn plan_blob(base: &Path, blob_name: &str) -> BlobAction {
    match local_blob_path(base, blob_name) {
        None => BlobAction::RejectUnsafe,
        Some(dest) if dest.is_file() => BlobAction::SkipExisting(dest),
        Some(dest) => BlobAction::Download(dest),
    }
}

/// The per-blob lines are part of the stdout contract, so the bar must
/// draw to stdout as well for `println` to carry them there.
fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stdout());
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb
}

fn skip_line(name: &str) -> String {
    format!("Skipped {name}")
}

fn download_line(name: &str) -> String {
    format!("Downloaded {name}")
}

/// Mirror every blob in the container under `base_path`, sequentially.
///
/// Any listing or download error aborts the whole run; there is no
/// per-blob isolation. Counters accumulated so far survive the abort.
pub async fn run(
    container: &ContainerClient,
    base_path: &Path,
    outcome: &mut MirrorOutcome,
) -> Result<()> {
    let names = storage::list_blob_names(container).await?;
    outcome.total = names.len() as u64;
    tracing::info!("{} blobs in container", names.len());

    let pb = progress_bar(outcome.total);

    for name in names {
        pb.set_message(name.clone());

        match plan_blob(base_path, &name) {
            BlobAction::RejectUnsafe => {
                tracing::warn!("refusing blob name that escapes the base directory: {name}");
                pb.println(skip_line(&name));
                outcome.skipped += 1;
            }
            BlobAction::SkipExisting(_) => {
                pb.println(skip_line(&name));
                outcome.skipped += 1;
            }
            BlobAction::Download(dest) => {
                storage::download_to_file(&container.blob_client(&name), &dest)
                    .await
                    .with_context(|| format!("failed to download {name}"))?;

                pb.println(download_line(&name));
                outcome.downloaded += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(())
}
