use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use azure_storage::ConnectionString;
use azure_storage_blobs::prelude::{BlobClient, BlobServiceClient, ContainerClient};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

/// Build a blob service client from a normalized connection string.
pub fn service_client(connection_string: &str) -> Result<BlobServiceClient> {
    let parsed = ConnectionString::new(connection_string)
        .context("failed to parse connection string")?;
    let account = parsed
        .account_name
        .ok_or_else(|| anyhow!("connection string has no AccountName"))?;
    let credentials = parsed
        .storage_credentials()
        .context("failed to derive storage credentials from connection string")?;

    Ok(BlobServiceClient::new(account, credentials))
}

/// List the names of all containers in the storage account.
pub async fn list_containers(service: &BlobServiceClient) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut pages = service.list_containers().into_stream();

    while let Some(page) = pages.next().await {
        let page = page.context("failed to list containers")?;
        names.extend(page.containers.into_iter().map(|c| c.name));
    }

    Ok(names)
}

/// List the names of all blobs in a container, in listing order.
pub async fn list_blob_names(container: &ContainerClient) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut pages = container.list_blobs().into_stream();

    while let Some(page) = pages.next().await {
        let page = page.context("failed to list blobs")?;
        names.extend(page.blobs.blobs().map(|b| b.name.clone()));
    }

    Ok(names)
}

/// Hidden temp file next to the destination, renamed over it on completion.
fn tmp_path(dest: &Path) -> Result<PathBuf> {
    let parent = dest
        .parent()
        .ok_or_else(|| anyhow!("destination has no parent directory"))?;
    let name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("destination has no file name"))?;

    Ok(parent.join(format!(".{name}.tmp")))
}

/// Destination file written through a hidden temp sibling.
///
/// Missing ancestor directories are created on open; the content only
/// appears at the final path once `finish` renames the temp file into
/// place, so an aborted download never leaves a truncated destination.
pub struct MirrorFile {
    file: tokio::fs::File,
    tmp: PathBuf,
    dest: PathBuf,
}

impl MirrorFile {
    pub async fn create(dest: &Path) -> Result<Self> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let tmp = tmp_path(dest)?;
        let file = tokio::fs::File::create(&tmp)
            .await
            .with_context(|| format!("failed to create {}", tmp.display()))?;

        Ok(Self {
            file,
            tmp,
            dest: dest.to_path_buf(),
        })
    }

    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await?;
        Ok(())
    }

    pub async fn finish(mut self) -> Result<()> {
        self.file.flush().await?;
        drop(self.file);

        tokio::fs::rename(&self.tmp, &self.dest)
            .await
            .with_context(|| format!("failed to move download into {}", self.dest.display()))?;

        Ok(())
    }
}

/// Stream a blob's content to `dest`.
pub async fn download_to_file(blob: &BlobClient, dest: &Path) -> Result<()> {
    let mut file = MirrorFile::create(dest).await?;

    let mut pages = blob.get().into_stream();
    while let Some(page) = pages.next().await {
        let page = page.context("error reading blob")?;
        let mut body = page.data;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.context("error reading blob body")?;
            file.write(&chunk).await?;
        }
    }

    file.finish().await
}
