use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::task;

use crate::models::{EntryKind, FsEntry};

use super::FileSystem;

pub struct RealFileSystem;

#[async_trait]
impl FileSystem for RealFileSystem {
    async fn read_dir(&self, dir: &Path) -> Result<Vec<FsEntry>> {
        let dir = dir.to_path_buf();
        task::spawn_blocking(move || {
            let mut entries = Vec::new();
            let listing = std::fs::read_dir(&dir)
                .with_context(|| format!("cannot read directory {}", dir.display()))?;
            for entry in listing {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                        continue;
                    }
                };
                let kind = match entry.file_type() {
                    Ok(file_type) if file_type.is_symlink() => EntryKind::Symlink,
                    Ok(file_type) if file_type.is_dir() => EntryKind::Directory,
                    Ok(file_type) if file_type.is_file() => EntryKind::File,
                    Ok(_) => EntryKind::Other,
                    Err(err) => {
                        tracing::warn!(path = %entry.path().display(), error = %err, "cannot stat entry");
                        continue;
                    }
                };

                entries.push(FsEntry {
                    path: entry.path(),
                    name: entry.file_name().to_string_lossy().into_owned(),
                    kind,
                });
            }
            Ok(entries)
        })
        .await?
    }

    async fn create_dir_all(&self, dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("cannot create directory {}", dir.display()))
    }

    async fn create_empty_file(&self, path: &Path) -> Result<()> {
        tokio::fs::File::create(path)
            .await
            .with_context(|| format!("cannot create file {}", path.display()))?;
        Ok(())
    }
}
