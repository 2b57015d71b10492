mod real;

#[cfg(test)]
mod mock;

pub use real::RealFileSystem;

#[cfg(test)]
pub use mock::{MockFileSystem, Write};

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use crate::models::FsEntry;

#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn read_dir(&self, dir: &Path) -> Result<Vec<FsEntry>>;

    /// Create `dir` and any missing parents. Succeeds if it already exists.
    async fn create_dir_all(&self, dir: &Path) -> Result<()>;

    /// Create a zero-length file at `path`, truncating any existing file.
    async fn create_empty_file(&self, path: &Path) -> Result<()>;
}
