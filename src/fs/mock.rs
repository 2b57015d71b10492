use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::models::FsEntry;

use super::FileSystem;

#[derive(Clone, Debug)]
enum Response {
    Ok(Vec<FsEntry>),
    Err(String),
}

/// A write the code under test performed (or attempted).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Write {
    Dir(PathBuf),
    File(PathBuf),
}

#[derive(Clone, Default)]
pub struct MockFileSystem {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    responses: HashMap<PathBuf, Response>,
    write_errors: HashMap<PathBuf, String>,
    calls: Vec<PathBuf>,
    writes: Vec<Write>,
}

impl MockFileSystem {
    pub fn set_dir_entries(&self, dir: impl Into<PathBuf>, entries: Vec<FsEntry>) {
        let mut inner = self.inner.lock().expect("mock fs lock");
        inner.responses.insert(dir.into(), Response::Ok(entries));
    }

    pub fn set_error(&self, dir: impl Into<PathBuf>, message: impl Into<String>) {
        let mut inner = self.inner.lock().expect("mock fs lock");
        inner
            .responses
            .insert(dir.into(), Response::Err(message.into()));
    }

    /// Make any write to `path` fail with `message`.
    pub fn set_write_error(&self, path: impl Into<PathBuf>, message: impl Into<String>) {
        let mut inner = self.inner.lock().expect("mock fs lock");
        inner.write_errors.insert(path.into(), message.into());
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        let inner = self.inner.lock().expect("mock fs lock");
        inner.calls.clone()
    }

    /// Successful writes, in the order they happened.
    pub fn writes(&self) -> Vec<Write> {
        let inner = self.inner.lock().expect("mock fs lock");
        inner.writes.clone()
    }

    fn record(&self, path: &Path, write: Write) -> Result<()> {
        let mut inner = self.inner.lock().expect("mock fs lock");
        if let Some(message) = inner.write_errors.get(path) {
            return Err(anyhow!("{message}"));
        }
        inner.writes.push(write);
        Ok(())
    }
}

#[async_trait]
impl FileSystem for MockFileSystem {
    async fn read_dir(&self, dir: &Path) -> Result<Vec<FsEntry>> {
        let mut inner = self.inner.lock().expect("mock fs lock");
        inner.calls.push(dir.to_path_buf());

        match inner.responses.get(dir) {
            Some(Response::Ok(entries)) => Ok(entries.clone()),
            Some(Response::Err(message)) => Err(anyhow!("{message}")),
            None => Err(anyhow!("no mock response for {}", dir.display())),
        }
    }

    async fn create_dir_all(&self, dir: &Path) -> Result<()> {
        self.record(dir, Write::Dir(dir.to_path_buf()))
    }

    async fn create_empty_file(&self, path: &Path) -> Result<()> {
        self.record(path, Write::File(path.to_path_buf()))
    }
}
