use crate::error::Result;
use crate::models::FileSnapshot;
use crate::repository::{normalize_path, GitRepository};
use crate::status;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves working-tree and HEAD content for files under one root.
///
/// Each call opens its own [`GitRepository`].
#[derive(Debug, Clone)]
pub struct ContentResolver {
    root: PathBuf,
}

impl ContentResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn open(&self) -> Result<GitRepository> {
        GitRepository::open(&self.root)
    }

    pub fn get_current(&self, path: &str) -> Result<Vec<u8>> {
        self.open()?.read_working_file(path)
    }

    pub fn get_historical(&self, path: &str) -> Result<Vec<u8>> {
        self.open()?.head_blob(path)
    }

    /// Current content plus the reference to compare it against. HEAD is
    /// only consulted when the file is not unmodified.
    pub fn get_snapshot(&self, path: &str) -> Result<FileSnapshot> {
        let path = normalize_path(path)?;
        let repo = self.open()?;

        let current = repo.read_working_file(&path)?;
        let state = status::classify(&repo, &path)?;

        let reference = if state.is_unmodified() {
            current.clone()
        } else {
            debug!("{} is {}, loading HEAD content", path, state.as_str());
            repo.head_blob(&path)?
        };

        Ok(FileSnapshot {
            path,
            state,
            current,
            reference,
        })
    }
}
