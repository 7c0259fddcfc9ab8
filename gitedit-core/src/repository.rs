//! Narrow query interface over a git working tree.
//!
//! Every operation in this crate opens a fresh [`GitRepository`]; handles are
//! never cached or shared between requests.

use crate::error::{Error, Result};
use crate::walker;
use git2::{ErrorCode, ObjectType, Repository, Status};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepository {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let repo = Repository::open(root).map_err(|source| Error::RepositoryOpen {
            path: root.to_path_buf(),
            source,
        })?;

        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::RepositoryOpen {
                path: root.to_path_buf(),
                source: git2::Error::from_str("repository has no working tree"),
            })?;

        debug!("Opened repository at {:?}", workdir);
        Ok(Self { repo, workdir })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub(crate) fn git(&self) -> &Repository {
        &self.repo
    }

    /// Every working-tree file below the root, excluding the `.git` directory.
    /// Ignore rules are not applied here.
    pub fn list_tree(&self) -> Result<Vec<String>> {
        walker::walk_worktree(&self.workdir)
    }

    /// Live status flags for exactly `path`. Paths git knows nothing about are clean.
    pub fn status(&self, path: &str) -> Result<Status> {
        let path = normalize_path(path)?;
        match self.repo.status_file(Path::new(&path)) {
            Ok(status) => Ok(status),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(Status::CURRENT),
            Err(e) => Err(e.into()),
        }
    }

    pub fn read_working_file(&self, path: &str) -> Result<Vec<u8>> {
        let path = normalize_path(path)?;
        let full_path = self.workdir.join(&path);

        if !full_path.is_file() {
            return Err(Error::FileNotFound(path));
        }

        std::fs::read(&full_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(path),
            _ => Error::Io(e),
        })
    }

    /// Content of `path` in the tree of the commit HEAD points at.
    pub fn head_blob(&self, path: &str) -> Result<Vec<u8>> {
        let path = normalize_path(path)?;
        let missing = || Error::PathNotInHistory(path.clone());

        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Err(missing());
            }
            Err(e) => return Err(e.into()),
        };

        let commit = head.peel_to_commit()?;
        let tree = commit.tree()?;

        let entry = match tree.get_path(Path::new(&path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Err(missing()),
            Err(e) => return Err(e.into()),
        };

        if entry.kind() != Some(ObjectType::Blob) {
            return Err(missing());
        }

        let blob = self.repo.find_blob(entry.id())?;
        Ok(blob.content().to_vec())
    }
}

/// Normalizes a client-supplied path to the `/`-separated, root-relative form
/// git expects. Absolute paths and `..` components are rejected.
pub fn normalize_path(path: &str) -> Result<String> {
    let mut parts = Vec::new();

    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => parts.push(part),
                None => return Err(Error::InvalidPath(path.to_string())),
            },
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::InvalidPath(path.to_string()));
            }
        }
    }

    if parts.is_empty() {
        return Err(Error::InvalidPath(path.to_string()));
    }

    Ok(parts.join("/"))
}
