use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open git repository at {path:?}: {source}")]
    RepositoryOpen {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Path not found in HEAD: {0}")]
    PathNotInHistory(String),

    #[error("No completion response received")]
    NoCompletionReceived,

    #[error("Rewrite service error: {0}")]
    Collaborator(#[source] anyhow::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory traversal failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid ignore rules: {0}")]
    Ignore(#[from] ignore::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub fn collaborator(err: impl Into<anyhow::Error>) -> Self {
        Error::Collaborator(err.into())
    }

    /// True for failures caused by the rewrite service rather than the repository.
    pub fn is_collaborator(&self) -> bool {
        matches!(self, Error::Collaborator(_) | Error::NoCompletionReceived)
    }
}
