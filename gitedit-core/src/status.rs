use crate::error::Result;
use crate::models::{FileState, StatusCode};
use crate::repository::GitRepository;
use git2::Status;
use tracing::debug;

impl From<Status> for StatusCode {
    /// Reduces libgit2 status flags to the working-tree status code.
    fn from(status: Status) -> Self {
        if status.is_conflicted() {
            StatusCode::UpdatedButUnmerged
        } else if status.is_ignored() {
            StatusCode::Ignored
        } else if status.is_wt_new() {
            StatusCode::Untracked
        } else if status.is_wt_deleted() {
            StatusCode::Deleted
        } else if status.is_wt_renamed() {
            StatusCode::Renamed
        } else if status.is_wt_modified() || status.is_wt_typechange() {
            StatusCode::Modified
        } else {
            StatusCode::Unmodified
        }
    }
}

impl From<StatusCode> for FileState {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::Added => FileState::Added,
            StatusCode::Copied => FileState::Copied,
            StatusCode::Deleted => FileState::Deleted,
            StatusCode::Modified => FileState::Modified,
            StatusCode::Renamed => FileState::Renamed,
            StatusCode::UpdatedButUnmerged => FileState::UpdatedButUnmerged,
            StatusCode::Unmodified | StatusCode::Untracked | StatusCode::Ignored => {
                FileState::Unmodified
            }
        }
    }
}

/// Live state of `path`. Always queried fresh from the working tree.
pub fn classify(repo: &GitRepository, path: &str) -> Result<FileState> {
    let code = StatusCode::from(repo.status(path)?);
    let state = FileState::from(code);
    debug!("{} has status '{}' ({})", path, code.as_char(), state.as_str());
    Ok(state)
}
