use crate::error::Result;
use crate::ignore_rules::IgnoreMatcher;
use crate::repository::GitRepository;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Name of the git metadata directory, never part of a listing.
pub const METADATA_DIR: &str = ".git";

const GITIGNORE: &str = ".gitignore";

/// Recursively lists every non-directory entry below `root` as a
/// `/`-separated root-relative path. `.git` subtrees are pruned. Any
/// directory that cannot be read fails the whole walk.
pub fn walk_worktree(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != METADATA_DIR);

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(to_slash_path(relative));
        }
    }

    Ok(files)
}

/// Lists the working tree of `repo` with ignored paths removed.
pub fn list_tracked_files(repo: &GitRepository) -> Result<Vec<String>> {
    let files = repo.list_tree()?;
    let matcher = build_matcher(repo, &files)?;

    let total = files.len();
    let tracked: Vec<String> = files
        .into_iter()
        .filter(|path| !is_metadata_path(path))
        .filter(|path| !matcher.is_ignored(Path::new(path), false))
        .collect();

    debug!(
        "Listed {} tracked files ({} ignored)",
        tracked.len(),
        total - tracked.len()
    );

    Ok(tracked)
}

fn build_matcher(repo: &GitRepository, files: &[String]) -> Result<IgnoreMatcher> {
    let ignore_files: Vec<&String> = files
        .iter()
        .filter(|path| Path::new(path).file_name().is_some_and(|name| name == GITIGNORE))
        .collect();

    let mut exclude_files = vec![repo.git().path().join("info").join("exclude")];
    if let Some(global) = configured_excludes_file(repo) {
        exclude_files.push(global);
    }

    IgnoreMatcher::build(repo.workdir(), &ignore_files, &exclude_files)
}

fn configured_excludes_file(repo: &GitRepository) -> Option<PathBuf> {
    repo.git()
        .config()
        .ok()?
        .get_path("core.excludesFile")
        .ok()
}

fn is_metadata_path(path: &str) -> bool {
    path.split('/').next() == Some(METADATA_DIR)
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
