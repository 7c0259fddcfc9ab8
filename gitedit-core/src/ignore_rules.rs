//! Combined gitignore matcher for a working tree.
//!
//! Rules come from every `.gitignore` in the tree (each scoped to its own
//! directory), `.git/info/exclude` and the configured `core.excludesFile`.
//! Deeper `.gitignore` files take precedence over shallower ones, and all of
//! them take precedence over the repository-wide exclude files.

use crate::error::Result;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use std::path::{Path, PathBuf};
use tracing::debug;

struct Layer {
    /// Directory the rules are scoped to, relative to the root.
    dir: PathBuf,
    rules: Gitignore,
}

pub struct IgnoreMatcher {
    root: PathBuf,
    /// Highest priority first.
    layers: Vec<Layer>,
}

impl IgnoreMatcher {
    /// Builds the matcher from the `.gitignore` files listed in `ignore_files`
    /// (root-relative) plus the given repository-wide exclude files.
    pub fn build<P: AsRef<Path>>(
        root: &Path,
        ignore_files: &[P],
        exclude_files: &[PathBuf],
    ) -> Result<Self> {
        let mut layers = Vec::new();

        for ignore_file in ignore_files {
            let ignore_file = ignore_file.as_ref();
            let dir = ignore_file.parent().unwrap_or(Path::new("")).to_path_buf();

            let mut builder = GitignoreBuilder::new(root.join(&dir));
            if let Some(err) = builder.add(root.join(ignore_file)) {
                return Err(err.into());
            }
            layers.push(Layer {
                dir,
                rules: builder.build()?,
            });
        }

        layers.sort_by_key(|layer| std::cmp::Reverse(layer.dir.components().count()));

        for exclude_file in exclude_files.iter().filter(|f| f.is_file()) {
            let mut builder = GitignoreBuilder::new(root);
            if let Some(err) = builder.add(exclude_file) {
                return Err(err.into());
            }
            layers.push(Layer {
                dir: PathBuf::new(),
                rules: builder.build()?,
            });
        }

        debug!("Built ignore matcher with {} rule files", layers.len());

        Ok(Self {
            root: root.to_path_buf(),
            layers,
        })
    }

    /// Whether `path` (root-relative) is ignored, either directly or because
    /// one of its parent directories is.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let components: Vec<_> = path.components().collect();
        let mut prefix = PathBuf::new();

        for (i, component) in components.iter().enumerate() {
            prefix.push(component);
            let last = i + 1 == components.len();
            if self.matches(&prefix, !last || is_dir) {
                return true;
            }
        }

        false
    }

    fn matches(&self, path: &Path, is_dir: bool) -> bool {
        let full_path = self.root.join(path);

        for layer in &self.layers {
            if !path.starts_with(&layer.dir) || path == layer.dir {
                continue;
            }
            match layer.rules.matched(&full_path, is_dir) {
                Match::Ignore(_) => return true,
                Match::Whitelist(_) => return false,
                Match::None => {}
            }
        }

        false
    }
}
