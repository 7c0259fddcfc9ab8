use crate::cancel::run_blocking;
use crate::content::ContentResolver;
use crate::error::Result;
use crate::models::{FileSnapshot, ModificationRequest, ModificationResult};
use crate::modify::{ModificationPipeline, ModifyOptions};
use crate::rewrite::Rewriter;
use crate::walker;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The operations a remote editing client can call against one repository.
///
/// Holds no repository state: every call reopens the repository, so an
/// `Editor` can be shared freely between concurrent requests.
#[derive(Clone)]
pub struct Editor {
    resolver: ContentResolver,
    pipeline: ModificationPipeline,
}

impl Editor {
    pub fn new(root: impl Into<PathBuf>, rewriter: Arc<dyn Rewriter>) -> Self {
        let resolver = ContentResolver::new(root);
        let pipeline = ModificationPipeline::new(resolver.clone(), rewriter);

        Self { resolver, pipeline }
    }

    pub fn with_options(mut self, options: ModifyOptions) -> Self {
        self.pipeline = self.pipeline.with_options(options);
        self
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub async fn list_tracked_files(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        let resolver = self.resolver.clone();
        run_blocking(cancel, move || walker::list_tracked_files(&resolver.open()?)).await
    }

    pub async fn get_file_detail(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<FileSnapshot> {
        let resolver = self.resolver.clone();
        let path = path.to_string();
        run_blocking(cancel, move || resolver.get_snapshot(&path)).await
    }

    pub async fn modify_code(
        &self,
        request: ModificationRequest,
        cancel: &CancellationToken,
    ) -> Result<ModificationResult> {
        self.pipeline.modify(request, cancel).await
    }
}
