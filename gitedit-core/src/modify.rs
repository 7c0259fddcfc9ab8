use crate::cancel::{run_blocking, until_cancelled};
use crate::content::ContentResolver;
use crate::error::Result;
use crate::models::{ModificationRequest, ModificationResult};
use crate::repository::normalize_path;
use crate::rewrite::Rewriter;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Half-open line range `[start, end)` resolved against a file's line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSelection {
    pub start: usize,
    pub end: usize,
}

impl LineSelection {
    /// `start` is clamped to `[0, line_count]`. A negative `end` means end of
    /// file; any other `end` is clamped to `[start, line_count]`.
    pub fn resolve(start: i64, end: i64, line_count: usize) -> Self {
        let start = clamp(start, 0, line_count);
        let end = if end < 0 {
            line_count
        } else {
            clamp(end, start, line_count)
        };
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn extract(&self, lines: &[&str]) -> String {
        lines[self.start..self.end].join("\n")
    }
}

fn clamp(value: i64, min: usize, max: usize) -> usize {
    usize::try_from(value).unwrap_or(0).clamp(min, max)
}

/// Extension of `path` including the leading dot, or `""` without one.
pub fn language_hint(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Selected code extracted from a file for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSelection {
    pub language: String,
    pub lines: LineSelection,
    pub code: String,
}

impl CodeSelection {
    pub fn from_content(path: &str, content: &[u8], line_start: i64, line_end: i64) -> Self {
        let text = String::from_utf8_lossy(content);
        let lines: Vec<&str> = text.split('\n').collect();
        let selection = LineSelection::resolve(line_start, line_end, lines.len());

        Self {
            language: language_hint(path),
            lines: selection,
            code: selection.extract(&lines),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ModifyOptions {
    /// Ask the rewriter for a rationale after rewriting.
    pub explain: bool,
}

impl Default for ModifyOptions {
    fn default() -> Self {
        Self { explain: true }
    }
}

/// Extracts the requested lines, has them rewritten and explained.
/// Nothing is written back to the repository.
#[derive(Clone)]
pub struct ModificationPipeline {
    resolver: ContentResolver,
    rewriter: Arc<dyn Rewriter>,
    options: ModifyOptions,
}

impl ModificationPipeline {
    pub fn new(resolver: ContentResolver, rewriter: Arc<dyn Rewriter>) -> Self {
        Self {
            resolver,
            rewriter,
            options: ModifyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ModifyOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn modify(
        &self,
        request: ModificationRequest,
        cancel: &CancellationToken,
    ) -> Result<ModificationResult> {
        let path = normalize_path(&request.path)?;

        let resolver = self.resolver.clone();
        let read_path = path.clone();
        let content = run_blocking(cancel, move || resolver.get_current(&read_path)).await?;

        let selection =
            CodeSelection::from_content(&path, &content, request.line_start, request.line_end);
        debug!(
            "Selected lines {}..{} of {} ({} bytes)",
            selection.lines.start,
            selection.lines.end,
            path,
            selection.code.len()
        );

        let rewritten = until_cancelled(
            cancel,
            self.rewriter
                .rewrite(&selection.language, &selection.code, &request.instruction),
        )
        .await?;

        let explanation = if self.options.explain {
            until_cancelled(
                cancel,
                self.rewriter.explain(&request.instruction, &rewritten),
            )
            .await?
        } else {
            String::new()
        };

        info!("Modified {} via {}", path, self.rewriter.name());

        Ok(ModificationResult {
            explanation,
            modified_files: vec![path],
            modified_code: rewritten,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::rewrite::{MockBehavior, MockRewriter, RewriterCall};
    use crate::testing::TestRepo;

    fn numbered_lines(count: usize) -> String {
        (0..count).map(|i| format!("line{}\n", i)).collect()
    }

    fn pipeline(repo: &TestRepo, rewriter: &MockRewriter) -> ModificationPipeline {
        ModificationPipeline::new(
            ContentResolver::new(repo.path()),
            Arc::new(rewriter.clone()),
        )
    }

    #[test]
    fn test_resolve_whole_file() {
        assert_eq!(
            LineSelection::resolve(0, -1, 10),
            LineSelection { start: 0, end: 10 }
        );
    }

    #[test]
    fn test_resolve_clamps() {
        assert_eq!(
            LineSelection::resolve(-4, 3, 10),
            LineSelection { start: 0, end: 3 }
        );
        assert_eq!(
            LineSelection::resolve(2, 50, 10),
            LineSelection { start: 2, end: 10 }
        );
        assert_eq!(
            LineSelection::resolve(6, 2, 10),
            LineSelection { start: 6, end: 6 }
        );
        assert!(LineSelection::resolve(25, -1, 10).is_empty());
        assert!(LineSelection::resolve(25, 30, 10).is_empty());
    }

    #[test]
    fn test_language_hint() {
        assert_eq!(language_hint("c.py"), ".py");
        assert_eq!(language_hint("src/app/main.go"), ".go");
        assert_eq!(language_hint("Makefile"), "");
    }

    #[test]
    fn test_selection_keeps_trailing_empty_line() {
        let selection = CodeSelection::from_content("a.txt", b"a\nb\n", 0, -1);
        assert_eq!(selection.lines, LineSelection { start: 0, end: 3 });
        assert_eq!(selection.code, "a\nb\n");
    }

    #[tokio::test]
    async fn test_bounded_range_is_rewritten_and_explained() {
        let repo = TestRepo::new();
        repo.write("c.py", numbered_lines(10));
        let rewriter = MockRewriter::answering("typed code", "Added annotations.");

        let result = pipeline(&repo, &rewriter)
            .modify(
                ModificationRequest::new("c.py", "add type hints").with_lines(2, 5),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.explanation, "Added annotations.");
        assert_eq!(result.modified_files, vec!["c.py"]);
        assert_eq!(result.modified_code, "typed code");
        assert_eq!(
            rewriter.calls(),
            vec![
                RewriterCall::Rewrite {
                    language: ".py".to_string(),
                    code: "line2\nline3\nline4".to_string(),
                    instruction: "add type hints".to_string(),
                },
                RewriterCall::Explain {
                    instruction: "add type hints".to_string(),
                    rewritten: "typed code".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_whole_file_selection() {
        let repo = TestRepo::new();
        repo.write("main.go", "package main\n\nfunc main() {}\n");
        let rewriter = MockRewriter::default();

        pipeline(&repo, &rewriter)
            .modify(
                ModificationRequest::new("main.go", "rename main"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        match &rewriter.calls()[0] {
            RewriterCall::Rewrite { code, .. } => {
                assert_eq!(code, "package main\n\nfunc main() {}\n")
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_past_end_sends_empty_code() {
        let repo = TestRepo::new();
        repo.write("c.py", numbered_lines(3));
        let rewriter = MockRewriter::default();

        let result = pipeline(&repo, &rewriter)
            .modify(
                ModificationRequest::new("c.py", "anything").with_lines(40, -1),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.modified_files, vec!["c.py"]);
        match &rewriter.calls()[0] {
            RewriterCall::Rewrite { code, .. } => assert_eq!(code, ""),
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_explanation_can_be_disabled() {
        let repo = TestRepo::new();
        repo.write("c.py", "x = 1\n");
        let rewriter = MockRewriter::default();

        let result = pipeline(&repo, &rewriter)
            .with_options(ModifyOptions { explain: false })
            .modify(
                ModificationRequest::new("c.py", "rename x"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.explanation, "");
        assert_eq!(rewriter.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_choices_surfaces_error() {
        let repo = TestRepo::new();
        repo.write("c.py", "x = 1\n");
        let rewriter = MockRewriter::new(MockBehavior::NoChoices);

        let result = pipeline(&repo, &rewriter)
            .modify(
                ModificationRequest::new("c.py", "rename x"),
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(Error::NoCompletionReceived)));
    }

    #[tokio::test]
    async fn test_collaborator_failures_propagate() {
        let repo = TestRepo::new();
        repo.write("c.py", "x = 1\n");
        let rewriter = MockRewriter::new(MockBehavior::AlwaysError);
        let pipeline = pipeline(&repo, &rewriter);

        let result = pipeline
            .modify(ModificationRequest::new("c.py", "a"), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(Error::Collaborator(_))));
        assert_eq!(rewriter.call_count(), 1);

        rewriter.set_behavior(MockBehavior::ExplainError);
        let result = pipeline
            .modify(ModificationRequest::new("c.py", "a"), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(Error::Collaborator(_))));
        assert_eq!(rewriter.call_count(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_never_reaches_rewriter() {
        let repo = TestRepo::new();
        let rewriter = MockRewriter::default();

        let result = pipeline(&repo, &rewriter)
            .modify(
                ModificationRequest::new("missing.py", "a"),
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(Error::FileNotFound(_))));
        assert_eq!(rewriter.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_rewrite() {
        let repo = TestRepo::new();
        repo.write("c.py", "x = 1\n");
        let rewriter = MockRewriter::new(MockBehavior::Hang);
        let pipeline = pipeline(&repo, &rewriter);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = pipeline
            .modify(ModificationRequest::new("c.py", "a"), &cancel)
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(rewriter.call_count(), 1);
    }
}
