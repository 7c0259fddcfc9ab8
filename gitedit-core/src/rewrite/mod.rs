//! The external text-generation service that rewrites selected code.
//!
//! Implementations are constructed explicitly and injected into the
//! [`crate::Editor`]; failures come back as per-request errors.

pub mod mock;
pub mod openai;

pub use mock::{MockBehavior, MockRewriter, RewriterCall};
pub use openai::{OpenAiConfig, OpenAiRewriter};

use crate::error::Result;

#[async_trait::async_trait]
pub trait Rewriter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rewrites `code` following `instruction`. `language` is a file
    /// extension hint such as `".py"`, possibly empty.
    async fn rewrite(&self, language: &str, code: &str, instruction: &str) -> Result<String>;

    /// Natural-language rationale for a rewrite produced from `instruction`.
    async fn explain(&self, instruction: &str, rewritten: &str) -> Result<String>;
}
