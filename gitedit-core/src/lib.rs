//! # gitedit-core
//!
//! Core library for gitedit - repository state resolution and AI-assisted code
//! modification for remote editing clients.
//!
//! This crate lists the files of a git working tree with ignore rules applied,
//! classifies their working-tree state, serves current and HEAD content, and
//! runs selected line ranges through an injected [`Rewriter`].

mod cancel;
pub mod content;
pub mod editor;
pub mod error;
pub mod ignore_rules;
pub mod models;
pub mod modify;
pub mod repository;
pub mod rewrite;
pub mod status;
pub mod walker;

#[cfg(test)]
mod testing;

pub use content::ContentResolver;
pub use editor::Editor;
pub use error::{Error, Result};
pub use models::{FileSnapshot, FileState, ModificationRequest, ModificationResult, StatusCode};
pub use modify::{LineSelection, ModificationPipeline, ModifyOptions};
pub use repository::GitRepository;
pub use rewrite::{MockRewriter, OpenAiConfig, OpenAiRewriter, Rewriter};
