//! # gitedit-server
//!
//! HTTP server for gitedit that exposes a repository's files, their state and
//! AI-assisted modifications to remote editing clients.

pub mod api;
pub mod config;
pub mod server;

pub use config::{resolve_api_key, ConfigError, ServerConfig};
pub use server::GitEditServer;
