//! # gitedit-sdk
//!
//! SDK for editing clients to browse a repository and request code
//! modifications from a gitedit server.
//!
//! ## Example
//!
//! ```no_run
//! use gitedit_sdk::GitEditClient;
//!
//! let client = GitEditClient::new("http://localhost:50051");
//!
//! for path in client.list_files().unwrap() {
//!     println!("{}", path);
//! }
//!
//! let result = client.modify_code("src/app.py", "add type hints", 0, -1).unwrap();
//! println!("{}", result.explanation);
//! ```

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::blocking::Response;
use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct GitEditClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDetail {
    pub path: String,
    /// Wire name of the file state, e.g. `"MODIFIED"`.
    pub state: String,
    pub content: Vec<u8>,
    pub original: Vec<u8>,
}

impl FileDetail {
    pub fn is_unmodified(&self) -> bool {
        self.state == "UNMODIFIED"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Modification {
    pub explanation: String,
    pub modified_files: Vec<String>,
    #[serde(default)]
    pub modified_code: String,
}

#[derive(Deserialize)]
struct FileList {
    files: Vec<String>,
}

#[derive(Deserialize)]
struct RawFileDetail {
    path: String,
    state: String,
    content: String,
    original: String,
}

#[derive(Serialize)]
struct ModifyRequest<'a> {
    path: &'a str,
    instruction: &'a str,
    line_start: i64,
    line_end: i64,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl GitEditClient {
    /// Create a new gitedit client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the gitedit server (e.g., "http://localhost:50051")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::blocking::Client::new())
    }

    /// Create a client on top of a preconfigured HTTP client (timeouts, proxies)
    pub fn with_client(base_url: impl Into<String>, client: reqwest::blocking::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    /// List the tracked files of the served repository
    pub fn list_files(&self) -> Result<Vec<String>> {
        let response = self.client.get(self.url("/files")).send()?;
        let list: FileList = check(response)?.json()?;
        Ok(list.files)
    }

    /// Current and last committed content of a file, plus its state
    pub fn file_detail(&self, path: &str) -> Result<FileDetail> {
        let response = self.client.get(self.file_url(path)?).send()?;
        let raw: RawFileDetail = check(response)?.json()?;

        Ok(FileDetail {
            content: STANDARD
                .decode(raw.content)
                .context("Server sent invalid base64 content")?,
            original: STANDARD
                .decode(raw.original)
                .context("Server sent invalid base64 original")?,
            path: raw.path,
            state: raw.state,
        })
    }

    /// Ask the server to rewrite lines `[line_start, line_end)` of `path`.
    /// A negative `line_end` selects through the end of the file.
    pub fn modify_code(
        &self,
        path: &str,
        instruction: &str,
        line_start: i64,
        line_end: i64,
    ) -> Result<Modification> {
        let request = ModifyRequest {
            path,
            instruction,
            line_start,
            line_end,
        };

        let response = self
            .client
            .post(self.url("/modify"))
            .json(&request)
            .send()?;

        Ok(check(response)?.json()?)
    }

    /// Check server health
    pub fn health_check(&self) -> Result<bool> {
        let response = self.client.get(self.url("/health")).send()?;
        Ok(response.status().is_success())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/files/<path>` with every path segment percent-encoded.
    fn file_url(&self, path: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid server URL: {}", self.base_url))?;

        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Server URL cannot have a path: {}", self.base_url))?
            .pop_if_empty()
            .push("files")
            .extend(path.split('/').filter(|segment| !segment.is_empty()));

        Ok(url)
    }
}

/// Turns non-success responses into errors carrying the server's message.
fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.error)
        .unwrap_or(body);

    anyhow::bail!("gitedit server returned {}: {}", status, message)
}
