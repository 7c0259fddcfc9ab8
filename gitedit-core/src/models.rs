use serde::{Deserialize, Serialize};

/// Semantic working-tree state of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    Unmodified,
    Added,
    Copied,
    Deleted,
    Modified,
    Renamed,
    UpdatedButUnmerged,
}

impl FileState {
    pub fn as_str(&self) -> &str {
        match self {
            FileState::Unmodified => "unmodified",
            FileState::Added => "added",
            FileState::Copied => "copied",
            FileState::Deleted => "deleted",
            FileState::Modified => "modified",
            FileState::Renamed => "renamed",
            FileState::UpdatedButUnmerged => "updated_but_unmerged",
        }
    }

    pub fn is_unmodified(&self) -> bool {
        *self == FileState::Unmodified
    }
}

/// Raw working-tree status code, using the porcelain status letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Unmodified,
    Untracked,
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    UpdatedButUnmerged,
    Ignored,
}

impl StatusCode {
    pub fn as_char(&self) -> char {
        match self {
            StatusCode::Unmodified => ' ',
            StatusCode::Untracked => '?',
            StatusCode::Modified => 'M',
            StatusCode::Added => 'A',
            StatusCode::Deleted => 'D',
            StatusCode::Renamed => 'R',
            StatusCode::Copied => 'C',
            StatusCode::UpdatedButUnmerged => 'U',
            StatusCode::Ignored => '!',
        }
    }
}

/// Current and reference content of one file, as seen by a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    pub path: String,
    pub state: FileState,
    pub current: Vec<u8>,
    pub reference: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationRequest {
    pub path: String,
    pub instruction: String,
    #[serde(default)]
    pub line_start: i64,
    #[serde(default = "end_of_file")]
    pub line_end: i64,
}

fn end_of_file() -> i64 {
    -1
}

impl ModificationRequest {
    pub fn new(path: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            instruction: instruction.into(),
            line_start: 0,
            line_end: end_of_file(),
        }
    }

    pub fn with_lines(mut self, line_start: i64, line_end: i64) -> Self {
        self.line_start = line_start;
        self.line_end = line_end;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationResult {
    pub explanation: String,
    pub modified_files: Vec<String>,
    pub modified_code: String,
}

/// Serde adapter encoding raw bytes as standard base64 strings.
pub mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
