//! File API types.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use genai_kit_polling::{PollState, Pollable};
use serde::{Deserialize, Serialize};

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    /// Not reported.
    #[default]
    StateUnspecified,
    /// Still being processed.
    Processing,
    /// Ready for use.
    Active,
    /// Processing failed.
    Failed,
    /// A state this crate does not know yet. Treated as ready.
    #[serde(other)]
    Unknown,
}

/// Status attached to a failed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    /// Status code.
    #[serde(default)]
    pub code: i32,
    /// Message.
    #[serde(default)]
    pub message: String,
}

/// An uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Resource name, e.g. `files/abc123`.
    pub name: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size in bytes (int64 encoded as a string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Expiration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<DateTime<Utc>>,
    /// URI to reference the file in prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Processing state.
    #[serde(default)]
    pub state: FileState,
    /// Failure details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FileStatus>,
}

impl File {
    /// A file in `state`.
    pub fn with_state(name: impl Into<String>, state: FileState) -> Self {
        Self {
            name: name.into(),
            state,
            ..Default::default()
        }
    }

    /// Set the URI and MIME type.
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl Pollable for File {
    fn poll_state(&self) -> PollState {
        match self.state {
            FileState::Processing => PollState::Pending,
            FileState::Failed => PollState::Failed(
                self.error
                    .as_ref()
                    .filter(|e| !e.message.is_empty())
                    .map(|e| format!("File processing failed: {}", e.message))
                    .unwrap_or_else(|| "File processing failed.".to_string()),
            ),
            FileState::Active | FileState::StateUnspecified | FileState::Unknown => PollState::Done,
        }
    }
}

/// Bytes to upload through the resumable upload protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File contents.
    pub bytes: Bytes,
    /// MIME type.
    pub mime_type: String,
    /// Display name.
    pub display_name: Option<String>,
}

impl UploadFile {
    /// Create an upload.
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            display_name: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// One page of `files.list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    /// Files.
    #[serde(default)]
    pub files: Vec<File>,
    /// Token for the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Wrapper returned by the upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadResponse {
    pub(crate) file: File,
}
