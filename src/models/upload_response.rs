//! Server acknowledgement for file uploads.
//!
//! The upload endpoint answers in camelCase, unlike the rest of the API.

use serde::{Deserialize, Serialize};

/// Result of `POST /training-jobs/{id}/files`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Human-readable summary, e.g. "2 files uploaded"
    pub message: String,

    /// Per-file details in upload order
    #[serde(default)]
    pub files: Vec<UploadedFileInfo>,
}

/// Server-side record of one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFileInfo {
    /// File name as submitted
    #[serde(rename = "originalName")]
    pub original_name: String,

    /// Stored size in bytes
    pub size: u64,

    /// MIME type the server recorded
    #[serde(rename = "type")]
    pub file_type: String,

    /// First bytes of the content, when the server returns one
    #[serde(rename = "contentPreview", skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,
}

impl UploadResponse {
    /// Number of files the server accepted.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
