//! In-memory file for dataset uploads.

use bytes::Bytes;

/// One file to send with `POST /training-jobs/{id}/files`.
///
/// Holds the content in memory; clones share the underlying buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    /// File name as the server should record it
    pub file_name: String,

    /// MIME type; server sniffs one when absent
    pub content_type: Option<String>,

    /// File content
    pub bytes: Bytes,
}

impl UploadFile {
    /// Create a file from its name and content.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// Set the MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Content size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_file() {
        let file = UploadFile::new("train.jsonl", "{\"text\": \"hello\"}".as_bytes().to_vec());

        assert_eq!(file.file_name, "train.jsonl");
        assert_eq!(file.size(), 17);
        assert!(file.content_type.is_none());
    }

    #[test]
    fn test_with_content_type() {
        let file = UploadFile::new("data.csv", b"a,b\n1,2\n".to_vec())
            .with_content_type("text/csv");

        assert_eq!(file.content_type.as_deref(), Some("text/csv"));
    }
}
