//! Training log payload.

use serde::{Deserialize, Serialize};

/// Result of `GET /training-jobs/{id}/logs`.
///
/// The server returns the full log window each time; the poller replaces
/// the cached copy wholesale rather than appending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobLogs {
    /// Job the logs belong to
    pub job_id: i64,

    /// Log lines, oldest first
    #[serde(default)]
    pub lines: Vec<LogLine>,
}

/// One line of training output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    /// Emission time, RFC3339; absent for lines the runtime did not stamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Raw log text
    pub message: String,
}

impl JobLogs {
    /// True when no lines have been produced yet.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
