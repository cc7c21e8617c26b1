//! Lifecycle status of a training job.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`TrainingJob`](crate::models::TrainingJob).
///
/// Transitions are server-authoritative: the client requests `start`,
/// `pause`, or `stop` and learns the resulting state by re-fetching. The
/// server-side state machine is
/// `created → queued → running → {paused, completed, failed, stopped}`,
/// with `paused → running` (resume) and `paused → stopped` as the only
/// paths out of `paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Configured but never started
    Created,
    /// Accepted for execution, waiting for capacity
    Queued,
    /// Training in progress
    Running,
    /// Suspended by request; resumable
    Paused,
    /// Finished successfully
    Completed,
    /// Finished with an error (see the job's `failure_reason`)
    Failed,
    /// Terminated by request
    Stopped,
}

impl JobStatus {
    /// True for states a job can never leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }

    /// True while the server is holding or consuming compute for the job.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&JobStatus::Running).unwrap(), "\"running\"");
        assert_eq!(serde_json::to_string(&JobStatus::Queued).unwrap(), "\"queued\"");

        let parsed: JobStatus = serde_json::from_str("\"stopped\"").unwrap();
        assert_eq!(parsed, JobStatus::Stopped);
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Stopped.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Paused.is_terminal());
    }

    #[test]
    fn test_active_states() {
        assert!(JobStatus::Queued.is_active());
        assert!(JobStatus::Running.is_active());
        assert!(!JobStatus::Created.is_active());
        assert!(!JobStatus::Paused.is_active());
    }

    #[test]
    fn test_display_matches_wire_format() {
        assert_eq!(JobStatus::Running.to_string(), "running");
        assert_eq!(JobStatus::Created.to_string(), "created");
    }
}
