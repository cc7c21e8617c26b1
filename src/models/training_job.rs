//! Server-owned training job record.

use crate::models::{Hyperparameters, JobStatus};
use serde::{Deserialize, Serialize};

/// One training job as the server describes it.
///
/// The server owns this record; the client holds a cached, possibly stale
/// copy. `id` is server-assigned and immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingJob {
    /// Server-assigned identity
    pub id: i64,

    /// Human-readable job name
    pub name: String,

    /// Base model being fine-tuned (e.g. "llama-2-7b", "gpt2")
    pub base_model: String,

    /// Reference to the training dataset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Current lifecycle status
    pub status: JobStatus,

    /// Training configuration
    #[serde(default)]
    pub hyperparameters: Hyperparameters,

    /// Compute instance type the job runs on (e.g. "ml.g5.2xlarge")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    /// Creation time, RFC3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Training start time, RFC3339; absent until the job leaves the queue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,

    /// Training end time, RFC3339; absent until terminal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,

    /// Server-reported failure reason when `status` is `failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Accumulated cost estimate in USD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost_usd: Option<f64>,
}
