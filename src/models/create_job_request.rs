//! Request body for creating a training job.

use crate::models::Hyperparameters;
use serde::{Deserialize, Serialize};

/// Payload for `POST /training-jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJobRequest {
    /// Human-readable job name
    pub name: String,

    /// Base model to fine-tune
    pub base_model: String,

    /// Reference to the training dataset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Training configuration; server fills defaults for omitted fields
    #[serde(default)]
    pub hyperparameters: Hyperparameters,

    /// Compute instance type; server picks one when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

impl CreateJobRequest {
    /// Create a request with default hyperparameters.
    pub fn new(name: impl Into<String>, base_model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_model: base_model.into(),
            dataset: None,
            hyperparameters: Hyperparameters::default(),
            instance_type: None,
        }
    }

    /// Set the training dataset.
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    /// Set the hyperparameters.
    pub fn with_hyperparameters(mut self, hyperparameters: Hyperparameters) -> Self {
        self.hyperparameters = hyperparameters;
        self
    }

    /// Set the compute instance type.
    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = Some(instance_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_hyperparameters() {
        let req = CreateJobRequest::new("sentiment", "llama-2-7b");

        assert_eq!(req.name, "sentiment");
        assert_eq!(req.hyperparameters, Hyperparameters::default());
        assert!(req.dataset.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let req = CreateJobRequest::new("sentiment", "llama-2-7b")
            .with_dataset("reviews-v1")
            .with_instance_type("ml.g5.4xlarge");

        assert_eq!(req.dataset.as_deref(), Some("reviews-v1"));
        assert_eq!(req.instance_type.as_deref(), Some("ml.g5.4xlarge"));
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let req = CreateJobRequest::new("j", "gpt2");
        let json = serde_json::to_string(&req).unwrap();

        assert!(json.contains("\"name\":\"j\""), "Should serialize name");
        assert!(!json.contains("dataset"), "Absent dataset should be omitted");
        assert!(!json.contains("instance_type"), "Absent instance type should be omitted");
    }
}
