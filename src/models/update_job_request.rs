//! Request body for updating a training job.

use crate::models::Hyperparameters;
use serde::{Deserialize, Serialize};

/// Payload for `PATCH /training-jobs/{id}`.
///
/// Every field is optional; only the fields present in the payload are
/// changed on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateJobRequest {
    /// New job name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New training dataset reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Replacement hyperparameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperparameters: Option<Hyperparameters>,

    /// New compute instance type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

impl UpdateJobRequest {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the job.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Change the training dataset.
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    /// Replace the hyperparameters.
    pub fn with_hyperparameters(mut self, hyperparameters: Hyperparameters) -> Self {
        self.hyperparameters = Some(hyperparameters);
        self
    }

    /// Change the compute instance type.
    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = Some(instance_type.into());
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.dataset.is_none()
            && self.hyperparameters.is_none()
            && self.instance_type.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update() {
        let req = UpdateJobRequest::new();
        assert!(req.is_empty());
        assert_eq!(serde_json::to_string(&req).unwrap(), "{}");
    }

    #[test]
    fn test_partial_update_serializes_only_set_fields() {
        let req = UpdateJobRequest::new().with_name("renamed");
        let json = serde_json::to_string(&req).unwrap();

        assert!(!req.is_empty());
        assert_eq!(json, r#"{"name":"renamed"}"#);
    }

    #[test]
    fn test_builder_chaining() {
        let req = UpdateJobRequest::new()
            .with_dataset("reviews-v2")
            .with_instance_type("ml.p3.2xlarge");

        assert_eq!(req.dataset.as_deref(), Some("reviews-v2"));
        assert_eq!(req.instance_type.as_deref(), Some("ml.p3.2xlarge"));
        assert!(req.name.is_none());
    }
}
