//! Request body for cost estimation.

use crate::models::Hyperparameters;
use serde::{Deserialize, Serialize};

/// Payload for `POST /estimate`.
///
/// Estimation is a pure calculation on the server; submitting one never
/// creates a job or touches cached data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    /// Base model the estimate is for
    pub base_model: String,

    /// Compute instance type; server picks its default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    /// Training configuration the estimate assumes
    #[serde(default)]
    pub hyperparameters: Hyperparameters,

    /// Expected training duration in hours; server derives from
    /// hyperparameters when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
}

impl EstimateRequest {
    /// Create a request with default hyperparameters.
    pub fn new(base_model: impl Into<String>) -> Self {
        Self {
            base_model: base_model.into(),
            instance_type: None,
            hyperparameters: Hyperparameters::default(),
            estimated_hours: None,
        }
    }

    /// Set the compute instance type.
    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = Some(instance_type.into());
        self
    }

    /// Set the hyperparameters.
    pub fn with_hyperparameters(mut self, hyperparameters: Hyperparameters) -> Self {
        self.hyperparameters = hyperparameters;
        self
    }

    /// Set the expected training duration.
    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_hyperparameters() {
        let req = EstimateRequest::new("llama-2-7b");

        assert_eq!(req.base_model, "llama-2-7b");
        assert_eq!(req.hyperparameters, Hyperparameters::default());
        assert!(req.estimated_hours.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let req = EstimateRequest::new("flan-t5-xl")
            .with_instance_type("ml.g5.8xlarge")
            .with_estimated_hours(4.5);

        assert_eq!(req.instance_type.as_deref(), Some("ml.g5.8xlarge"));
        assert_eq!(req.estimated_hours, Some(4.5));
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let req = EstimateRequest::new("gpt2");
        let json = serde_json::to_string(&req).unwrap();

        assert!(json.contains("hyperparameters"), "Defaults should serialize");
        assert!(!json.contains("estimated_hours"), "Absent hours should be omitted");
    }
}
