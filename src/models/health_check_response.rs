//! Server health probe response.

use serde::{Deserialize, Serialize};

/// Result of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Server-reported status, "ok" when healthy
    pub status: String,

    /// Server version string when the deployment exposes one
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthCheckResponse {
    /// True when the server reports itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_payload() {
        let json = r#"{"status": "ok", "version": "0.4.2"}"#;
        let response: HealthCheckResponse = serde_json::from_str(json).unwrap();

        assert!(response.is_healthy());
        assert_eq!(response.version.as_deref(), Some("0.4.2"));
    }

    #[test]
    fn test_missing_version_defaults_to_none() {
        let json = r#"{"status": "degraded"}"#;
        let response: HealthCheckResponse = serde_json::from_str(json).unwrap();

        assert!(!response.is_healthy());
        assert!(response.version.is_none());
    }
}
