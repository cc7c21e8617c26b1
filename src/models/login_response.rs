//! Server response for authentication.

use serde::{Deserialize, Serialize};

/// Result of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub access_token: String,

    /// Token scheme, normally "bearer"
    pub token_type: String,

    /// Token expiry, RFC3339; absent for non-expiring tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}
