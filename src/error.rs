//! Error types for kiln-link operations.

use thiserror::Error;

/// Errors that can occur during kiln-link operations.
///
/// All variants carry owned, clonable payloads so a single fetch outcome can
/// be fanned out to every caller sharing that fetch.
#[derive(Error, Debug, Clone)]
pub enum KilnLinkError {
    /// Network-level failure (connection refused, DNS, broken transport)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request exceeded a configured timeout
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    /// Authentication or authorization failure
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Client misconfiguration (bad base URL, invalid builder state)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// JSON serialization/deserialization failure
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// File upload rejected; message includes the server's status text
    #[error("Upload error: {0}")]
    UploadError(String),

    /// Non-success HTTP response from the server.
    ///
    /// `message` always contains the HTTP reason phrase, followed by the
    /// response body when one was returned.
    #[error("Server error {status_code}: {message}")]
    ServerError {
        /// HTTP status code
        status_code: u16,
        /// Reason phrase plus response body text
        message: String,
    },

    /// Invariant violation inside the client itself
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl KilnLinkError {
    /// HTTP status code for server errors, `None` for every other variant.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ServerError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns true if this error came from a non-success HTTP response.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ServerError { .. })
    }
}

impl From<reqwest::Error> for KilnLinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            KilnLinkError::TimeoutError(err.to_string())
        } else if err.is_decode() {
            KilnLinkError::SerializationError(err.to_string())
        } else {
            KilnLinkError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for KilnLinkError {
    fn from(err: serde_json::Error) -> Self {
        KilnLinkError::SerializationError(err.to_string())
    }
}

/// Result type for kiln-link operations.
pub type Result<T> = std::result::Result<T, KilnLinkError>;
